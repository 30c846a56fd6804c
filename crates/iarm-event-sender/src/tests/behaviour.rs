//! Behavioural scenarios for the sender, driven in-process.

use std::cell::RefCell;
use std::process::ExitCode;

use iarm_bus::IarmResult;
use iarm_bus::testing::RecordingTransport;
use iarm_config::Config;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{CapturedRun, StaticConfigLoader, run_captured};

#[derive(Default)]
struct TestWorld {
    transport: RecordingTransport,
    config: Config,
    run: Option<CapturedRun>,
}

impl TestWorld {
    fn send(&mut self, command: &str) {
        let args: Vec<&str> = command.split_whitespace().collect();
        let loader = StaticConfigLoader::new(self.config.clone());
        self.run = Some(run_captured(&args, &loader, &self.transport));
    }

    fn run(&self) -> &CapturedRun {
        self.run.as_ref().expect("the sender has run")
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("a recording bus")]
fn given_recording_bus(world: &RefCell<TestWorld>) {
    world.borrow_mut().transport = RecordingTransport::new();
}

#[given("a recording bus that rejects broadcasts")]
fn given_rejecting_bus(world: &RefCell<TestWorld>) {
    let transport = RecordingTransport::new();
    transport.fail_broadcasts(IarmResult::InvalidState);
    world.borrow_mut().transport = transport;
}

#[given("strict exit is enabled")]
fn given_strict_exit(world: &RefCell<TestWorld>) {
    world.borrow_mut().config.strict_exit = true;
}

#[when("the operator sends {command}")]
fn when_operator_sends(world: &RefCell<TestWorld>, command: String) {
    world.borrow_mut().send(&command);
}

#[then("the sender exits with code {status}")]
fn then_exit_code(world: &RefCell<TestWorld>, status: u8) {
    assert_eq!(world.borrow().run().exit_code, ExitCode::from(status));
}

#[then("the bus records {count} broadcast")]
fn then_broadcast_count(world: &RefCell<TestWorld>, count: usize) {
    assert_eq!(world.borrow().transport.broadcasts().len(), count);
}

#[then("the bus was never opened")]
fn then_bus_untouched(world: &RefCell<TestWorld>) {
    let calls = world.borrow().transport.calls();
    assert!(calls.is_empty(), "unexpected bus calls: {calls:?}");
}

#[then("the last broadcast goes to {owner} event {event_id}")]
fn then_last_broadcast(world: &RefCell<TestWorld>, owner: String, event_id: u32) {
    let broadcasts = world.borrow().transport.broadcasts();
    let (actual_owner, actual_id, _) = broadcasts.last().expect("a broadcast was recorded");
    assert_eq!(actual_owner, &owner);
    assert_eq!(*actual_id, event_id);
}

#[then("stderr contains {snippet}")]
fn then_stderr_contains(world: &RefCell<TestWorld>, snippet: String) {
    let world = world.borrow();
    let snippet = snippet.trim_matches('"');
    let stderr = &world.run().stderr;
    assert!(
        stderr.contains(snippet),
        "stderr {stderr:?} did not contain {snippet:?}"
    );
}

#[scenario(path = "tests/features/device_event_broadcast.feature")]
fn device_event_broadcast(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/arity_mismatch.feature")]
fn arity_mismatch(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/invalid_boolean.feature")]
fn invalid_boolean(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/unknown_event.feature")]
fn unknown_event(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/legacy_event_case.feature")]
fn legacy_event_case(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/strict_exit.feature")]
fn strict_exit(world: RefCell<TestWorld>) {
    let _ = world;
}
