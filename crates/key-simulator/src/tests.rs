use super::*;

use std::cell::RefCell;
use std::sync::Arc;

use iarm_config::Config;
use mockall::{Sequence, mock};
use ortho_config::OrthoError;
use rstest::rstest;

use crate::linux::{KEY_3, KEY_ENTER, KEY_LEFTSHIFT};


mock! {
    Sink {}
    impl KeySink for Sink {
        fn emit(&mut self, stroke: KeyStroke) -> Result<(), KeyError>;
    }
}

struct DefaultLoader;

impl ConfigLoader for DefaultLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, Arc<OrthoError>> {
        Ok(Config::default())
    }
}

/// Sink that records strokes in a shared log.
#[derive(Clone, Default)]
struct RecordingSink {
    strokes: std::rc::Rc<RefCell<Vec<KeyStroke>>>,
}

impl KeySink for RecordingSink {
    fn emit(&mut self, stroke: KeyStroke) -> Result<(), KeyError> {
        self.strokes.borrow_mut().push(stroke);
        Ok(())
    }
}

struct CapturedRun {
    exit_code: ExitCode,
    stdout: String,
    stderr: String,
}

fn run_captured<S, F>(args: &[&str], open_sink: F) -> CapturedRun
where
    S: KeySink,
    F: FnOnce(&Path) -> Result<S, KeyError>,
{
    let argv = std::iter::once(PROGRAM_NAME)
        .chain(args.iter().copied())
        .map(OsString::from);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = run_with(argv, &mut stdout, &mut stderr, &DefaultLoader, open_sink);
    CapturedRun {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

#[test]
fn shifted_press_orders_modifier_around_the_key() {
    let mut sink = MockSink::new();
    let mut sequence = Sequence::new();
    for (code, value) in [(KEY_LEFTSHIFT, 1), (KEY_3, 1), (KEY_3, 0), (KEY_LEFTSHIFT, 0)] {
        sink.expect_emit()
            .withf(move |stroke| stroke.code == code && stroke.value == value)
            .once()
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
    }

    let pound = resolve_key("POUND").expect("mapped");
    inject(&mut sink, pound, KeyAction::Press).expect("injected");
}

#[test]
fn injection_stops_at_the_first_failed_write() {
    let mut sink = MockSink::new();
    sink.expect_emit().once().returning(|_| {
        Err(KeyError::Write(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        )))
    });

    let ok = resolve_key("OK").expect("mapped");
    let error = inject(&mut sink, ok, KeyAction::Press).expect_err("write fails");
    assert!(matches!(error, KeyError::Write(_)));
}

#[rstest]
#[case::press(&["OK"], vec![(KEY_ENTER, 1), (KEY_ENTER, 0)])]
#[case::down(&["OK", "--type", "down"], vec![(KEY_ENTER, 1)])]
#[case::repeat(&["169", "-t", "repeat"], vec![(KEY_ENTER, 2)])]
fn run_injects_the_requested_phases(#[case] args: &[&str], #[case] expected: Vec<(u16, i32)>) {
    let sink = RecordingSink::default();
    let handle = sink.clone();

    let run = run_captured(args, move |_| Ok(sink));

    assert_eq!(run.exit_code, ExitCode::SUCCESS);
    let sent: Vec<(u16, i32)> = handle
        .strokes
        .borrow()
        .iter()
        .map(|stroke| (stroke.code, stroke.value))
        .collect();
    assert_eq!(sent, expected);
    assert!(run.stdout.starts_with("OK: IR=0xa9"));
}

#[test]
fn unknown_key_fails_before_opening_the_device() {
    let run = run_captured(&["TELEPORT"], |_| -> Result<RecordingSink, KeyError> {
        panic!("the device must not be opened")
    });

    assert_eq!(run.exit_code, ExitCode::FAILURE);
    assert!(run.stderr.contains("unknown key 'TELEPORT'"));
}

#[test]
fn device_path_is_passed_to_the_sink_factory() {
    let run = run_captured(&["OK", "--device", "/tmp/uinput-test"], |path| {
        assert_eq!(path, Path::new("/tmp/uinput-test"));
        Ok(RecordingSink::default())
    });
    assert_eq!(run.exit_code, ExitCode::SUCCESS);
}

#[test]
fn missing_key_is_a_usage_error() {
    let run = run_captured(&[], |_| Ok(RecordingSink::default()));
    assert_eq!(run.exit_code, ExitCode::FAILURE);
    assert!(run.stderr.contains("<KEY>"));
}
