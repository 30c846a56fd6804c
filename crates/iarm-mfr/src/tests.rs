use super::*;

use iarm_bus::IarmResult;
use iarm_bus::testing::{BusCall, RecordingTransport};
use rstest::rstest;
use serde_json::json;

mod support;

use support::run_captured;

#[rstest]
#[case("--CurrentImageFilename", 26)]
#[case("--FlashedFilename", 26)]
#[case("--Modelname", 2)]
#[case("--HardwareId", 23)]
#[case("--Manufacturer", 0)]
#[case("--MfgSerialnumber", 17)]
#[case("--PDRIVersion", 13)]
fn each_flag_requests_its_type(#[case] flag: &str, #[case] code: u32) {
    let transport = RecordingTransport::new();
    transport.push_call_reply(Ok(json!({ "buf_len": 3, "buffer": "abc" })));

    let run = run_captured(&[flag], &transport);

    assert_eq!(run.exit_code, ExitCode::SUCCESS);
    assert_eq!(run.stdout, "abc\n");
    assert!(transport.calls().contains(&BusCall::Call {
        owner: String::from(iarm_bus::MFRLIB_OWNER),
        method: String::from(GET_SERIALIZED_DATA),
        argument: json!({ "type": code }),
    }));
}

#[rstest]
#[case::no_flag(&[])]
#[case::two_flags(&["--Modelname", "--HardwareId"])]
#[case::unknown_flag(&["--SerialNumber"])]
#[case::positional(&["Modelname"])]
fn anything_but_one_flag_prints_help(#[case] args: &[&str]) {
    let transport = RecordingTransport::new();

    let run = run_captured(args, &transport);

    assert_eq!(run.exit_code, ExitCode::FAILURE);
    assert!(run.stdout.contains("--CurrentImageFilename"));
    assert!(transport.calls().is_empty());
}

#[test]
fn failed_call_reports_type_and_code() {
    let transport = RecordingTransport::new();
    transport.push_call_reply(Err(IarmResult::InvalidState));

    let run = run_captured(&["--HardwareId"], &transport);

    assert_eq!(run.exit_code, ExitCode::SUCCESS);
    assert_eq!(
        run.stdout,
        "Call failed for mfrSERIALIZED_TYPE_HWID: error code:2\n"
    );
}

#[test]
fn help_exits_cleanly() {
    let run = run_captured(&["--help"], &RecordingTransport::new());
    assert_eq!(run.exit_code, ExitCode::SUCCESS);
    assert!(run.stdout.contains("--MfgSerialnumber"));
}

#[test]
fn describe_outcome_passes_values_through() {
    let outcome = Ok(String::from("PDRI_1.2"));
    assert_eq!(
        describe_outcome(SerializedType::PdriVersion, &outcome),
        "PDRI_1.2"
    );
}
