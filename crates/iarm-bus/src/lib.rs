//! Member-side access to the IARM inter-process bus.
//!
//! The tools in this workspace never talk to a socket directly. They depend
//! on the [`BusTransport`] contract, open a [`BusSession`] for one-shot work,
//! and describe what they send with typed [`EventPayload`] layouts.
//! [`SocketTransport`] speaks the broker's JSONL protocol; the
//! `test-support` feature adds a recording fake.

mod errors;
mod events;
mod frame;
mod payload;
mod result;
mod session;
mod socket;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
mod transport;

pub use errors::BusError;
pub use events::{
    CTRLM_DEVICE_UPDATE_API_REVISION, CTRLM_OWNER, CTRLM_UPDATE_AVAILABLE_CALL, DSMGR_OWNER,
    DsMgrEvent, MAINTENANCE_MGR_OWNER, MFRLIB_OWNER, MaintenanceEvent,
    NET_SRV_MGR_OWNER, NET_SRV_MGR_WIFI_INTERFACE_STATE, POWER_MANAGER_OWNER, RDMMGR_OWNER,
    RdmMgrEvent, SYSMGR_OWNER, SysMgrEvent, SystemStateId,
};
pub use frame::{BusEvent, BusMessage, BusRequest, parse_message, write_request};
pub use payload::{
    CTRLM_DEVICE_UPDATE_PATH_LEN, EISS_APP_ID_LEN, EissAppIdList, EventPayload, INTRUSION_MAX_LEN,
    MAINTENANCE_START_TIME_LEN, RDM_PKG_INST_PATH_LEN, RDM_PKG_NAME_LEN, RDM_PKG_VERSION_LEN,
    RdmPackageInfo, SYSTEM_STATE_PAYLOAD_LEN, SystemState, USB_DETECTED_FIELD_LEN,
    USB_MOUNT_DEVICE_LEN, USB_MOUNT_DIR_LEN, UsbDetected, UsbMount, bounded,
};
pub use result::IarmResult;
pub use session::BusSession;
pub use socket::{CONNECTION_TIMEOUT, SocketTransport};
pub use transport::BusTransport;

/// Tracing target for bus traffic.
pub const BUS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bus");

#[cfg(test)]
mod tests {
    use super::testing::{BusCall, RecordingTransport};
    use super::*;

    #[test]
    fn session_closes_in_order_on_drop() {
        let mut transport = RecordingTransport::new();
        let handle = transport.clone();
        {
            let mut session = BusSession::open(&mut transport, "ImageDwldEvent").expect("open");
            session
                .broadcast(
                    SYSMGR_OWNER,
                    SysMgrEvent::SystemState.id(),
                    &EventPayload::SystemState(SystemState::new(12, 2, 0)),
                )
                .expect("broadcast");
        }
        let calls = handle.calls();
        assert_eq!(
            calls.first(),
            Some(&BusCall::Init {
                member: String::from("ImageDwldEvent")
            })
        );
        assert_eq!(calls.get(1), Some(&BusCall::Connect));
        assert_eq!(
            calls.get(3..),
            Some([BusCall::Disconnect, BusCall::Term].as_slice())
        );
    }

    #[test]
    fn failed_connect_still_terminates() {
        let mut transport = RecordingTransport::new();
        transport.fail_connect(IarmResult::IpcCoreFail);
        let handle = transport.clone();
        let outcome = BusSession::open(&mut transport, "mfr_util");
        assert!(outcome.is_err());
        drop(outcome);
        assert_eq!(handle.calls().last(), Some(&BusCall::Term));
        assert!(!handle.calls().contains(&BusCall::Disconnect));
    }

    #[test]
    fn explicit_close_does_not_repeat_teardown() {
        let mut transport = RecordingTransport::new();
        let handle = transport.clone();
        let session = BusSession::open(&mut transport, "QueryPowerState").expect("open");
        session.close().expect("close");
        let terms = handle
            .calls()
            .into_iter()
            .filter(|call| *call == BusCall::Term)
            .count();
        assert_eq!(terms, 1);
    }
}
