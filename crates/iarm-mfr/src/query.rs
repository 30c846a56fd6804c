//! Fetches one serialized field from the manufacturing library.

use iarm_bus::{BusSession, BusTransport, MFRLIB_OWNER};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::errors::MfrError;
use crate::field::SerializedType;

/// Bus member name registered by the query.
pub const MFR_MEMBER: &str = "mfr_util";
/// Method serving serialized fields.
pub const GET_SERIALIZED_DATA: &str = "mfrGetSerializedData";
/// Capacity of the library's reply buffer.
pub const SERIALIZED_BUFFER_LEN: usize = 1280;

pub(crate) const MFR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::query");

/// Reply to [`GET_SERIALIZED_DATA`]: `buf_len` meaningful bytes of `buffer`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SerializedData {
    /// Number of meaningful bytes.
    pub buf_len: usize,
    /// Raw buffer.
    pub buffer: String,
}

impl SerializedData {
    /// Decodes the value, stopping at the first NUL.
    #[must_use]
    pub fn value(&self) -> String {
        let bytes: Vec<u8> = self
            .buffer
            .bytes()
            .take(self.buf_len.min(SERIALIZED_BUFFER_LEN))
            .take_while(|byte| *byte != 0)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Opens a session, asks for `kind` and closes the session again.
///
/// # Errors
///
/// Returns [`MfrError::Bus`] when the session or call fails and
/// [`MfrError::MalformedReply`] when the reply cannot be decoded.
pub fn fetch_serialized<T: BusTransport + ?Sized>(
    transport: &mut T,
    kind: SerializedType,
) -> Result<String, MfrError> {
    let mut session = BusSession::open(transport, MFR_MEMBER)?;
    let reply = session.call(
        MFRLIB_OWNER,
        GET_SERIALIZED_DATA,
        &json!({ "type": kind.code() }),
    )?;
    session.close()?;

    let data: SerializedData = serde_json::from_value(reply).map_err(MfrError::MalformedReply)?;
    debug!(target: MFR_TARGET, kind = kind.label(), len = data.buf_len, "serialized data read");
    Ok(data.value())
}

#[cfg(test)]
mod tests {
    use iarm_bus::IarmResult;
    use iarm_bus::testing::{BusCall, RecordingTransport};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(5, "SKXI11", "SKXI1")]
    #[case(40, "SKXI11", "SKXI11")]
    #[case(6, "AB\u{0}CD", "AB")]
    #[case(0, "SKXI11", "")]
    fn value_honours_the_length(
        #[case] buf_len: usize,
        #[case] buffer: &str,
        #[case] expected: &str,
    ) {
        let data = SerializedData {
            buf_len,
            buffer: buffer.to_owned(),
        };
        assert_eq!(data.value(), expected);
    }

    #[test]
    fn fetch_runs_a_full_session() {
        let transport = RecordingTransport::new();
        transport.push_call_reply(Ok(json!({ "buf_len": 7, "buffer": "Model-X" })));
        let mut handle = transport.clone();

        let value = fetch_serialized(&mut handle, SerializedType::ModelName).expect("value");

        assert_eq!(value, "Model-X");
        assert_eq!(
            transport.calls(),
            vec![
                BusCall::Init {
                    member: String::from(MFR_MEMBER)
                },
                BusCall::Connect,
                BusCall::Call {
                    owner: String::from(MFRLIB_OWNER),
                    method: String::from(GET_SERIALIZED_DATA),
                    argument: json!({ "type": 2 }),
                },
                BusCall::Disconnect,
                BusCall::Term,
            ]
        );
    }

    #[test]
    fn rejected_call_still_closes_the_session() {
        let transport = RecordingTransport::new();
        transport.push_call_reply(Err(IarmResult::InvalidParam));
        let mut handle = transport.clone();

        let error =
            fetch_serialized(&mut handle, SerializedType::HardwareId).expect_err("rejected");

        assert_eq!(error.result(), IarmResult::InvalidParam);
        assert_eq!(transport.calls().last(), Some(&BusCall::Term));
    }
}
