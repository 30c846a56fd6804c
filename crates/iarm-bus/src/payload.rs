//! Typed payload layouts carried by broadcast events.
//!
//! The broker's C listeners read fixed-size character buffers, so every text
//! field is bounded with [`bounded`] before it is placed in a payload.

use serde::{Deserialize, Serialize};

/// Capacity of the free-form payload inside a system-state event.
pub const SYSTEM_STATE_PAYLOAD_LEN: usize = 128;
/// Maximum intrusion report length, excluding the terminator.
pub const INTRUSION_MAX_LEN: usize = 1024;
/// Capacity of the USB mount device field.
pub const USB_MOUNT_DEVICE_LEN: usize = 128;
/// Capacity of the USB mount directory field.
pub const USB_MOUNT_DIR_LEN: usize = 256;
/// Capacity of each USB detection text field.
pub const USB_DETECTED_FIELD_LEN: usize = 64;
/// Capacity of the maintenance start time field.
pub const MAINTENANCE_START_TIME_LEN: usize = 64;
/// Capacity of the RDM package name field.
pub const RDM_PKG_NAME_LEN: usize = 128;
/// Capacity of the RDM package version field.
pub const RDM_PKG_VERSION_LEN: usize = 8;
/// Capacity of the RDM package installation path field.
pub const RDM_PKG_INST_PATH_LEN: usize = 256;
/// Capacity of each peripheral firmware path field.
pub const CTRLM_DEVICE_UPDATE_PATH_LEN: usize = 2048;
/// Width of one packed EISS application id.
pub const EISS_APP_ID_LEN: usize = 6;

/// Truncates `text` so it fits a C buffer of `capacity` bytes including the
/// terminator. Truncation never splits a UTF-8 sequence.
#[must_use]
pub fn bounded(text: &str, capacity: usize) -> String {
    let limit = capacity.saturating_sub(1);
    if text.len() <= limit {
        return text.to_owned();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.get(..end).unwrap_or_default().to_owned()
}

/// System-state change broadcast by the system manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    /// Which subsystem changed, see [`crate::SystemStateId`].
    pub state_id: i32,
    /// New state value.
    pub state: i32,
    /// Error indicator, zero when healthy.
    pub error: i32,
    /// Optional free-form payload.
    pub payload: String,
}

impl SystemState {
    /// Builds a system-state payload with an empty free-form payload.
    #[must_use]
    pub const fn new(state_id: i32, state: i32, error: i32) -> Self {
        Self {
            state_id,
            state,
            error,
            payload: String::new(),
        }
    }

    /// Attaches a free-form payload, bounded to the layout's capacity.
    #[must_use]
    pub fn with_payload(mut self, payload: &str) -> Self {
        self.payload = bounded(payload, SYSTEM_STATE_PAYLOAD_LEN);
        self
    }
}

/// List of packed EISS application ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EissAppIdList {
    /// Number of ids in use.
    pub count: u32,
    /// Ids packed as 48-bit big-endian values.
    pub ids: Vec<[u8; EISS_APP_ID_LEN]>,
}

/// USB mass-storage mount change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbMount {
    /// Non-zero when the device was mounted.
    pub mounted: i32,
    /// Block device node.
    pub device: String,
    /// Mount point.
    pub dir: String,
}

/// USB device detection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDetected {
    /// Insertion flag as listeners expect it.
    pub inserted: i32,
    /// Vendor identifier text.
    pub vendor: String,
    /// Product identifier text.
    pub product_id: String,
    /// Device name.
    pub device_name: String,
}

/// RDM package installation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdmPackageInfo {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Installation status code.
    pub install_status: i32,
    /// Installation path.
    pub install_path: String,
}

/// Payload attached to a broadcast event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum EventPayload {
    /// System manager state change.
    SystemState(SystemState),
    /// Intrusion report text.
    Intrusion {
        /// Report body, normally JSON.
        data: String,
    },
    /// EISS filter status.
    EissFilterStatus {
        /// Filter status code.
        filter_status: i32,
    },
    /// EISS application id list.
    EissAppIds(EissAppIdList),
    /// USB mount change.
    UsbMount(UsbMount),
    /// USB device detection.
    UsbDetected(UsbDetected),
    /// Maintenance module status.
    MaintenanceStatus {
        /// Module status code.
        status: i32,
    },
    /// New maintenance start time.
    MaintenanceStartTime {
        /// Start time as published by DCM.
        start_time: String,
    },
    /// Wi-Fi interface enablement.
    WifiInterfaceState {
        /// Whether the interface is enabled.
        enabled: bool,
    },
    /// Application download change marker.
    AppDownloadsChanged {
        /// Download status byte.
        status: u8,
    },
    /// RDM package installation status.
    RdmPackage(RdmPackageInfo),
    /// Output resolution change.
    Resolution {
        /// Width in pixels.
        width: i32,
        /// Height in pixels.
        height: i32,
    },
    /// Zoom setting.
    Zoom {
        /// Zoom mode.
        zoom: i32,
    },
    /// HDMI output hot plug.
    HdmiHotPlug {
        /// Whether a sink is connected.
        connected: bool,
    },
    /// HDCP status.
    HdcpStatus {
        /// HDCP status code.
        status: i32,
    },
    /// Audio output mode.
    AudioMode {
        /// Audio port type.
        port_type: i32,
        /// Stereo mode.
        mode: i32,
    },
    /// Audio level.
    AudioLevel {
        /// Level value.
        level: i32,
    },
    /// Time display format.
    TimeFormat {
        /// Format code.
        format: i32,
    },
    /// Input port hot plug (HDMI or composite).
    InputHotPlug {
        /// Input port index.
        port: i32,
        /// Whether a source is connected.
        connected: bool,
    },
    /// Input port signal status (HDMI or composite).
    InputSignalStatus {
        /// Input port index.
        port: i32,
        /// Signal status code.
        status: i32,
    },
    /// HDMI input presentation status.
    HdmiInStatus {
        /// Input port index.
        port: i32,
        /// Whether the port is being presented.
        presenting: bool,
    },
    /// HDMI input video mode.
    HdmiInVideoMode {
        /// Input port index.
        port: i32,
        /// Pixel resolution code.
        resolution: i32,
        /// Whether the mode is interlaced.
        interlaced: bool,
        /// Frame rate code.
        frame_rate: i32,
    },
    /// HDMI input ALLM status.
    HdmiInAllmStatus {
        /// Input port index.
        port: i32,
        /// ALLM mode.
        allm_mode: i32,
    },
    /// Audio output port hot plug.
    AudioOutHotPlug {
        /// Audio port type.
        port_type: i32,
        /// Port index within the type.
        index: i32,
        /// Whether a device is connected.
        connected: bool,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("short", 8, "short")]
    #[case("exactly7", 8, "exactly")]
    #[case("", 1, "")]
    #[case("héllo", 3, "h")]
    fn bounded_respects_capacity_and_char_boundaries(
        #[case] input: &str,
        #[case] capacity: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(bounded(input, capacity), expected);
    }

    #[test]
    fn system_state_payload_is_bounded() {
        let long = "x".repeat(SYSTEM_STATE_PAYLOAD_LEN * 2);
        let state = SystemState::new(39, 1, 0).with_payload(&long);
        assert_eq!(state.payload.len(), SYSTEM_STATE_PAYLOAD_LEN - 1);
    }

    #[test]
    fn payload_serialises_with_layout_tag() {
        let payload = EventPayload::HdmiHotPlug { connected: true };
        let json = serde_json::to_value(&payload).unwrap_or_default();
        assert_eq!(json["layout"], "hdmi_hot_plug");
        assert_eq!(json["connected"], true);
    }
}
