//! Bus owner names and event identifiers.
//!
//! Numbering follows the declaration order of the broker's public headers so
//! listeners written against those headers decode the ids unchanged.

/// System manager owner name.
pub const SYSMGR_OWNER: &str = "SYSMgr";
/// Device-settings manager owner name.
pub const DSMGR_OWNER: &str = "DSMgr";
/// Maintenance manager owner name.
pub const MAINTENANCE_MGR_OWNER: &str = "MaintenanceMGR";
/// Remote download manager owner name.
pub const RDMMGR_OWNER: &str = "RDMMgr";
/// Network service manager owner name.
pub const NET_SRV_MGR_OWNER: &str = "NET_SRV_MGR";
/// Control manager owner name, target of peripheral upgrade calls.
pub const CTRLM_OWNER: &str = "Ctrlm";
/// Power manager plugin owner name.
pub const POWER_MANAGER_OWNER: &str = "PowerManager";
/// Manufacturing library owner name.
pub const MFRLIB_OWNER: &str = "MFRLib";

/// Events owned by the system manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SysMgrEvent {
    /// Generic system-state change carrying [`SystemStateId`].
    SystemState = 0,
    /// Intrusion-detection report.
    Intrusion = 6,
    /// EISS filter status change.
    EissFilterStatus = 7,
    /// EISS application id list update.
    EissAppIdUpdate = 8,
    /// USB mass storage mount change.
    UsbMountChanged = 10,
}

impl SysMgrEvent {
    /// Returns the wire identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// System-state identifiers carried inside [`SysMgrEvent::SystemState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SystemStateId {
    /// Channel map availability.
    ChannelMap = 0,
    /// Tuner readiness.
    TuneReady = 2,
    /// Firmware image download progress.
    FirmwareDownload = 12,
    /// Time source acquisition.
    TimeSource = 13,
    /// MoCA link status.
    Moca = 19,
    /// Gateway connection status.
    GatewayConnection = 35,
    /// Partner id change.
    PartnerIdChange = 38,
    /// IP mode (v4/v6) change.
    IpMode = 39,
    /// Firmware update state machine.
    FirmwareUpdateState = 43,
    /// USB device detection.
    UsbDetected = 44,
    /// Log upload status.
    LogUpload = 45,
    /// Red recovery update state.
    RedRecoveryUpdateState = 46,
}

impl SystemStateId {
    /// Returns the wire identifier.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }
}

/// Events owned by the device-settings manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DsMgrEvent {
    /// Output resolution is about to change.
    ResolutionPreChange = 0,
    /// Output resolution changed.
    ResolutionPostChange = 1,
    /// Zoom setting changed.
    ZoomSettings = 2,
    /// HDMI output hot plug.
    HdmiHotPlug = 3,
    /// Audio output mode changed.
    AudioMode = 4,
    /// HDCP negotiation status.
    HdcpStatus = 5,
    /// HDMI input hot plug.
    HdmiInHotPlug = 7,
    /// HDMI input signal status.
    HdmiInSignalStatus = 8,
    /// HDMI input presentation status.
    HdmiInStatus = 9,
    /// HDMI input video mode update.
    HdmiInVideoModeUpdate = 10,
    /// HDMI input ALLM status.
    HdmiInAllmStatus = 11,
    /// Composite input hot plug.
    CompositeInHotPlug = 12,
    /// Composite input signal status.
    CompositeInSignalStatus = 13,
    /// Time format changed.
    TimeFormatChange = 15,
    /// Audio level changed.
    AudioLevelChanged = 16,
    /// Audio output port hot plug.
    AudioOutHotPlug = 17,
}

impl DsMgrEvent {
    /// Returns the wire identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Events owned by the maintenance manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MaintenanceEvent {
    /// Maintenance module status update.
    Update = 0,
    /// DCM published a new maintenance start time.
    NewStartTime = 1,
}

impl MaintenanceEvent {
    /// Returns the wire identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Events owned by the remote download manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RdmMgrEvent {
    /// Application downloads changed.
    AppDownloadsChanged = 0,
    /// Package installation status.
    AppInstallationStatus = 1,
}

impl RdmMgrEvent {
    /// Returns the wire identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Wi-Fi interface state change owned by the network service manager.
pub const NET_SRV_MGR_WIFI_INTERFACE_STATE: u32 = 52;

/// Control manager call announcing available peripheral firmware.
pub const CTRLM_UPDATE_AVAILABLE_CALL: &str = "DeviceUpdate_UpdateAvailable";

/// API revision stamped on peripheral upgrade calls.
pub const CTRLM_DEVICE_UPDATE_API_REVISION: u32 = 5;
