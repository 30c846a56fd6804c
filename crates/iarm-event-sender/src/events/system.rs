//! System-manager and legacy events.
//!
//! Several names accept more than one argument count; each count is its own
//! descriptor and the router picks the one that fits.

use iarm_bus::{
    CTRLM_DEVICE_UPDATE_API_REVISION, CTRLM_DEVICE_UPDATE_PATH_LEN, CTRLM_OWNER,
    CTRLM_UPDATE_AVAILABLE_CALL, EISS_APP_ID_LEN, EissAppIdList, EventPayload,
    INTRUSION_MAX_LEN, MAINTENANCE_MGR_OWNER, MAINTENANCE_START_TIME_LEN, MaintenanceEvent,
    NET_SRV_MGR_OWNER, NET_SRV_MGR_WIFI_INTERFACE_STATE, RDM_PKG_INST_PATH_LEN, RDM_PKG_NAME_LEN,
    RDM_PKG_VERSION_LEN, RDMMGR_OWNER, RdmMgrEvent, RdmPackageInfo, SYSMGR_OWNER, SysMgrEvent,
    SystemState, SystemStateId, USB_DETECTED_FIELD_LEN, USB_MOUNT_DEVICE_LEN, USB_MOUNT_DIR_LEN,
    UsbDetected, UsbMount, bounded,
};
use serde_json::json;

use crate::dispatch::{Emission, EventDescriptor, Param, ParsedArgs, parse_integer};

const STATUS: &[Param] = &[Param::int("status")];
const TAGGED_PAYLOAD: &[Param] = &[Param::string("tag"), Param::string("payload")];

/// Longest payload accepted before abbreviation.
const ABBREVIATION_THRESHOLD: usize = INTRUSION_MAX_LEN;
/// Bytes of the original payload kept in an abbreviated one.
const ABBREVIATED_PREFIX_LEN: usize = 1018;
const ABBREVIATION_MARKER: char = '+';
const JSON_TERMINATOR: &str = "\"}]}";

macro_rules! sys_state_event {
    ($name:literal, $handler:ident, $summary:literal) => {
        EventDescriptor {
            name: $name,
            params: STATUS,
            summary: $summary,
            handler: $handler,
        }
    };
}

/// System table, in usage order.
pub static SYSTEM_EVENTS: &[EventDescriptor] = &[
    sys_state_event!("ImageDwldEvent", image_download, "firmware download state"),
    sys_state_event!("GatewayConnEvent", gateway_connection, "gateway connection state"),
    sys_state_event!("TuneReadyEvent", tune_ready, "tuner ready state"),
    sys_state_event!("MocaStatusEvent", moca, "MoCA link state"),
    sys_state_event!("ChannelMapEvent", channel_map, "channel map state"),
    sys_state_event!("NTPReceivedEvent", time_source, "time source state"),
    sys_state_event!("PartnerIdEvent", partner_id, "partner id change"),
    sys_state_event!("FirmwareStateEvent", firmware_update_state, "firmware update state"),
    sys_state_event!("IpmodeEvent", ip_mode_status, "IP mode state"),
    sys_state_event!("usbdetected", usb_detected_status, "USB detection state"),
    sys_state_event!("LogUploadEvent", log_upload, "log upload state"),
    sys_state_event!("RedStateEvent", red_recovery, "red recovery update state"),
    EventDescriptor {
        name: "EISSFilterEvent",
        params: STATUS,
        summary: "EISS filter status",
        handler: eiss_filter,
    },
    EventDescriptor {
        name: "MaintenanceMGR",
        params: STATUS,
        summary: "maintenance module status",
        handler: maintenance_status,
    },
    EventDescriptor {
        name: "WiFiInterfaceStateEvent",
        params: STATUS,
        summary: "Wi-Fi interface enabled when non-zero",
        handler: wifi_interface_state,
    },
    EventDescriptor {
        name: "AppDownloadEvent",
        params: STATUS,
        summary: "application downloads changed",
        handler: app_downloads_changed,
    },
    EventDescriptor {
        name: "IntrusionEvent",
        params: TAGGED_PAYLOAD,
        summary: "intrusion report",
        handler: intrusion,
    },
    EventDescriptor {
        name: "IpmodeEvent",
        params: TAGGED_PAYLOAD,
        summary: "IP mode change with payload",
        handler: ip_mode_payload,
    },
    EventDescriptor {
        name: "MaintenanceMGR",
        params: TAGGED_PAYLOAD,
        summary: "new maintenance start time",
        handler: maintenance_start_time,
    },
    EventDescriptor {
        name: "RDMAppStatusEvent",
        params: TAGGED_PAYLOAD,
        summary: "package installation record",
        handler: rdm_app_status,
    },
    EventDescriptor {
        name: "PeripheralUpgradeEvent",
        params: &[Param::string("location"), Param::string("names")],
        summary: "announce peripheral firmware",
        handler: peripheral_upgrade,
    },
    EventDescriptor {
        name: "CustomEvent",
        params: &[
            Param::int("state_id"),
            Param::int("state"),
            Param::int("error"),
        ],
        summary: "arbitrary system state",
        handler: custom,
    },
    EventDescriptor {
        name: "USBMountChangedEvent",
        params: &[
            Param::int("mounted"),
            Param::string("device"),
            Param::string("dir"),
        ],
        summary: "USB storage mount change",
        handler: usb_mount_changed,
    },
    EventDescriptor {
        name: "usbdetected",
        params: &[
            Param::string("action"),
            Param::string("vendor"),
            Param::string("product"),
            Param::string("device"),
        ],
        summary: "USB device add or remove",
        handler: usb_detected,
    },
    EventDescriptor {
        name: "EISSAppIdEvent",
        params: &[
            Param::int("id1"),
            Param::int("id2"),
            Param::int("id3"),
            Param::int("id4"),
        ],
        summary: "EISS application id list",
        handler: eiss_app_ids,
    },
];

/// Shortens an oversized text payload the way listeners expect.
///
/// Payloads longer than the intrusion buffer keep their first 1018 bytes and
/// end in `+"}]}` so a truncated JSON report still parses.
#[must_use]
pub fn abbreviate_payload(payload: &str) -> String {
    if payload.len() <= ABBREVIATION_THRESHOLD {
        return payload.to_owned();
    }
    let mut end = ABBREVIATED_PREFIX_LEN;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    let mut abbreviated = String::with_capacity(end + 1 + JSON_TERMINATOR.len());
    abbreviated.push_str(payload.get(..end).unwrap_or_default());
    abbreviated.push(ABBREVIATION_MARKER);
    abbreviated.push_str(JSON_TERMINATOR);
    abbreviated
}

/// Low byte of a status value; listeners only ever see one byte.
#[expect(
    clippy::little_endian_bytes,
    reason = "the first little-endian byte is the low byte on every host"
)]
const fn status_byte(value: i32) -> u8 {
    value.to_le_bytes()[0]
}

fn system_state(state: SystemState) -> Emission {
    Emission::broadcast(
        SYSMGR_OWNER,
        SysMgrEvent::SystemState.id(),
        EventPayload::SystemState(state),
    )
}

fn sys_state_status(id: SystemStateId, args: &ParsedArgs) -> Emission {
    let state = i32::from(status_byte(args.integer(0)));
    system_state(SystemState::new(id.id(), state, 0))
}

fn image_download(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::FirmwareDownload, args)
}

fn gateway_connection(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::GatewayConnection, args)
}

fn tune_ready(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::TuneReady, args)
}

fn moca(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::Moca, args)
}

fn channel_map(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::ChannelMap, args)
}

fn time_source(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::TimeSource, args)
}

fn partner_id(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::PartnerIdChange, args)
}

fn firmware_update_state(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::FirmwareUpdateState, args)
}

fn ip_mode_status(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::IpMode, args)
}

fn usb_detected_status(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::UsbDetected, args)
}

fn log_upload(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::LogUpload, args)
}

fn red_recovery(args: &ParsedArgs) -> Emission {
    sys_state_status(SystemStateId::RedRecoveryUpdateState, args)
}

fn eiss_filter(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        SYSMGR_OWNER,
        SysMgrEvent::EissFilterStatus.id(),
        EventPayload::EissFilterStatus {
            filter_status: i32::from(status_byte(args.integer(0))),
        },
    )
}

fn maintenance_status(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        MAINTENANCE_MGR_OWNER,
        MaintenanceEvent::Update.id(),
        EventPayload::MaintenanceStatus {
            status: i32::from(status_byte(args.integer(0))),
        },
    )
}

fn wifi_interface_state(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        NET_SRV_MGR_OWNER,
        NET_SRV_MGR_WIFI_INTERFACE_STATE,
        EventPayload::WifiInterfaceState {
            enabled: status_byte(args.integer(0)) != 0,
        },
    )
}

fn app_downloads_changed(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        RDMMGR_OWNER,
        RdmMgrEvent::AppDownloadsChanged.id(),
        EventPayload::AppDownloadsChanged {
            status: status_byte(args.integer(0)),
        },
    )
}

/// The second argument, abbreviated. The first is a free tag.
fn payload_argument(args: &ParsedArgs) -> String {
    abbreviate_payload(args.string(1))
}

fn intrusion(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        SYSMGR_OWNER,
        SysMgrEvent::Intrusion.id(),
        EventPayload::Intrusion {
            data: bounded(&payload_argument(args), INTRUSION_MAX_LEN),
        },
    )
}

fn ip_mode_payload(args: &ParsedArgs) -> Emission {
    system_state(
        SystemState::new(SystemStateId::IpMode.id(), 1, 0).with_payload(&payload_argument(args)),
    )
}

fn maintenance_start_time(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        MAINTENANCE_MGR_OWNER,
        MaintenanceEvent::NewStartTime.id(),
        EventPayload::MaintenanceStartTime {
            start_time: bounded(&payload_argument(args), MAINTENANCE_START_TIME_LEN),
        },
    )
}

/// Parses a newline-separated `key:value` package record.
///
/// Keys are matched by substring and the value is everything after the first
/// colon. Unrecognised lines are ignored.
fn parse_package_record(record: &str) -> RdmPackageInfo {
    let mut info = RdmPackageInfo::default();
    for line in record.split('\n').filter(|line| !line.is_empty()) {
        let Some((_, value)) = line.split_once(':') else {
            continue;
        };
        if line.contains("pkg_name") {
            info.name = bounded(value, RDM_PKG_NAME_LEN);
        } else if line.contains("pkg_version") {
            info.version = bounded(value, RDM_PKG_VERSION_LEN);
        } else if line.contains("pkg_inst_path") {
            info.install_path = bounded(value, RDM_PKG_INST_PATH_LEN);
        } else if line.contains("pkg_inst_status") {
            info.install_status = parse_integer(value);
        } else {
            tracing::debug!(line, "ignoring unrecognised package record line");
        }
    }
    info
}

fn rdm_app_status(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        RDMMGR_OWNER,
        RdmMgrEvent::AppInstallationStatus.id(),
        EventPayload::RdmPackage(parse_package_record(&payload_argument(args))),
    )
}

fn peripheral_upgrade(args: &ParsedArgs) -> Emission {
    let joined = abbreviate_payload(&format!("{}:{}", args.string(0), args.string(1)));
    let mut parts = joined.split(':').filter(|part| !part.is_empty());
    let location = parts.next().unwrap_or_default();
    let names = parts.next().unwrap_or_default();
    Emission::Call {
        owner: CTRLM_OWNER,
        method: CTRLM_UPDATE_AVAILABLE_CALL,
        argument: json!({
            "api_revision": CTRLM_DEVICE_UPDATE_API_REVISION,
            "firmware_location": bounded(location, CTRLM_DEVICE_UPDATE_PATH_LEN),
            "firmware_names": bounded(names, CTRLM_DEVICE_UPDATE_PATH_LEN),
        }),
    }
}

fn custom(args: &ParsedArgs) -> Emission {
    system_state(SystemState::new(
        args.integer(0),
        args.integer(1),
        args.integer(2),
    ))
}

fn usb_mount_changed(args: &ParsedArgs) -> Emission {
    Emission::broadcast(
        SYSMGR_OWNER,
        SysMgrEvent::UsbMountChanged.id(),
        EventPayload::UsbMount(UsbMount {
            mounted: args.integer(0),
            device: bounded(args.string(1), USB_MOUNT_DEVICE_LEN),
            dir: bounded(args.string(2), USB_MOUNT_DIR_LEN),
        }),
    )
}

/// `add` reports 0 and `remove` reports 1; listeners rely on this inversion.
/// Any other action reports 0.
fn usb_detected(args: &ParsedArgs) -> Emission {
    let inserted = i32::from(args.string(0).eq_ignore_ascii_case("remove"));
    let event_id = u32::try_from(SystemStateId::UsbDetected.id()).unwrap_or_default();
    Emission::broadcast(
        SYSMGR_OWNER,
        event_id,
        EventPayload::UsbDetected(UsbDetected {
            inserted,
            vendor: bounded(args.string(1), USB_DETECTED_FIELD_LEN),
            product_id: bounded(args.string(2), USB_DETECTED_FIELD_LEN),
            device_name: bounded(args.string(3), USB_DETECTED_FIELD_LEN),
        }),
    )
}

/// Packs an id as a 48-bit big-endian value.
#[expect(
    clippy::big_endian_bytes,
    reason = "listeners read application ids in network byte order"
)]
fn pack_app_id(id: i32) -> [u8; EISS_APP_ID_LEN] {
    let wide = i64::from(id).to_be_bytes();
    let mut packed = [0; EISS_APP_ID_LEN];
    for (slot, byte) in packed
        .iter_mut()
        .zip(wide.iter().skip(wide.len() - EISS_APP_ID_LEN))
    {
        *slot = *byte;
    }
    packed
}

fn eiss_app_ids(args: &ParsedArgs) -> Emission {
    let ids: Vec<_> = (0..4).map(|index| pack_app_id(args.integer(index))).collect();
    Emission::broadcast(
        SYSMGR_OWNER,
        SysMgrEvent::EissAppIdUpdate.id(),
        EventPayload::EissAppIds(EissAppIdList { count: 4, ids }),
    )
}
