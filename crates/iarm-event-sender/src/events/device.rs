//! Device-settings events, addressed by their exact `IARM_`/`DSMgr_` names.

use iarm_bus::{
    DSMGR_OWNER, DsMgrEvent, EventPayload, SYSMGR_OWNER, SysMgrEvent, SystemState,
};

use crate::dispatch::{Emission, EventDescriptor, Param, ParsedArgs};

/// Device table, in usage order.
pub static DEVICE_EVENTS: &[EventDescriptor] = &[
    EventDescriptor {
        name: "IARM_HdmiAllmEvent",
        params: &[Param::int("port"), Param::int("allm_mode")],
        summary: "HDMI input ALLM mode change",
        handler: hdmi_in_allm,
    },
    EventDescriptor {
        name: "IARM_HdmiInHotPlug",
        params: &[Param::int("port"), Param::boolean("connected")],
        summary: "HDMI input hot plug",
        handler: hdmi_in_hot_plug,
    },
    EventDescriptor {
        name: "IARM_HdmiInSignalStatus",
        params: &[Param::int("port"), Param::int("status")],
        summary: "HDMI input signal status",
        handler: hdmi_in_signal_status,
    },
    EventDescriptor {
        name: "IARM_HdmiInStatus",
        params: &[Param::int("port"), Param::boolean("presenting")],
        summary: "HDMI input presentation status",
        handler: hdmi_in_status,
    },
    EventDescriptor {
        name: "IARM_HdmiInVideoMode",
        params: &[
            Param::int("port"),
            Param::int("resolution"),
            Param::boolean("interlaced"),
            Param::int("frame_rate"),
        ],
        summary: "HDMI input video mode update",
        handler: hdmi_in_video_mode,
    },
    EventDescriptor {
        name: "IARM_CompositeInHotPlug",
        params: &[Param::int("port"), Param::boolean("connected")],
        summary: "composite input hot plug",
        handler: composite_in_hot_plug,
    },
    EventDescriptor {
        name: "IARM_CompositeInSignalStatus",
        params: &[Param::int("port"), Param::int("status")],
        summary: "composite input signal status",
        handler: composite_in_signal_status,
    },
    EventDescriptor {
        name: "IARM_AudioOutHotPlug",
        params: &[
            Param::int("port_type"),
            Param::int("index"),
            Param::boolean("connected"),
        ],
        summary: "audio output port hot plug",
        handler: audio_out_hot_plug,
    },
    EventDescriptor {
        name: "IARM_SysStateEvent",
        params: &[
            Param::int("state_id"),
            Param::int("state"),
            Param::int("error"),
            Param::string("payload"),
        ],
        summary: "system state change with payload",
        handler: sys_state,
    },
    EventDescriptor {
        name: "DSMgr_HdmiHotPlug",
        params: &[Param::boolean("connected")],
        summary: "HDMI output hot plug",
        handler: hdmi_hot_plug,
    },
    EventDescriptor {
        name: "DSMgr_HdcpStatus",
        params: &[Param::int("status")],
        summary: "HDCP negotiation status",
        handler: hdcp_status,
    },
    EventDescriptor {
        name: "DSMgr_ResolutionPreChange",
        params: &[Param::int("width"), Param::int("height")],
        summary: "resolution about to change",
        handler: resolution_pre_change,
    },
    EventDescriptor {
        name: "DSMgr_ResolutionPostChange",
        params: &[Param::int("width"), Param::int("height")],
        summary: "resolution changed",
        handler: resolution_post_change,
    },
    EventDescriptor {
        name: "DSMgr_ZoomSettings",
        params: &[Param::int("zoom")],
        summary: "zoom setting changed",
        handler: zoom_settings,
    },
    EventDescriptor {
        name: "DSMgr_AudioMode",
        params: &[Param::int("port_type"), Param::int("mode")],
        summary: "audio output mode changed",
        handler: audio_mode,
    },
    EventDescriptor {
        name: "DSMgr_AudioLevelChanged",
        params: &[Param::int("level")],
        summary: "audio level changed",
        handler: audio_level_changed,
    },
    EventDescriptor {
        name: "DSMgr_TimeFormatChange",
        params: &[Param::int("format")],
        summary: "time format changed",
        handler: time_format_change,
    },
];

const fn ds(event: DsMgrEvent, payload: EventPayload) -> Emission {
    Emission::broadcast(DSMGR_OWNER, event.id(), payload)
}

fn hdmi_in_allm(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdmiInAllmStatus,
        EventPayload::HdmiInAllmStatus {
            port: args.integer(0),
            allm_mode: args.integer(1),
        },
    )
}

fn hdmi_in_hot_plug(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdmiInHotPlug,
        EventPayload::InputHotPlug {
            port: args.integer(0),
            connected: args.boolean(1),
        },
    )
}

fn hdmi_in_signal_status(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdmiInSignalStatus,
        EventPayload::InputSignalStatus {
            port: args.integer(0),
            status: args.integer(1),
        },
    )
}

fn hdmi_in_status(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdmiInStatus,
        EventPayload::HdmiInStatus {
            port: args.integer(0),
            presenting: args.boolean(1),
        },
    )
}

fn hdmi_in_video_mode(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdmiInVideoModeUpdate,
        EventPayload::HdmiInVideoMode {
            port: args.integer(0),
            resolution: args.integer(1),
            interlaced: args.boolean(2),
            frame_rate: args.integer(3),
        },
    )
}

fn composite_in_hot_plug(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::CompositeInHotPlug,
        EventPayload::InputHotPlug {
            port: args.integer(0),
            connected: args.boolean(1),
        },
    )
}

fn composite_in_signal_status(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::CompositeInSignalStatus,
        EventPayload::InputSignalStatus {
            port: args.integer(0),
            status: args.integer(1),
        },
    )
}

fn audio_out_hot_plug(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::AudioOutHotPlug,
        EventPayload::AudioOutHotPlug {
            port_type: args.integer(0),
            index: args.integer(1),
            connected: args.boolean(2),
        },
    )
}

fn sys_state(args: &ParsedArgs) -> Emission {
    let state = SystemState::new(args.integer(0), args.integer(1), args.integer(2))
        .with_payload(args.string(3));
    Emission::broadcast(
        SYSMGR_OWNER,
        SysMgrEvent::SystemState.id(),
        EventPayload::SystemState(state),
    )
}

fn hdmi_hot_plug(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdmiHotPlug,
        EventPayload::HdmiHotPlug {
            connected: args.boolean(0),
        },
    )
}

fn hdcp_status(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::HdcpStatus,
        EventPayload::HdcpStatus {
            status: args.integer(0),
        },
    )
}

fn resolution_pre_change(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::ResolutionPreChange,
        EventPayload::Resolution {
            width: args.integer(0),
            height: args.integer(1),
        },
    )
}

fn resolution_post_change(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::ResolutionPostChange,
        EventPayload::Resolution {
            width: args.integer(0),
            height: args.integer(1),
        },
    )
}

fn zoom_settings(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::ZoomSettings,
        EventPayload::Zoom {
            zoom: args.integer(0),
        },
    )
}

fn audio_mode(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::AudioMode,
        EventPayload::AudioMode {
            port_type: args.integer(0),
            mode: args.integer(1),
        },
    )
}

fn audio_level_changed(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::AudioLevelChanged,
        EventPayload::AudioLevel {
            level: args.integer(0),
        },
    )
}

fn time_format_change(args: &ParsedArgs) -> Emission {
    ds(
        DsMgrEvent::TimeFormatChange,
        EventPayload::TimeFormat {
            format: args.integer(0),
        },
    )
}
