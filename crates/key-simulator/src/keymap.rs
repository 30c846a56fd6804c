//! IR key codes and their Linux input equivalents.

use crate::errors::KeyError;

/// Linux input key codes used by the map.
#[expect(missing_docs, reason = "names match the kernel's input-event-codes")]
pub mod linux {
    pub const KEY_ESC: u16 = 1;
    pub const KEY_1: u16 = 2;
    pub const KEY_2: u16 = 3;
    pub const KEY_3: u16 = 4;
    pub const KEY_4: u16 = 5;
    pub const KEY_5: u16 = 6;
    pub const KEY_6: u16 = 7;
    pub const KEY_7: u16 = 8;
    pub const KEY_8: u16 = 9;
    pub const KEY_9: u16 = 10;
    pub const KEY_0: u16 = 11;
    pub const KEY_BACKSPACE: u16 = 14;
    pub const KEY_ENTER: u16 = 28;
    pub const KEY_LEFTSHIFT: u16 = 42;
    pub const KEY_DOT: u16 = 52;
    pub const KEY_KPENTER: u16 = 96;
    pub const KEY_UP: u16 = 103;
    pub const KEY_PAGEUP: u16 = 104;
    pub const KEY_LEFT: u16 = 105;
    pub const KEY_RIGHT: u16 = 106;
    pub const KEY_DOWN: u16 = 108;
    pub const KEY_PAGEDOWN: u16 = 109;
    pub const KEY_MUTE: u16 = 113;
    pub const KEY_VOLUMEDOWN: u16 = 114;
    pub const KEY_VOLUMEUP: u16 = 115;
    pub const KEY_POWER: u16 = 116;
    pub const KEY_PAUSE: u16 = 119;
    pub const KEY_STOP: u16 = 128;
    pub const KEY_HELP: u16 = 138;
    pub const KEY_MENU: u16 = 139;
    pub const KEY_SETUP: u16 = 141;
    pub const KEY_BACK: u16 = 158;
    pub const KEY_NEXTSONG: u16 = 163;
    pub const KEY_PREVIOUSSONG: u16 = 165;
    pub const KEY_RECORD: u16 = 167;
    pub const KEY_REWIND: u16 = 168;
    pub const KEY_PLAY: u16 = 207;
    pub const KEY_FASTFORWARD: u16 = 208;
    pub const KEY_SEARCH: u16 = 217;
    pub const KEY_SELECT: u16 = 0x161;
    pub const KEY_CLEAR: u16 = 0x163;
    pub const KEY_INFO: u16 = 0x166;
    pub const KEY_FAVORITES: u16 = 0x16c;
    pub const KEY_EPG: u16 = 0x16d;
    pub const KEY_TV: u16 = 0x179;
    pub const KEY_RED: u16 = 0x18e;
    pub const KEY_GREEN: u16 = 0x18f;
    pub const KEY_YELLOW: u16 = 0x190;
    pub const KEY_BLUE: u16 = 0x191;
    pub const KEY_CHANNELUP: u16 = 0x192;
    pub const KEY_CHANNELDOWN: u16 = 0x193;
    pub const KEY_LAST: u16 = 0x195;
}

#[expect(clippy::wildcard_imports, reason = "the map names every key code")]
use linux::*;

/// One IR key and the Linux key (plus optional modifier) it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapping {
    /// IR key name without its `KED_` prefix.
    pub name: &'static str,
    /// IR key code.
    pub ir_code: u32,
    /// Linux key code.
    pub key: u16,
    /// Linux modifier held around the key, if any.
    pub modifier: Option<u16>,
}

const fn plain(name: &'static str, ir_code: u32, key: u16) -> KeyMapping {
    KeyMapping {
        name,
        ir_code,
        key,
        modifier: None,
    }
}

const fn shifted(name: &'static str, ir_code: u32, key: u16) -> KeyMapping {
    KeyMapping {
        name,
        ir_code,
        key,
        modifier: Some(KEY_LEFTSHIFT),
    }
}

/// Every IR key the simulator can inject.
pub static KEY_MAP: &[KeyMapping] = &[
    plain("DIGIT0", 0x30, KEY_0),
    plain("DIGIT1", 0x31, KEY_1),
    plain("DIGIT2", 0x32, KEY_2),
    plain("DIGIT3", 0x33, KEY_3),
    plain("DIGIT4", 0x34, KEY_4),
    plain("DIGIT5", 0x35, KEY_5),
    plain("DIGIT6", 0x36, KEY_6),
    plain("DIGIT7", 0x37, KEY_7),
    plain("DIGIT8", 0x38, KEY_8),
    plain("DIGIT9", 0x39, KEY_9),
    plain("PERIOD", 0x40, KEY_DOT),
    plain("SETUP", 0x52, KEY_SETUP),
    plain("POWER", 0x80, KEY_POWER),
    plain("ARROWUP", 0x81, KEY_UP),
    plain("ARROWDOWN", 0x82, KEY_DOWN),
    plain("ARROWLEFT", 0x83, KEY_LEFT),
    plain("ARROWRIGHT", 0x84, KEY_RIGHT),
    plain("SELECT", 0x85, KEY_SELECT),
    plain("ENTER", 0x86, KEY_KPENTER),
    plain("EXIT", 0x87, KEY_ESC),
    plain("CHANNELUP", 0x88, KEY_CHANNELUP),
    plain("CHANNELDOWN", 0x89, KEY_CHANNELDOWN),
    plain("VOLUMEUP", 0x8a, KEY_VOLUMEUP),
    plain("VOLUMEDOWN", 0x8b, KEY_VOLUMEDOWN),
    plain("MUTE", 0x8c, KEY_MUTE),
    plain("GUIDE", 0x8d, KEY_EPG),
    plain("INFO", 0x8e, KEY_INFO),
    plain("SETTINGS", 0x8f, KEY_MENU),
    plain("PAGEUP", 0x90, KEY_PAGEUP),
    plain("PAGEDOWN", 0x91, KEY_PAGEDOWN),
    plain("KEYA", 0x92, KEY_YELLOW),
    plain("KEYB", 0x93, KEY_BLUE),
    plain("KEYC", 0x94, KEY_RED),
    plain("LAST", 0x95, KEY_LAST),
    plain("FAVORITE", 0x96, KEY_FAVORITES),
    plain("REWIND", 0x97, KEY_REWIND),
    plain("FASTFORWARD", 0x98, KEY_FASTFORWARD),
    plain("PLAY", 0x99, KEY_PLAY),
    plain("STOP", 0x9a, KEY_STOP),
    plain("PAUSE", 0x9b, KEY_PAUSE),
    plain("RECORD", 0x9c, KEY_RECORD),
    plain("KEYD", 0x9f, KEY_GREEN),
    plain("HELP", 0xa1, KEY_HELP),
    plain("CLEAR", 0xa3, KEY_CLEAR),
    plain("DELETE", 0xa4, KEY_BACKSPACE),
    shifted("POUND", 0xa6, KEY_3),
    plain("OK", 0xa9, KEY_ENTER),
    shifted("STAR", 0xaa, KEY_8),
    plain("MENU", 0xc0, KEY_MENU),
    plain("TVPOWER", 0xc1, KEY_TV),
    plain("PREVIOUS", 0xc3, KEY_PREVIOUSSONG),
    plain("NEXT", 0xc4, KEY_NEXTSONG),
    plain("SEARCH", 0xcf, KEY_SEARCH),
    plain("BACK", 0x1000_00fe, KEY_BACK),
];

/// Finds the mapping for an IR key code.
#[must_use]
pub fn lookup_ir(ir_code: u32) -> Option<&'static KeyMapping> {
    KEY_MAP.iter().find(|mapping| mapping.ir_code == ir_code)
}

/// Resolves a key argument: an IR key name (case-insensitive, optional
/// `KED_` prefix) or a decimal or `0x` hexadecimal IR code.
///
/// # Errors
///
/// Returns [`KeyError::UnknownKey`] when the argument names no mapped key.
pub fn resolve_key(argument: &str) -> Result<&'static KeyMapping, KeyError> {
    let name = argument
        .get(..4)
        .filter(|prefix| prefix.eq_ignore_ascii_case("KED_"))
        .and_then(|_| argument.get(4..))
        .unwrap_or(argument);

    KEY_MAP
        .iter()
        .find(|mapping| mapping.name.eq_ignore_ascii_case(name))
        .or_else(|| parse_ir_code(argument).and_then(lookup_ir))
        .ok_or_else(|| KeyError::UnknownKey(argument.to_owned()))
}

fn parse_ir_code(argument: &str) -> Option<u32> {
    argument
        .strip_prefix("0x")
        .or_else(|| argument.strip_prefix("0X"))
        .map_or_else(
            || argument.parse().ok(),
            |hex| u32::from_str_radix(hex, 16).ok(),
        )
}
