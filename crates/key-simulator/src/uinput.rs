//! [`KeySink`] backed by a Linux uinput virtual keyboard.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use libc::c_char;
use tracing::{debug, warn};

use crate::errors::KeyError;
use crate::keymap::KEY_MAP;
use crate::sequence::KeyStroke;
use crate::sink::{KEY_TARGET, KeySink};

/// Default uinput device node.
pub const DEFAULT_UINPUT_PATH: &str = "/dev/uinput";
/// Name the virtual keyboard registers under.
pub const DEVICE_NAME: &str = "key-simulator";

const EV_SYN: u16 = 0x00;
const EV_KEY: u16 = 0x01;
const SYN_REPORT: u16 = 0;
const BUS_USB: u16 = 0x03;
const VENDOR_ID: u16 = 0xbeef;
const PRODUCT_ID: u16 = 0xfedc;
const UINPUT_MAX_NAME_SIZE: usize = 80;

#[repr(C)]
#[derive(Clone, Copy)]
struct InputId {
    bustype: u16,
    vendor: u16,
    product: u16,
    version: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct UinputSetup {
    id: InputId,
    name: [c_char; UINPUT_MAX_NAME_SIZE],
    ff_effects_max: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct InputEvent {
    time: libc::timeval,
    kind: u16,
    code: u16,
    value: i32,
}

impl InputEvent {
    const fn new(kind: u16, code: u16, value: i32, time: libc::timeval) -> Self {
        Self {
            time,
            kind,
            code,
            value,
        }
    }

    const fn as_bytes(&self) -> &[u8] {
        // SAFETY: `InputEvent` is `repr(C)`, `Copy` and has no padding on
        // the targets uinput exists on, so every byte is initialised.
        unsafe { std::slice::from_raw_parts(std::ptr::from_ref(self).cast(), size_of::<Self>()) }
    }
}

fn now() -> libc::timeval {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    libc::timeval {
        tv_sec: libc::time_t::try_from(elapsed.as_secs()).unwrap_or(libc::time_t::MAX),
        tv_usec: libc::suseconds_t::try_from(elapsed.subsec_micros()).unwrap_or_default(),
    }
}

#[expect(
    clippy::host_endian_bytes,
    reason = "c_char is one byte wide, so byte order cannot change its value"
)]
fn device_name() -> [c_char; UINPUT_MAX_NAME_SIZE] {
    let mut name = [0; UINPUT_MAX_NAME_SIZE];
    for (slot, byte) in name.iter_mut().zip(DEVICE_NAME.bytes()) {
        *slot = c_char::from_ne_bytes([byte]);
    }
    name
}

mod ioctl {
    use nix::{ioctl_none, ioctl_write_int, ioctl_write_ptr};

    use super::UinputSetup;

    ioctl_none!(ui_dev_create, b'U', 1);
    ioctl_none!(ui_dev_destroy, b'U', 2);
    ioctl_write_ptr!(ui_dev_setup, b'U', 3, UinputSetup);
    ioctl_write_int!(ui_set_evbit, b'U', 100);
    ioctl_write_int!(ui_set_keybit, b'U', 101);
}

const fn setup_error(request: &'static str, source: nix::errno::Errno) -> KeyError {
    KeyError::Setup { request, source }
}

/// Virtual keyboard created through uinput, destroyed on drop.
pub struct UinputKeyboard {
    file: File,
}

impl UinputKeyboard {
    /// Opens `path` and creates a keyboard able to send every mapped key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Open`] when the node cannot be opened and
    /// [`KeyError::Setup`] when the kernel refuses a setup request.
    pub fn create(path: &Path) -> Result<Self, KeyError> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| KeyError::Open {
                path: path.display().to_string(),
                source,
            })?;
        let fd = file.as_raw_fd();

        let setup = UinputSetup {
            id: InputId {
                bustype: BUS_USB,
                vendor: VENDOR_ID,
                product: PRODUCT_ID,
                version: 1,
            },
            name: device_name(),
            ff_effects_max: 0,
        };

        // SAFETY: `fd` is an open uinput node for the whole block and
        // `setup` outlives the call that borrows it.
        unsafe {
            ioctl::ui_set_evbit(fd, EV_KEY.into())
                .map_err(|source| setup_error("UI_SET_EVBIT", source))?;
            ioctl::ui_set_evbit(fd, EV_SYN.into())
                .map_err(|source| setup_error("UI_SET_EVBIT", source))?;
            for mapping in KEY_MAP {
                for code in std::iter::once(mapping.key).chain(mapping.modifier) {
                    ioctl::ui_set_keybit(fd, code.into())
                        .map_err(|source| setup_error("UI_SET_KEYBIT", source))?;
                }
            }
            ioctl::ui_dev_setup(fd, &raw const setup)
                .map_err(|source| setup_error("UI_DEV_SETUP", source))?;
            ioctl::ui_dev_create(fd).map_err(|source| setup_error("UI_DEV_CREATE", source))?;
        }
        debug!(target: KEY_TARGET, path = %path.display(), "uinput keyboard created");
        Ok(Self { file })
    }

    fn write_event(&mut self, event: &InputEvent) -> Result<(), KeyError> {
        self.file.write_all(event.as_bytes()).map_err(KeyError::Write)
    }
}

impl KeySink for UinputKeyboard {
    fn emit(&mut self, stroke: KeyStroke) -> Result<(), KeyError> {
        let time = now();
        self.write_event(&InputEvent::new(EV_KEY, stroke.code, stroke.value, time))?;
        self.write_event(&InputEvent::new(EV_SYN, SYN_REPORT, 0, time))
    }
}

impl Drop for UinputKeyboard {
    fn drop(&mut self) {
        // SAFETY: the descriptor stays open until `file` drops after this.
        if let Err(error) = unsafe { ioctl::ui_dev_destroy(self.file.as_raw_fd()) } {
            warn!(target: KEY_TARGET, %error, "uinput destroy failed");
        }
    }
}
