//! Reader for the power manager's cached settings file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::SettingsError;
use crate::state::PowerState;

/// Default location of the cached settings.
pub const DEFAULT_SETTINGS_PATH: &str = "/opt/uimgr_settings.bin";

const FIELD_COUNT: usize = 7;
const FIELD_LEN: usize = 4;
/// Bytes of the settings header that are read; trailing padding is ignored.
pub const SETTINGS_HEADER_LEN: usize = FIELD_COUNT * FIELD_LEN;

/// Header of the cached settings, fields in native byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerSettings {
    /// File magic.
    pub magic: u32,
    /// Layout version.
    pub version: u32,
    /// Declared length.
    pub length: u32,
    /// Power state in the settings numbering.
    pub power_state: u32,
    /// Front-panel LED brightness.
    pub led_brightness: u32,
    /// Front-panel LED colour.
    pub led_color: u32,
    /// Deep-sleep timeout in seconds.
    pub deep_sleep_timeout: u32,
}

impl PowerSettings {
    /// Decodes a header. Missing trailing bytes read as zero.
    #[must_use]
    #[expect(
        clippy::host_endian_bytes,
        reason = "the power manager writes the cache in the device's native byte order"
    )]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut header = [0_u8; SETTINGS_HEADER_LEN];
        for (slot, byte) in header.iter_mut().zip(bytes) {
            *slot = *byte;
        }

        let mut fields = [0_u32; FIELD_COUNT];
        for (field, chunk) in fields.iter_mut().zip(header.chunks_exact(FIELD_LEN)) {
            let mut word = [0_u8; FIELD_LEN];
            for (slot, byte) in word.iter_mut().zip(chunk) {
                *slot = *byte;
            }
            *field = u32::from_ne_bytes(word);
        }
        let [
            magic,
            version,
            length,
            power_state,
            led_brightness,
            led_color,
            deep_sleep_timeout,
        ] = fields;
        Self {
            magic,
            version,
            length,
            power_state,
            led_brightness,
            led_color,
            deep_sleep_timeout,
        }
    }

    /// Decoded power state, `None` for codes outside the settings numbering.
    #[must_use]
    pub const fn power_state(&self) -> Option<PowerState> {
        PowerState::from_settings_code(self.power_state)
    }
}

/// Reads the settings header from `path`.
///
/// # Errors
///
/// Returns [`SettingsError::Read`] when the file cannot be read and
/// [`SettingsError::Empty`] when it holds no bytes.
pub fn read_settings(path: &Path) -> Result<PowerSettings, SettingsError> {
    let read_error = |source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    let mut bytes = Vec::with_capacity(SETTINGS_HEADER_LEN);
    file.take(u64::try_from(SETTINGS_HEADER_LEN).unwrap_or(u64::MAX))
        .read_to_end(&mut bytes)
        .map_err(read_error)?;
    if bytes.is_empty() {
        return Err(SettingsError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(PowerSettings::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[expect(clippy::host_endian_bytes, reason = "mirrors the native cache layout")]
    fn encode(fields: &[u32]) -> Vec<u8> {
        fields.iter().flat_map(|field| field.to_ne_bytes()).collect()
    }

    #[test]
    fn decodes_every_header_field() {
        let settings = PowerSettings::from_bytes(&encode(&[0xFEED, 2, 60, 1, 80, 3, 28_800]));
        assert_eq!(
            settings,
            PowerSettings {
                magic: 0xFEED,
                version: 2,
                length: 60,
                power_state: 1,
                led_brightness: 80,
                led_color: 3,
                deep_sleep_timeout: 28_800,
            }
        );
        assert_eq!(settings.power_state(), Some(PowerState::Standby));
    }

    #[test]
    fn short_files_are_zero_filled() {
        let settings = PowerSettings::from_bytes(&encode(&[1, 2, 3]));
        assert_eq!(settings.power_state, 0);
        assert_eq!(settings.power_state(), Some(PowerState::Off));
    }

    #[test]
    fn padding_is_ignored() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("uimgr_settings.bin");
        let mut bytes = encode(&[1, 1, 1, 2, 0, 0, 0]);
        bytes.extend([0xAA; 32]);
        fs::write(&path, bytes)?;

        let settings = read_settings(&path)?;
        assert_eq!(settings.power_state(), Some(PowerState::On));
        Ok(())
    }

    #[test]
    fn empty_files_are_errors() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("uimgr_settings.bin");
        fs::write(&path, [])?;
        assert!(matches!(
            read_settings(&path),
            Err(SettingsError::Empty { .. })
        ));
        Ok(())
    }

    #[test]
    fn missing_files_are_errors() {
        assert!(matches!(
            read_settings(Path::new("/nonexistent/uimgr_settings.bin")),
            Err(SettingsError::Read { .. })
        ));
    }
}
