//! Manufacturing fields exposed on the command line.

use strum::EnumIter;

/// Serialized-data type understood by the manufacturing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SerializedType {
    /// Manufacturer name.
    Manufacturer,
    /// Model name.
    ModelName,
    /// Primary disaster-recovery image version.
    PdriVersion,
    /// Manufacturing serial number.
    ManufacturingSerialNumber,
    /// Hardware id.
    HardwareId,
    /// Name of the image currently flashed.
    ImageName,
}

impl SerializedType {
    /// Wire code of the type.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Manufacturer => 0,
            Self::ModelName => 2,
            Self::PdriVersion => 13,
            Self::ManufacturingSerialNumber => 17,
            Self::HardwareId => 23,
            Self::ImageName => 26,
        }
    }

    /// Name used when reporting failures.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Manufacturer => "mfrSERIALIZED_TYPE_MANUFACTURER",
            Self::ModelName => "mfrSERIALIZED_TYPE_MODELNAME",
            Self::PdriVersion => "mfrSERIALIZED_TYPE_PDRIVERSION",
            Self::ManufacturingSerialNumber => "mfrSERIALIZED_TYPE_MANUFACTURING_SERIALNUMBER",
            Self::HardwareId => "mfrSERIALIZED_TYPE_HWID",
            Self::ImageName => "mfrSERIALIZED_TYPE_IMAGENAME",
        }
    }
}

/// Field selected by one `mfr_util` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MfrField {
    /// `--CurrentImageFilename`.
    CurrentImageFilename,
    /// `--FlashedFilename`.
    FlashedFilename,
    /// `--Modelname`.
    ModelName,
    /// `--HardwareId`.
    HardwareId,
    /// `--Manufacturer`.
    Manufacturer,
    /// `--MfgSerialnumber`.
    MfgSerialNumber,
    /// `--PDRIVersion`.
    PdriVersion,
}

impl MfrField {
    /// Type queried for the field.
    ///
    /// The running and flashed image names are the same record.
    #[must_use]
    pub const fn serialized_type(self) -> SerializedType {
        match self {
            Self::CurrentImageFilename | Self::FlashedFilename => SerializedType::ImageName,
            Self::ModelName => SerializedType::ModelName,
            Self::HardwareId => SerializedType::HardwareId,
            Self::Manufacturer => SerializedType::Manufacturer,
            Self::MfgSerialNumber => SerializedType::ManufacturingSerialNumber,
            Self::PdriVersion => SerializedType::PdriVersion,
        }
    }
}
