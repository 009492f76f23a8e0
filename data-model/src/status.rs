/// Status codes carried in ZCL default responses.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Default)]
#[repr(u8)]
pub enum ZclStatus {
    #[default]
    Success = 0x00,
    Failure = 0x01,
    UnsupClusterCommand = 0x81,
    UnsupGeneralCommand = 0x82,
    UnsupportedAttribute = 0x86,
    InvalidValue = 0x87,
    ReadOnly = 0x88,
    InsufficientSpace = 0x89,
    InvalidDataType = 0x8d,
}

impl ZclStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => ZclStatus::Success,
            0x01 => ZclStatus::Failure,
            0x81 => ZclStatus::UnsupClusterCommand,
            0x82 => ZclStatus::UnsupGeneralCommand,
            0x86 => ZclStatus::UnsupportedAttribute,
            0x87 => ZclStatus::InvalidValue,
            0x88 => ZclStatus::ReadOnly,
            0x89 => ZclStatus::InsufficientSpace,
            0x8d => ZclStatus::InvalidDataType,
            _ => return None,
        })
    }

    pub fn is_success(self) -> bool {
        self == ZclStatus::Success
    }
}
