//! Protocol-assigned identifiers used by the relay firmware.

/// Profile identifiers
pub mod profile_id {
    /// Home Automation profile
    pub const HOME_AUTOMATION: u16 = 0x0104;
}

/// Cluster identifiers
pub mod cluster_id {
    pub const BASIC: u16 = 0x0000;
    pub const POWER_CONFIG: u16 = 0x0001;
    pub const IDENTIFY: u16 = 0x0003;
    pub const GROUPS: u16 = 0x0004;
    pub const ON_OFF: u16 = 0x0006;
    pub const ON_OFF_SWITCH_CONFIG: u16 = 0x0007;
    pub const LEVEL_CONTROL: u16 = 0x0008;
    pub const MULTISTATE_INPUT: u16 = 0x0012;
    /// Firmware upgrade. Never registered generically, see the OTA collaborator.
    pub const OTA: u16 = 0x0019;
}

/// Device type identifiers (Home Automation profile)
pub mod device_id {
    pub const ON_OFF_SWITCH: u16 = 0x0000;
    pub const ON_OFF_OUTPUT: u16 = 0x0002;
}

/// On/Off cluster attributes and commands
pub mod on_off {
    pub const ATTR_ON_OFF: u16 = 0x0000;

    pub const CMD_OFF: u8 = 0x00;
    pub const CMD_ON: u8 = 0x01;
    pub const CMD_TOGGLE: u8 = 0x02;
}

/// Basic cluster attributes
pub mod basic {
    pub const ATTR_ZCL_VERSION: u16 = 0x0000;
    pub const ATTR_APPLICATION_VERSION: u16 = 0x0001;
    pub const ATTR_MANUFACTURER_NAME: u16 = 0x0004;
    pub const ATTR_MODEL_IDENTIFIER: u16 = 0x0005;
    pub const ATTR_POWER_SOURCE: u16 = 0x0007;
}

/// On/Off switch configuration cluster attributes
pub mod on_off_switch_config {
    pub const ATTR_SWITCH_TYPE: u16 = 0x0000;
    pub const ATTR_SWITCH_ACTIONS: u16 = 0x0010;
}

/// Multistate input cluster attributes
pub mod multistate_input {
    pub const ATTR_NUMBER_OF_STATES: u16 = 0x004a;
    pub const ATTR_PRESENT_VALUE: u16 = 0x0055;
}

/// ZCL global (profile-wide) command identifiers
pub mod global_cmd {
    pub const READ_ATTRIBUTES: u8 = 0x00;
    pub const WRITE_ATTRIBUTES: u8 = 0x02;
    pub const WRITE_ATTRIBUTES_NO_RESPONSE: u8 = 0x05;
    pub const REPORT_ATTRIBUTES: u8 = 0x0a;
}
