use relay_data_model::ids::profile_id;

/// What the command dispatcher answers when nothing handles a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledCommandPolicy {
    /// Answer `Success`: the command is accepted structurally.
    #[default]
    Permissive,
    /// Answer `UnsupClusterCommand` unless a handler exists and, when the
    /// cluster declares its accepted commands, the command is among them.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalConfig {
    pub unhandled_commands: UnhandledCommandPolicy,
    /// Profile used for outbound commands and reports.
    pub profile_id: u16,
    /// Manufacturer code stamped on every registered cluster (0 = standard).
    pub manufacturer_code: u16,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            unhandled_commands: UnhandledCommandPolicy::default(),
            profile_id: profile_id::HOME_AUTOMATION,
            manufacturer_code: 0,
        }
    }
}

impl HalConfig {
    pub fn strict() -> Self {
        Self {
            unhandled_commands: UnhandledCommandPolicy::Strict,
            ..Default::default()
        }
    }
}
