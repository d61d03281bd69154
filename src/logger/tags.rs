/// Log tags, one per subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Cache,
    Fetch,
    Charts,
    Overlay,
}

impl LogTag {
    pub const ALL: [LogTag; 6] = [
        LogTag::System,
        LogTag::Config,
        LogTag::Cache,
        LogTag::Fetch,
        LogTag::Charts,
        LogTag::Overlay,
    ];

    /// Key used by --debug-<key> / --verbose-<key> flags
    pub fn to_debug_key(&self) -> String {
        self.to_plain_string().to_lowercase()
    }

    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Cache => "CACHE",
            LogTag::Fetch => "FETCH",
            LogTag::Charts => "CHARTS",
            LogTag::Overlay => "OVERLAY",
        }
        .to_string()
    }
}
