//! # Broadcaster configuration

/// Id of the reserved channel used by [Config::default]
pub const DEFAULT_CHANNEL: &str = "default";

/// Settings for a [Broadcaster](crate::Broadcaster)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Reserved channel that always exists after construction
    ///
    /// It receives everything sent with
    /// [send_with_default](crate::Broadcaster::send_with_default)
    /// and is skipped by
    /// [publish_except_default](crate::Broadcaster::publish_except_default)
    pub default_channel: String,
}

impl Config {
    /// Sets the reserved default channel id
    pub fn with_default_channel(mut self, id: impl Into<String>) -> Self {
        self.default_channel = id.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_channel: DEFAULT_CHANNEL.to_owned(),
        }
    }
}
