use bytes::Bytes;

/// Default device node name.
pub const DEFAULT_DEVICE_NAME: &str = "example_char_device";

/// Default status node name.
pub const DEFAULT_STATUS_NAME: &str = "example_proc";

/// Default status node permission bits (world read/write).
pub const DEFAULT_STATUS_MODE: u32 = 0o666;

/// Message returned by every status node read.
pub const DEFAULT_ADVISORY: &str = "This is the proc entry\n";

/// Names and fixed content used when a module registers with its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Device node name. Default: `example_char_device`.
    pub device_name: String,
    /// Status node name. Default: `example_proc`.
    pub status_name: String,
    /// Status node permission bits. Default: `0o666`.
    pub status_mode: u32,
    /// Advisory message served by status reads.
    pub advisory: Bytes,
}

impl ModuleConfig {
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    pub fn with_status_name(mut self, name: impl Into<String>) -> Self {
        self.status_name = name.into();
        self
    }

    pub fn with_status_mode(mut self, mode: u32) -> Self {
        self.status_mode = mode;
        self
    }

    pub fn with_advisory(mut self, advisory: impl Into<Bytes>) -> Self {
        self.advisory = advisory.into();
        self
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            status_name: DEFAULT_STATUS_NAME.to_string(),
            status_mode: DEFAULT_STATUS_MODE,
            advisory: Bytes::from_static(DEFAULT_ADVISORY.as_bytes()),
        }
    }
}
