use devchan_buffer::BufferError;
use devchan_host::HostError;

/// Errors that abort module initialization.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The host refused to register a node.
    #[error("failed to register {node}: {source}")]
    Registration { node: String, source: HostError },

    /// The status buffer could not be allocated.
    #[error("status buffer allocation failed: {0}")]
    Allocation(#[from] BufferError),
}

pub type Result<T> = std::result::Result<T, ModuleError>;
