use crate::traits::HostOp;

/// Errors reported by the host runtime during registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A node with this name is already registered.
    #[error("node name already in use: {0}")]
    NameInUse(String),

    /// The dynamic device-number range is exhausted.
    #[error("no free device numbers")]
    NoDeviceNumbers,

    /// The host refused the operation.
    #[error("host rejected {0}")]
    Rejected(HostOp),
}

pub type Result<T> = std::result::Result<T, HostError>;
