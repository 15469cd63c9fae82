use std::collections::TryReserveError;

/// Errors raised while creating a buffer.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// The backing storage could not be allocated.
    #[error("failed to allocate {requested} byte buffer: {source}")]
    Allocation {
        requested: usize,
        source: TryReserveError,
    },
}

/// Errors raised by a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// A write started at or beyond the last writable index.
    #[error("no space left at offset {offset} (write limit {limit})")]
    OutOfSpace { offset: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, TransferError>;
