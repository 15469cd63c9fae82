//! Fixed-capacity byte buffer and the bounded transfer protocol.
//!
//! This is the lowest layer of devchan. Every channel moves bytes between a
//! caller-owned region and a [`FixedBuffer`] with the same rules:
//! - reads stop at the logical end of content or at capacity
//! - writes stop one byte short of capacity and always re-seal the terminator
//! - the caller owns the offset cursor; every call returns the updated one
//!
//! Short transfers are normal. End-of-data is a zero-byte [`Transfer`], not an error.

pub mod buffer;
pub mod error;
pub mod protocol;

pub use buffer::{FixedBuffer, HeapBuffer, CAPACITY, WRITE_LIMIT};
pub use error::{BufferError, Result, TransferError};
pub use protocol::{read_at, write_at, Transfer, WritePolicy};
