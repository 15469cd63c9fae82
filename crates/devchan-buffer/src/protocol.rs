use tracing::trace;

use crate::buffer::{FixedBuffer, CAPACITY, WRITE_LIMIT};
use crate::error::{Result, TransferError};

/// Outcome of one read or write call.
///
/// `offset` is the caller's cursor after the transfer. The channel never
/// keeps it; callers feed it back into their next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Bytes actually moved. May be less than requested.
    pub count: usize,
    /// Updated cursor.
    pub offset: usize,
}

impl Transfer {
    /// A zero-byte transfer that leaves the cursor where it was.
    pub fn end(offset: usize) -> Self {
        Self { count: 0, offset }
    }

    /// True when nothing was transferred (end-of-data on reads).
    pub fn is_end(&self) -> bool {
        self.count == 0
    }
}

/// How a write treats a starting offset at or past [`WRITE_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Fail with [`TransferError::OutOfSpace`]; nothing is touched.
    RejectAtLimit,
    /// Transfer nothing and report a zero-byte write. At exactly the limit the
    /// terminator is still sealed at `offset`.
    TolerateAtLimit,
}

/// Read mode: copy from `content` at `offset` into `dst`.
///
/// Stops at the end of `content`, at [`CAPACITY`], or when `dst` is full,
/// whichever comes first. An offset at or past the end yields a zero-byte
/// transfer.
pub fn read_at(content: &[u8], dst: &mut [u8], offset: usize) -> Transfer {
    let end = content.len().min(CAPACITY);
    if offset >= end {
        return Transfer::end(offset);
    }

    let count = dst.len().min(end - offset);
    dst[..count].copy_from_slice(&content[offset..offset + count]);
    Transfer {
        count,
        offset: offset + count,
    }
}

/// Write mode: copy `src` into `buffer` at `offset`, then seal the terminator.
///
/// At most `WRITE_LIMIT - offset` bytes are taken, so the terminator index is
/// never past `CAPACITY - 1`. The terminator lands on the post-write offset.
/// The logical end becomes the first null byte: a write that starts past it
/// leaves it in place, and a null inside `src` ends the content there.
pub fn write_at<S>(
    buffer: &mut FixedBuffer<S>,
    src: &[u8],
    offset: usize,
    policy: WritePolicy,
) -> Result<Transfer>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    if offset >= WRITE_LIMIT {
        return match policy {
            WritePolicy::RejectAtLimit => Err(TransferError::OutOfSpace {
                offset,
                limit: WRITE_LIMIT,
            }),
            WritePolicy::TolerateAtLimit => {
                if offset < CAPACITY {
                    buffer.store(offset, &[]);
                }
                Ok(Transfer::end(offset))
            }
        };
    }

    let count = src.len().min(WRITE_LIMIT - offset);
    let end = buffer.store(offset, &src[..count]);
    trace!(offset, count, end, len = buffer.len(), "sealed write");

    Ok(Transfer { count, offset: end })
}
