use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use devchan_buffer::{read_at, write_at, BufferError, HeapBuffer, Transfer, TransferError, WritePolicy};
use tracing::info;

use crate::channel::Channel;

/// The status-node endpoint.
///
/// Writes land in a heap buffer allocated at module init. Reads never look at
/// that buffer: they serve a fixed advisory message under the same cursor
/// rules, with the message length standing in for the content length.
#[derive(Debug)]
pub struct StatusChannel {
    name: String,
    buffer: Mutex<HeapBuffer>,
    advisory: Bytes,
}

impl StatusChannel {
    /// Allocate the status buffer and bind the advisory message.
    pub fn new(name: impl Into<String>, advisory: impl Into<Bytes>) -> Result<Self, BufferError> {
        Ok(Self::with_buffer(name, advisory, HeapBuffer::try_heap()?))
    }

    /// Build around an already allocated buffer.
    pub fn with_buffer(
        name: impl Into<String>,
        advisory: impl Into<Bytes>,
        buffer: HeapBuffer,
    ) -> Self {
        Self {
            name: name.into(),
            buffer: Mutex::new(buffer),
            advisory: advisory.into(),
        }
    }

    pub fn advisory(&self) -> &Bytes {
        &self.advisory
    }

    /// Copy of what writes have stored so far.
    pub fn contents(&self) -> Bytes {
        Bytes::copy_from_slice(self.lock().content())
    }

    fn lock(&self) -> MutexGuard<'_, HeapBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Channel for StatusChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, dst: &mut [u8], offset: usize) -> Transfer {
        read_at(&self.advisory, dst, offset)
    }

    /// Never rejects: a write starting at or past the limit transfers nothing.
    fn write(&self, src: &[u8], offset: usize) -> Result<Transfer, TransferError> {
        let transfer = {
            let mut buffer = self.lock();
            write_at(&mut *buffer, src, offset, WritePolicy::TolerateAtLimit)?
        };
        info!(status = %self.name, offset, count = transfer.count, "status node updated");
        Ok(transfer)
    }
}
