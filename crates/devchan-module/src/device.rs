use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use devchan_buffer::{read_at, write_at, FixedBuffer, Transfer, TransferError, WritePolicy};
use tracing::{debug, info};

use crate::channel::Channel;
use crate::counters::{CallCounters, CallKind, CounterSnapshot};

/// The character-device endpoint.
///
/// Owns an inline [`FixedBuffer`] for its whole lifetime. Each transfer holds
/// the buffer lock from start to finish, so concurrent callers are
/// serialized per call rather than interleaved byte by byte.
#[derive(Debug)]
pub struct DeviceChannel {
    name: String,
    buffer: Mutex<FixedBuffer>,
    counters: CallCounters,
}

impl DeviceChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: Mutex::new(FixedBuffer::new()),
            counters: CallCounters::default(),
        }
    }

    /// Count an open. Never fails and never touches the buffer.
    pub fn open(&self) {
        let opens = self.counters.record(CallKind::Open);
        info!(device = %self.name, opens, "device opened");
    }

    /// Count a close. Never fails and never touches the buffer.
    pub fn close(&self) {
        let closes = self.counters.record(CallKind::Close);
        info!(device = %self.name, closes, "device closed");
    }

    /// Copy of the current logical content.
    pub fn contents(&self) -> Bytes {
        Bytes::copy_from_slice(self.lock().content())
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, FixedBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Channel for DeviceChannel {
    fn name(&self) -> &str {
        &self.name
    }

    /// Reads that start at end-of-data return immediately and are not counted.
    fn read(&self, dst: &mut [u8], offset: usize) -> Transfer {
        let transfer = {
            let buffer = self.lock();
            if offset >= buffer.len() {
                return Transfer::end(offset);
            }
            read_at(buffer.content(), dst, offset)
        };

        let reads = self.counters.record(CallKind::Read);
        debug!(
            device = %self.name,
            offset,
            count = transfer.count,
            reads,
            "device read"
        );
        transfer
    }

    /// Fails with [`TransferError::OutOfSpace`] when `offset` is at or past
    /// the write limit. Rejected writes are not counted.
    fn write(&self, src: &[u8], offset: usize) -> Result<Transfer, TransferError> {
        let transfer = {
            let mut buffer = self.lock();
            write_at(&mut *buffer, src, offset, WritePolicy::RejectAtLimit)?
        };

        let writes = self.counters.record(CallKind::Write);
        debug!(
            device = %self.name,
            offset,
            count = transfer.count,
            writes,
            "device write"
        );
        Ok(transfer)
    }
}
