use bytes::{Bytes, BytesMut};
use devchan_buffer::{Transfer, TransferError};

const READ_CHUNK_SIZE: usize = 256;

/// A named endpoint that moves bytes against a caller-owned cursor.
///
/// Implementations keep no per-caller state. The cursor comes in as
/// `offset` and goes back out in the returned [`Transfer`].
pub trait Channel {
    /// Node name the channel is registered under.
    fn name(&self) -> &str;

    /// Copy bytes at `offset` into `dst`. A zero-byte transfer means end-of-data.
    fn read(&self, dst: &mut [u8], offset: usize) -> Transfer;

    /// Copy `src` into the channel at `offset`.
    fn write(&self, src: &[u8], offset: usize) -> Result<Transfer, TransferError>;
}

/// Read from `offset` until end-of-data, looping over short reads.
///
/// Returns the collected bytes and the final cursor.
pub fn read_to_end<C: Channel + ?Sized>(channel: &C, offset: usize) -> (Bytes, usize) {
    let mut out = BytesMut::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut cursor = offset;
    loop {
        let transfer = channel.read(&mut chunk, cursor);
        if transfer.is_end() {
            return (out.freeze(), cursor);
        }
        out.extend_from_slice(&chunk[..transfer.count]);
        cursor = transfer.offset;
    }
}
