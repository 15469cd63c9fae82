use std::fmt;

use crate::error::BufferError;

/// Fixed capacity of every channel buffer, in bytes.
pub const CAPACITY: usize = 1024;

/// First offset at which a write can no longer transfer any byte.
///
/// The last index is reserved for the terminator.
pub const WRITE_LIMIT: usize = CAPACITY - 1;

/// A fixed-capacity byte region with a tracked logical end.
///
/// `len` is always the index of the first null byte in the raw image, or
/// the capacity when there is none. [`FixedBuffer::content`] is therefore
/// exactly what a reader scanning for the first null byte would see.
///
/// Storage is either inline (`[u8; CAPACITY]`, the default) or heap-allocated
/// ([`HeapBuffer`]). Capacity never changes after creation.
#[derive(Clone)]
pub struct FixedBuffer<S = [u8; CAPACITY]> {
    storage: S,
    len: usize,
}

/// A [`FixedBuffer`] whose storage lives on the heap.
pub type HeapBuffer = FixedBuffer<Box<[u8]>>;

impl FixedBuffer {
    /// Create an empty, zero-filled inline buffer.
    pub const fn new() -> Self {
        Self {
            storage: [0; CAPACITY],
            len: 0,
        }
    }
}

impl Default for FixedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapBuffer {
    /// Allocate an empty, zero-filled heap buffer.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn try_heap() -> Result<Self, BufferError> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(CAPACITY)
            .map_err(|source| BufferError::Allocation {
                requested: CAPACITY,
                source,
            })?;
        storage.resize(CAPACITY, 0);
        Ok(Self {
            storage: storage.into_boxed_slice(),
            len: 0,
        })
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> FixedBuffer<S> {
    /// Physical capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().len()
    }

    /// Logical content length (the terminator position).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Meaningful content, up to but excluding the terminator.
    pub fn content(&self) -> &[u8] {
        &self.storage.as_ref()[..self.len]
    }

    /// The full physical image, terminator and trailing bytes included.
    pub fn raw(&self) -> &[u8] {
        self.storage.as_ref()
    }

    /// Copy `src` in at `offset`, write a terminator right after it and
    /// return the terminator index.
    ///
    /// Callers must keep `offset + src.len() < CAPACITY`.
    pub(crate) fn store(&mut self, offset: usize, src: &[u8]) -> usize {
        let end = offset + src.len();
        let storage = self.storage.as_mut();
        storage[offset..end].copy_from_slice(src);
        storage[end] = 0;

        // Past the first null the logical end does not move; bytes before
        // `offset` hold no null, so the first one is in `src` or at `end`.
        if offset <= self.len {
            self.len = offset + src.iter().position(|b| *b == 0).unwrap_or(src.len());
        }
        end
    }
}

impl<S: AsRef<[u8]>> fmt::Debug for FixedBuffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBuffer")
            .field("len", &self.len)
            .field("capacity", &self.storage.as_ref().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty_and_zeroed() {
        let buf = FixedBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), CAPACITY);
        assert!(buf.raw().iter().all(|b| *b == 0));
    }

    #[test]
    fn heap_buffer_has_full_capacity() {
        let buf = HeapBuffer::try_heap().expect("heap buffer should allocate");
        assert_eq!(buf.capacity(), CAPACITY);
        assert_eq!(buf.raw().len(), CAPACITY);
        assert!(buf.content().is_empty());
    }

    #[test]
    fn store_past_first_null_keeps_logical_end() {
        let mut buf = FixedBuffer::new();
        buf.store(0, b"hello");
        let end = buf.store(10, b"X");
        assert_eq!(end, 11);
        assert_eq!(buf.content(), b"hello");
        assert_eq!(&buf.raw()[..12], b"hello\0\0\0\0\0X\0");
    }

    #[test]
    fn embedded_null_ends_content() {
        let mut buf = FixedBuffer::new();
        let end = buf.store(0, b"a\0b");
        assert_eq!(end, 3);
        assert_eq!(buf.content(), b"a");
    }

    #[test]
    fn shorter_store_truncates_and_terminates() {
        let mut buf = FixedBuffer::new();
        buf.store(0, b"hello");
        buf.store(0, b"hi");
        assert_eq!(buf.content(), b"hi");
        assert_eq!(&buf.raw()[..5], b"hi\0lo");
    }

    #[test]
    fn content_always_matches_first_null_scan() {
        let mut buf = FixedBuffer::new();
        let writes: [(usize, &[u8]); 6] = [
            (0, &b"abcdef"[..]),
            (3, &b"xyz"[..]),
            (20, &b"far"[..]),
            (6, &b"gh\0ij"[..]),
            (2, &b""[..]),
            (0, &b"restart"[..]),
        ];
        for (offset, src) in writes {
            buf.store(offset, src);
            let first_null = buf.raw().iter().position(|b| *b == 0).unwrap();
            assert_eq!(buf.len(), first_null, "after store at {offset}");
        }
    }

    #[test]
    fn debug_omits_contents() {
        let buf = FixedBuffer::new();
        assert_eq!(format!("{buf:?}"), "FixedBuffer { len: 0, capacity: 1024 }");
    }
}
