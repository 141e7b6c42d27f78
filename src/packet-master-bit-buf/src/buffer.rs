use std::cmp;

use crate::Error;

// Capacity is at least doubled on every growth, amortizing the
// cost of appends over a long stream.
const GROWTH_FACTOR: usize = 2;

/// A growable staging buffer for bytes which are not yet handed
/// to the output sink.
///
/// New bytes always enter the buffer fully initialized, so later
/// bit writes can safely be OR'd into them.
#[derive(Debug)]
pub struct ByteBuffer {
    inner: Vec<u8>,

    // The largest capacity the buffer may ever grow to.
    limit: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteBuffer {
    /// Creates an empty [`ByteBuffer`] without a capacity limit.
    pub const fn new() -> Self {
        Self {
            inner: Vec::new(),
            limit: usize::MAX,
        }
    }

    /// Creates a [`ByteBuffer`] which preallocates `capacity` bytes
    /// and refuses to grow beyond `limit` bytes.
    pub fn with_limit(capacity: usize, limit: usize) -> Result<Self, Error> {
        let mut this = Self {
            inner: Vec::new(),
            limit,
        };
        this.reserve(capacity)?;

        Ok(this)
    }

    /// Gets the number of bytes currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Gets the number of bytes the buffer can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Gets a view of the stored bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Gets mutable access to the byte at `index`, if stored.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut u8> {
        self.inner.get_mut(index)
    }

    /// Makes room for at least `additional` more bytes.
    fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        let len = self.inner.len();
        let required = len
            .checked_add(additional)
            .ok_or(Error::AllocationFailed {
                requested: usize::MAX,
            })?;

        if required <= self.inner.capacity() {
            return Ok(());
        }
        if required > self.limit {
            return Err(Error::AllocationFailed {
                requested: required,
            });
        }

        let grown = self.inner.capacity().saturating_mul(GROWTH_FACTOR);
        let target = cmp::min(cmp::max(grown, required), self.limit);

        self.inner
            .try_reserve_exact(target - len)
            .map_err(|_| Error::AllocationFailed { requested: target })
    }

    /// Copies `bytes` to the end of the buffer and returns the
    /// index of the first copied byte.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        self.reserve(bytes.len())?;

        let start = self.inner.len();
        self.inner.extend_from_slice(bytes);

        Ok(start)
    }

    /// Appends a single zeroed byte and returns its index.
    pub fn append_zero_byte(&mut self) -> Result<usize, Error> {
        self.append(&[0])
    }

    /// Removes the first `count` bytes, moving the remainder to the
    /// front of the buffer.
    pub fn drop_front(&mut self, count: usize) -> Result<(), Error> {
        if count > self.inner.len() {
            return Err(Error::MemoryOperationFailed);
        }

        self.inner.drain(..count);
        Ok(())
    }

    /// Removes all bytes while keeping the allocated capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
