use std::io::Write;

use crate::{
    utils::{bit_mask, ceil_div},
    ByteBuffer, Error,
};

// A byte in the output stream which still has unused high bits.
#[derive(Clone, Copy, Debug)]
struct PendingByte {
    // Absolute position of the byte in the output stream.
    stream_index: usize,

    // The next free bit; everything below it is committed.
    bit_start: u32,
}

impl PendingByte {
    #[inline]
    fn room(&self) -> u32 {
        u8::BITS - self.bit_start
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.bit_start >= u8::BITS
    }
}

/// A streaming writer which packs bits and byte-aligned payloads
/// into an output sink.
///
/// Individual bit writing starts at the LSB of the byte, working
/// towards the MSB.
///
/// At most one byte is partially written at any point in time. It
/// stays resident together with every byte appended after it,
/// while all bytes in front of it are flushed to the sink.
#[derive(Debug)]
pub struct BitWriter<W> {
    sink: W,

    // Bytes which have not been handed to the sink yet.
    buffer: ByteBuffer,

    // The byte currently accepting single bits, if any.
    pending: Option<PendingByte>,

    // Absolute stream position of the first byte in `buffer`.
    stream_origin: usize,
}

impl<W: Write> BitWriter<W> {
    /// Creates a [`BitWriter`] to a given output sink.
    pub const fn new(sink: W) -> Self {
        Self::with_buffer(sink, ByteBuffer::new())
    }

    /// Creates a [`BitWriter`] that stages its bytes in `buffer`.
    ///
    /// This is useful to apply capacity limits or to reuse existing
    /// buffer allocations.
    pub const fn with_buffer(sink: W, buffer: ByteBuffer) -> Self {
        Self {
            sink,
            buffer,
            pending: None,
            stream_origin: 0,
        }
    }

    /// Gets a reference to the output sink.
    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Gets a mutable reference to the output sink.
    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Consumes the [`BitWriter`] and returns the output sink.
    ///
    /// Bytes that were not flushed yet are discarded.
    #[inline]
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Gets the number of bytes that are not flushed to the sink yet.
    #[inline]
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Gets the number of bytes started in the output stream so far,
    /// including a partially written one.
    #[inline]
    pub fn stream_position(&self) -> usize {
        self.stream_origin + self.buffer.len()
    }

    /// Whether a partially written byte is currently open.
    #[inline]
    pub fn has_pending_byte(&self) -> bool {
        self.pending.is_some()
    }

    // Gets the open pending byte or starts a fresh zeroed one at the
    // end of the stream.
    fn pending_or_open(&mut self) -> Result<PendingByte, Error> {
        if let Some(pending) = self.pending {
            return Ok(pending);
        }

        let index = self.buffer.append_zero_byte()?;
        let pending = PendingByte {
            stream_index: self.stream_origin + index,
            bit_start: 0,
        };
        self.pending = Some(pending);

        Ok(pending)
    }

    // Stores back an updated pending byte, releasing it once full.
    fn settle(&mut self, pending: PendingByte) -> Result<(), Error> {
        if pending.is_full() {
            self.pending = None;
            self.flush()
        } else {
            self.pending = Some(pending);
            Ok(())
        }
    }

    fn or_into(&mut self, pending: PendingByte, bits: u8) -> Result<(), Error> {
        let index = pending
            .stream_index
            .checked_sub(self.stream_origin)
            .ok_or(Error::MemoryOperationFailed)?;
        let byte = self
            .buffer
            .get_mut(index)
            .ok_or(Error::MemoryOperationFailed)?;

        *byte |= bits;
        Ok(())
    }

    /// Writes a single bit.
    pub fn push_bit(&mut self, bit: bool) -> Result<(), Error> {
        let mut pending = self.pending_or_open()?;

        self.or_into(pending, (bit as u8) << pending.bit_start)?;
        pending.bit_start += 1;

        self.settle(pending)
    }

    /// Writes the low `count` bits of `value`, least significant
    /// bit first.
    ///
    /// Bits spill into freshly opened bytes whenever the pending
    /// byte fills up.
    pub fn push_bits(&mut self, mut value: u32, mut count: u32) -> Result<(), Error> {
        debug_assert!(count <= u32::BITS);

        while count > 0 {
            let mut pending = self.pending_or_open()?;

            let nbits = pending.room().min(count);
            let bits = (value & bit_mask(0, nbits)) as u8;
            self.or_into(pending, bits << pending.bit_start)?;

            pending.bit_start += nbits;
            value = value.checked_shr(nbits).unwrap_or(0);
            count -= nbits;

            self.settle(pending)?;
        }

        Ok(())
    }

    /// Appends the first `nbits` bits of `bytes` as whole bytes,
    /// starting at the next byte boundary.
    ///
    /// When `nbits` does not fill the last byte, that byte becomes
    /// the new pending byte. A still open pending byte is closed in
    /// that case, with its free bits left zeroed.
    pub fn write_aligned(&mut self, bytes: &[u8], nbits: u32) -> Result<(), Error> {
        let nbytes = ceil_div(nbits, u8::BITS) as usize;
        let payload = bytes.get(..nbytes).ok_or(Error::MemoryOperationFailed)?;

        let first = self.buffer.append(payload)?;

        let tail = nbits % u8::BITS;
        if tail != 0 {
            let last = first + nbytes - 1;

            // Unused high bits must stay zero for later writes.
            let byte = self
                .buffer
                .get_mut(last)
                .ok_or(Error::MemoryOperationFailed)?;
            *byte &= bit_mask(0, tail) as u8;

            let stream_index = self.stream_origin + last;
            log::trace!("Opening pending byte at {stream_index} with {tail} bits used");

            self.pending = Some(PendingByte {
                stream_index,
                bit_start: tail,
            });
        }

        self.flush()
    }

    // Writes the first `count` buffered bytes to the sink.
    fn commit(&mut self, count: usize) -> Result<(), Error> {
        if count == 0 {
            return Ok(());
        }

        let committed = self
            .buffer
            .as_slice()
            .get(..count)
            .ok_or(Error::MemoryOperationFailed)?;
        self.sink.write_all(committed).map_err(Error::WriteFailed)?;

        self.buffer.drop_front(count)?;
        self.stream_origin += count;

        log::trace!("Flushed {count} bytes, stream now at {}", self.stream_origin);
        Ok(())
    }

    /// Hands every byte before the pending byte to the output sink.
    ///
    /// Without a pending byte the whole buffer is flushed.
    pub fn flush(&mut self) -> Result<(), Error> {
        let count = match self.pending {
            Some(pending) => pending
                .stream_index
                .checked_sub(self.stream_origin)
                .ok_or(Error::MemoryOperationFailed)?,
            None => self.buffer.len(),
        };

        self.commit(count)
    }

    /// Flushes all remaining bytes to the output sink, including a
    /// partially written one with its free bits zero-padded.
    ///
    /// On success, the writer is ready to start a new stream. On
    /// failure, nothing is lost and later bits still fill the
    /// pending byte.
    pub fn finalize(&mut self) -> Result<(), Error> {
        self.commit(self.buffer.len())?;
        self.pending = None;
        self.stream_origin = 0;

        Ok(())
    }

    /// Discards all unflushed state, keeping the buffer allocation.
    pub fn reset(&mut self) {
        self.pending = None;
        self.buffer.clear();
        self.stream_origin = 0;
    }
}
