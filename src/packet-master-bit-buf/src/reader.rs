use std::{
    collections::VecDeque,
    io::{self, Read},
};

use crate::{
    utils::{bit_mask, ceil_div},
    Error,
};

// A byte taken from the source whose high bits are not consumed yet.
#[derive(Clone, Copy, Debug)]
struct PendingByte {
    value: u8,

    // The next unread bit.
    bit_start: u32,
}

impl PendingByte {
    #[inline]
    fn remaining(&self) -> u32 {
        u8::BITS - self.bit_start
    }
}

/// A streaming reader which unpacks bits and byte-aligned payloads
/// from an input source.
///
/// Individual bit reading starts at the LSB of the byte, working
/// towards the MSB. Reads must mirror the writes that produced the
/// stream exactly, see [`BitWriter`](crate::BitWriter).
///
/// Every read either completes or leaves the reader untouched. Bytes
/// pulled from the source by a failed read are held back and served
/// to the next one, so a read may be reissued once the source has
/// more data.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,

    // The partially consumed byte, if any.
    pending: Option<PendingByte>,

    // Bytes pulled from the source that no read has consumed yet.
    lookahead: VecDeque<u8>,

    // Number of bytes consumed from the stream so far.
    position: usize,
}

impl<R: Read> BitReader<R> {
    /// Creates a new [`BitReader`] over a given input source.
    pub const fn new(source: R) -> Self {
        Self {
            source,
            pending: None,
            lookahead: VecDeque::new(),
            position: 0,
        }
    }

    /// Gets a reference to the input source.
    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Gets a mutable reference to the input source.
    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Consumes the [`BitReader`] and returns the input source.
    ///
    /// Bytes held back after a failed read are lost.
    #[inline]
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Gets the number of bytes consumed from the stream so far.
    #[inline]
    pub fn stream_position(&self) -> usize {
        self.position
    }

    /// Gets the number of bits left in the pending byte.
    #[inline]
    pub fn buffered_bits(&self) -> u32 {
        self.pending.map_or(0, |p| p.remaining())
    }

    // Pulls from the source until `nbytes` unconsumed bytes are held.
    fn require(&mut self, nbytes: usize) -> Result<(), Error> {
        let mut chunk = [0; 16];
        while self.lookahead.len() < nbytes {
            let wanted = (nbytes - self.lookahead.len()).min(chunk.len());
            match self.source.read(&mut chunk[..wanted]) {
                Ok(0) => {
                    return Err(Error::ReadFailed(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "source exhausted",
                    )));
                }
                Ok(n) => self.lookahead.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::ReadFailed(e)),
            }
        }

        Ok(())
    }

    #[inline]
    fn fresh_bytes_for(&self, count: u32) -> usize {
        ceil_div(count.saturating_sub(self.buffered_bits()), u8::BITS) as usize
    }

    // Computes the next `count` bits from held bytes without consuming
    // them. Returns the value, the pending byte afterwards and how many
    // held bytes the bits span.
    fn extract(&self, count: u32) -> Result<(u32, Option<PendingByte>, usize), Error> {
        let mut pending = self.pending;
        let mut fresh = self.lookahead.iter();
        let mut taken = 0;

        let mut value = 0;
        let mut offset = 0;
        while offset < count {
            let mut current = match pending.take() {
                Some(p) => p,
                None => {
                    let byte = *fresh.next().ok_or(Error::MemoryOperationFailed)?;
                    taken += 1;
                    PendingByte {
                        value: byte,
                        bit_start: 0,
                    }
                }
            };

            let nbits = current.remaining().min(count - offset);
            let bits = (current.value as u32 >> current.bit_start) & bit_mask(0, nbits);
            value |= bits << offset;

            current.bit_start += nbits;
            offset += nbits;
            pending = (current.remaining() > 0).then_some(current);
        }

        Ok((value, pending, taken))
    }

    /// Makes sure `bits` bits followed by a byte-aligned payload of
    /// `aligned_bits` bits can be read without touching the source.
    ///
    /// On success, the matching [`BitReader::read_bits`] and
    /// [`BitReader::read_aligned`] calls cannot fail on input.
    pub fn prefetch(&mut self, bits: u32, aligned_bits: u32) -> Result<(), Error> {
        let nbytes = self.fresh_bytes_for(bits) + ceil_div(aligned_bits, u8::BITS) as usize;
        self.require(nbytes)
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> Result<bool, Error> {
        self.read_bits(1).map(|bit| bit != 0)
    }

    /// Gets the next `count` bits, least significant bit first,
    /// without consuming them.
    pub fn peek_bits(&mut self, count: u32) -> Result<u32, Error> {
        debug_assert!(count <= u32::BITS);

        self.require(self.fresh_bytes_for(count))?;
        self.extract(count).map(|(value, ..)| value)
    }

    /// Reads `count` bits, least significant bit first.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, Error> {
        debug_assert!(count <= u32::BITS);

        self.require(self.fresh_bytes_for(count))?;
        let (value, pending, taken) = self.extract(count)?;

        self.lookahead.drain(..taken);
        self.pending = pending;
        self.position += taken;

        Ok(value)
    }

    /// Reads the first `nbits` bits of a byte-aligned payload into
    /// `buf`, starting at the next untouched byte of the source.
    ///
    /// When `nbits` does not fill the last byte, its remaining bits
    /// become the new pending byte and are masked out of `buf`.
    pub fn read_aligned(&mut self, buf: &mut [u8], nbits: u32) -> Result<(), Error> {
        let nbytes = ceil_div(nbits, u8::BITS) as usize;
        let payload = buf.get_mut(..nbytes).ok_or(Error::MemoryOperationFailed)?;

        self.require(nbytes)?;
        for (dst, src) in payload.iter_mut().zip(self.lookahead.drain(..nbytes)) {
            *dst = src;
        }
        self.position += nbytes;

        let tail = nbits % u8::BITS;
        if tail != 0 {
            let last = payload.last_mut().ok_or(Error::MemoryOperationFailed)?;
            log::trace!("Keeping {} bits of byte {} pending", u8::BITS - tail, self.position - 1);

            self.pending = Some(PendingByte {
                value: *last,
                bit_start: tail,
            });
            *last &= bit_mask(0, tail) as u8;
        }

        Ok(())
    }

    /// Drops the pending byte so that a new stream can be read.
    ///
    /// Bytes held back after a failed read stay queued, they belong
    /// to the source.
    pub fn reset(&mut self) {
        self.pending = None;
        self.position = 0;
    }
}
