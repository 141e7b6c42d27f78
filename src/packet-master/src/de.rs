use std::io::Read;

use packet_master_bit_buf::{
    utils::{bit_mask, from_wire_bytes},
    BitReader,
};

use crate::{Error, PreparedUintOptions, Uint};

/// Unpacks values from a byte source.
///
/// Values must be read in the order they were written, each with
/// the exact options the [`Serializer`](crate::Serializer) used.
#[derive(Debug)]
pub struct Deserializer<R> {
    reader: BitReader<R>,
}

impl<R: Read> Deserializer<R> {
    /// Creates a deserializer over a given input source.
    pub const fn new(source: R) -> Self {
        Self {
            reader: BitReader::new(source),
        }
    }

    /// Gets a reference to the input source.
    #[inline]
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Gets a mutable reference to the input source.
    ///
    /// After a failed read, the source may be refilled through this
    /// and the read be issued again.
    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }

    /// Consumes the deserializer and returns the input source.
    #[inline]
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Deserializes a boolean from a single bit.
    pub fn deserialize_bool(&mut self) -> Result<bool, Error> {
        self.reader.read_bit().map_err(Into::into)
    }

    /// Deserializes an unsigned integer according to its encoding plan.
    ///
    /// Nothing is consumed unless the whole value is available, so a
    /// failed read can be issued again.
    pub fn deserialize_uint<T: Uint>(&mut self, options: PreparedUintOptions) -> Result<T, Error> {
        let prefix_bits = options.length_prefix_bits();
        let segments = self.reader.peek_bits(prefix_bits)? + 1;
        let bits = options.bits_for_segments(segments);

        if segments > options.segment_count() || bits > T::BITS {
            log::debug!("Rejecting {segments} segments ({bits} bits) for {}-bit value", T::BITS);
            return Err(Error::InvalidEncoding {
                bits,
                width: T::BITS,
            });
        }

        self.reader.prefetch(prefix_bits, bits)?;
        self.reader.read_bits(prefix_bits)?;

        let mut buf = [0; 4];
        self.reader.read_aligned(&mut buf, bits)?;

        let value = from_wire_bytes(buf) & bit_mask(0, bits);
        Ok(T::narrow(value))
    }

    /// Deserializes a [`u8`] according to its encoding plan.
    #[inline]
    pub fn deserialize_uint8(&mut self, options: PreparedUintOptions) -> Result<u8, Error> {
        self.deserialize_uint(options)
    }

    /// Deserializes a [`u16`] according to its encoding plan.
    #[inline]
    pub fn deserialize_uint16(&mut self, options: PreparedUintOptions) -> Result<u16, Error> {
        self.deserialize_uint(options)
    }

    /// Deserializes a [`u32`] according to its encoding plan.
    #[inline]
    pub fn deserialize_uint32(&mut self, options: PreparedUintOptions) -> Result<u32, Error> {
        self.deserialize_uint(options)
    }

    /// Forgets partially consumed bits so that a new stream can be
    /// read from the source.
    pub fn reset(&mut self) {
        self.reader.reset();
    }
}
