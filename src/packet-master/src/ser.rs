use std::io::Write;

use packet_master_bit_buf::{
    utils::{to_wire_bytes, used_bit_width},
    BitWriter, ByteBuffer,
};

use crate::{Error, PreparedUintOptions, Uint};

/// Serializer configuration which influences memory usage.
#[derive(Clone, Copy, Debug)]
pub struct SerializerOptions {
    /// Number of bytes to preallocate for the staging buffer.
    pub initial_capacity: usize,
    /// The largest size in bytes the staging buffer may grow to.
    ///
    /// Exceeding it fails with [`Error::AllocationFailed`].
    pub capacity_limit: usize,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            capacity_limit: usize::MAX,
        }
    }
}

/// The lifecycle stage of a [`Serializer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing was written since creation or the last reset.
    Empty,
    /// Values are being written to the current stream.
    Accumulating,
    /// The stream was completely flushed to the sink.
    Finalized,
}

/// Packs values into a byte sink.
///
/// Fully packed bytes are written to the sink as soon as possible,
/// so only a partially written byte and the data following it are
/// kept in memory. [`Serializer::finalize`] must be called once all
/// values are written.
#[derive(Debug)]
pub struct Serializer<W> {
    writer: BitWriter<W>,
    state: State,
}

impl<W: Write> Serializer<W> {
    /// Creates a serializer to a given output sink.
    pub const fn new(sink: W) -> Self {
        Self {
            writer: BitWriter::new(sink),
            state: State::Empty,
        }
    }

    /// Creates a serializer to a given output sink with custom
    /// [`SerializerOptions`].
    pub fn with_options(sink: W, options: SerializerOptions) -> Result<Self, Error> {
        log::debug!("Creating serializer with {options:?}");

        let buffer = ByteBuffer::with_limit(options.initial_capacity, options.capacity_limit)?;
        Ok(Self {
            writer: BitWriter::with_buffer(sink, buffer),
            state: State::Empty,
        })
    }

    /// Gets the current [`State`] of the serializer.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Gets a reference to the output sink.
    #[inline]
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Gets a mutable reference to the output sink.
    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        self.writer.get_mut()
    }

    /// Consumes the serializer and returns the output sink.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Gets the number of bytes held back from the sink.
    #[inline]
    pub fn buffered_bytes(&self) -> usize {
        self.writer.buffered_bytes()
    }

    #[inline]
    fn begin(&mut self) {
        self.state = State::Accumulating;
    }

    /// Serializes a boolean as a single bit.
    pub fn serialize_bool(&mut self, value: bool) -> Result<(), Error> {
        self.begin();
        self.writer.push_bit(value).map_err(Into::into)
    }

    /// Serializes an unsigned integer according to its encoding plan.
    ///
    /// `value` must not need more than `options.max_bits()` bits. This
    /// is only checked in debug builds.
    pub fn serialize_uint<T: Uint>(
        &mut self,
        value: T,
        options: PreparedUintOptions,
    ) -> Result<(), Error> {
        let value = value.widen();

        // Zero still occupies one bit, and therefore one segment.
        let used_bits = used_bit_width(value).max(1);
        debug_assert!(
            used_bits <= options.max_bits(),
            "{value} does not fit into {} bits",
            options.max_bits()
        );

        let (segments, bits) = options.segments_for(used_bits);

        self.begin();
        self.writer.push_bits(segments.saturating_sub(1), options.length_prefix_bits())?;
        self.writer.write_aligned(&to_wire_bytes(value), bits)?;

        Ok(())
    }

    /// Serializes a [`u8`] according to its encoding plan.
    #[inline]
    pub fn serialize_uint8(&mut self, value: u8, options: PreparedUintOptions) -> Result<(), Error> {
        self.serialize_uint(value, options)
    }

    /// Serializes a [`u16`] according to its encoding plan.
    #[inline]
    pub fn serialize_uint16(
        &mut self,
        value: u16,
        options: PreparedUintOptions,
    ) -> Result<(), Error> {
        self.serialize_uint(value, options)
    }

    /// Serializes a [`u32`] according to its encoding plan.
    #[inline]
    pub fn serialize_uint32(
        &mut self,
        value: u32,
        options: PreparedUintOptions,
    ) -> Result<(), Error> {
        self.serialize_uint(value, options)
    }

    /// Flushes all remaining data, zero-padding the last byte.
    ///
    /// After success, the serializer may be used for a new stream.
    /// On failure the unflushed bytes are kept so that the call can
    /// be retried.
    pub fn finalize(&mut self) -> Result<(), Error> {
        self.writer.finalize()?;
        self.state = State::Finalized;

        log::debug!("Finalized serializer stream");
        Ok(())
    }

    /// Discards any unflushed data and returns to [`State::Empty`]
    /// without releasing the staging buffer.
    pub fn reset(&mut self) {
        self.writer.reset();
        self.state = State::Empty;

        log::debug!("Reset serializer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{uint16_default, uint8_default, uint8_max_bits};

    #[test]
    fn state_transitions() -> Result<(), Error> {
        let mut ser = Serializer::new(Vec::<u8>::new());
        assert_eq!(ser.state(), State::Empty);

        ser.serialize_bool(true)?;
        assert_eq!(ser.state(), State::Accumulating);

        ser.finalize()?;
        assert_eq!(ser.state(), State::Finalized);

        ser.serialize_uint8(1, uint8_default())?;
        assert_eq!(ser.state(), State::Accumulating);

        ser.reset();
        assert_eq!(ser.state(), State::Empty);

        Ok(())
    }

    #[test]
    fn only_pending_byte_stays_buffered() -> Result<(), Error> {
        let mut ser = Serializer::new(Vec::<u8>::new());

        ser.serialize_uint8(3, uint8_max_bits(4))?;
        assert_eq!(ser.buffered_bytes(), 1);
        assert!(ser.get_ref().is_empty());

        // Payload bytes queue up behind the open pending byte.
        ser.serialize_bool(true)?;
        ser.serialize_uint16(300, uint16_default())?;
        assert_eq!(ser.buffered_bytes(), 3);

        ser.serialize_bool(false)?;
        ser.serialize_bool(false)?;
        assert_eq!(ser.buffered_bytes(), 0);
        assert_eq!(ser.get_ref().as_slice(), &[0b0011_0011, 0x2C, 0x01]);

        Ok(())
    }

    #[test]
    fn capacity_limit_fails_allocation() -> Result<(), Error> {
        let options = SerializerOptions {
            initial_capacity: 0,
            capacity_limit: 1,
        };
        let mut ser = Serializer::with_options(Vec::<u8>::new(), options)?;

        ser.serialize_bool(true)?;
        assert!(matches!(
            ser.serialize_uint16(1023, uint16_default()),
            Err(Error::AllocationFailed { .. })
        ));

        Ok(())
    }
}
