use std::io::{self, Write};

use packet_master_bit_buf::{BitWriter, ByteBuffer, Error};

#[test]
fn write_single_bits() -> Result<(), Error> {
    let mut out: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut out);

    writer.push_bit(true)?;
    writer.push_bit(false)?;
    writer.push_bit(true)?;
    assert!(writer.has_pending_byte());
    assert_eq!(writer.buffered_bytes(), 1);

    writer.finalize()?;
    assert_eq!(out, &[0b101]);

    Ok(())
}

#[test]
fn write_bits_across_bytes() -> Result<(), Error> {
    let mut out: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut out);

    writer.push_bits(0b101, 3)?;
    writer.push_bits(0x3FF, 10)?;
    writer.push_bits(u32::MAX, 32)?;
    writer.finalize()?;

    // 3 + 10 + 32 = 45 bits, the last 3 bits of the 6th byte are padding.
    assert_eq!(out, &[0xFD, 0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);

    Ok(())
}

#[test]
fn full_bytes_are_flushed_eagerly() -> Result<(), Error> {
    let mut out: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut out);

    writer.push_bits(0xAB, 8)?;
    assert!(!writer.has_pending_byte());
    assert_eq!(writer.buffered_bytes(), 0);
    assert_eq!(writer.stream_position(), 1);

    writer.push_bit(true)?;
    assert_eq!(writer.get_ref().as_slice(), &[0xAB]);

    Ok(())
}

#[test]
fn aligned_payload_keeps_pending_byte_resident() -> Result<(), Error> {
    let mut out: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut out);

    writer.push_bit(true)?;
    writer.write_aligned(&[0xFF, 0x03], 16)?;

    // The pending byte blocks everything after it from being flushed.
    assert_eq!(writer.buffered_bytes(), 3);
    assert!(writer.get_ref().is_empty());

    writer.push_bit(true)?;
    writer.finalize()?;

    assert_eq!(out, &[0b11, 0xFF, 0x03]);
    Ok(())
}

#[test]
fn partial_payload_opens_pending_byte() -> Result<(), Error> {
    let mut out: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut out);

    // Garbage above the used bits must not survive.
    writer.write_aligned(&[0xF3], 4)?;
    assert!(writer.has_pending_byte());

    writer.push_bits(0b101, 3)?;
    writer.push_bit(true)?;
    assert!(!writer.has_pending_byte());

    assert_eq!(out, &[0b1101_0011]);
    Ok(())
}

#[test]
fn reset_discards_buffered_bytes() -> Result<(), Error> {
    let mut out: Vec<u8> = Vec::new();
    let mut writer = BitWriter::new(&mut out);

    writer.push_bits(0b11, 2)?;
    writer.reset();
    assert_eq!(writer.buffered_bytes(), 0);
    assert_eq!(writer.stream_position(), 0);

    writer.push_bit(true)?;
    writer.finalize()?;

    assert_eq!(out, &[1]);
    Ok(())
}

#[test]
fn allocation_limit_surfaces() {
    let buffer = ByteBuffer::with_limit(0, 1).unwrap();
    let mut writer = BitWriter::with_buffer(Vec::<u8>::new(), buffer);

    writer.push_bit(true).unwrap();
    assert!(matches!(
        writer.write_aligned(&[1, 2], 16),
        Err(Error::AllocationFailed { .. })
    ));
}

struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_failure_keeps_bytes_resident() {
    let mut writer = BitWriter::new(FailingSink);

    writer.push_bits(0b1, 1).unwrap();
    assert!(matches!(writer.finalize(), Err(Error::WriteFailed(_))));
    assert_eq!(writer.buffered_bytes(), 1);
}

#[derive(Default)]
struct SwitchableSink {
    closed: bool,
    written: Vec<u8>,
}

impl Write for SwitchableSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_finalize_keeps_pending_byte() -> Result<(), Error> {
    let mut writer = BitWriter::new(SwitchableSink {
        closed: true,
        ..Default::default()
    });

    writer.push_bit(true)?;
    assert!(matches!(writer.finalize(), Err(Error::WriteFailed(_))));
    assert!(writer.has_pending_byte());

    writer.get_mut().closed = false;
    writer.push_bit(true)?;
    writer.finalize()?;

    assert_eq!(writer.get_ref().written, [0b11]);
    assert!(!writer.has_pending_byte());
    Ok(())
}
