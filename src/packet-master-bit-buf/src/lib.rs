//! Provides streaming bit level packing of data into byte sinks.
//!
//! Values which need fewer than 8 bits can share bytes with each
//! other, while byte-aligned payloads are copied as a whole. The
//! two interleave through a single *pending byte*: the one byte
//! which has received some, but not all of its bits.
//!
//! # Implementation
//!
//! Bits are packed starting at the LSB of a byte, working towards
//! the MSB. Only the pending byte and whatever follows it stays
//! resident in memory; every byte before it is final and is handed
//! to the output sink as soon as possible.
//!
//! On the reading side the pending byte is simply held by value,
//! since bytes from the source are consumed immediately.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::io;

use thiserror::Error;

mod buffer;
pub use buffer::ByteBuffer;

mod reader;
pub use reader::BitReader;

mod writer;
pub use writer::BitWriter;

pub mod utils;

/// Errors produced while packing or unpacking bits.
#[derive(Debug, Error)]
pub enum Error {
    /// The staging buffer could not grow to the requested capacity.
    #[error("failed to allocate {requested} bytes for the staging buffer")]
    AllocationFailed { requested: usize },

    /// An internal move or index into the staging buffer was out of range.
    #[error("memory operation on the staging buffer failed")]
    MemoryOperationFailed,

    /// The output sink rejected a write.
    #[error("failed to write to the output sink: {0}")]
    WriteFailed(#[source] io::Error),

    /// The input source could not provide the requested bytes.
    #[error("failed to read from the input source: {0}")]
    ReadFailed(#[source] io::Error),
}
