use std::io;

use packet_master_bit_buf as bit_buf;
use thiserror::Error;

/// Errors that may occur during (de)serialization.
#[derive(Debug, Error)]
pub enum Error {
    /// Growing the staging buffer failed.
    #[error("memory allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },

    /// An internal move within the staging buffer failed.
    #[error("memory operation failed")]
    MemoryOperationFailed,

    /// The output sink rejected a write.
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// The input source could not supply the requested bytes,
    /// including running out of data.
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),

    /// A length prefix announced a payload that does not fit the
    /// integer type it is decoded into.
    #[error("invalid encoding: payload of {bits} bits exceeds {width}-bit integer")]
    InvalidEncoding { bits: u32, width: u32 },
}

impl From<bit_buf::Error> for Error {
    fn from(e: bit_buf::Error) -> Self {
        match e {
            bit_buf::Error::AllocationFailed { requested } => Self::AllocationFailed { requested },
            bit_buf::Error::MemoryOperationFailed => Self::MemoryOperationFailed,
            bit_buf::Error::WriteFailed(e) => Self::WriteFailed(e),
            bit_buf::Error::ReadFailed(e) => Self::ReadFailed(e),
        }
    }
}
