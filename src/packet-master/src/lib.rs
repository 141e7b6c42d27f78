//! Dense bit-level serialization of booleans and bounded unsigned
//! integers.
//!
//! Every integer field is declared with the largest number of bits
//! it may ever need. The encoder then only spends a short length
//! prefix plus the bits the concrete value actually uses, while
//! booleans and prefixes share bytes with their neighbors.
//!
//! The stream is not self-describing: reading it back requires the
//! exact same sequence of typed calls with identical options.
//!
//! ```
//! use packet_master::{uint16_default, uint8_max_bits, Deserializer, Serializer};
//!
//! let mut out: Vec<u8> = Vec::new();
//! let mut ser = Serializer::new(&mut out);
//! ser.serialize_bool(true)?;
//! ser.serialize_uint8(5, uint8_max_bits(4))?;
//! ser.serialize_uint16(1023, uint16_default())?;
//! ser.finalize()?;
//!
//! let mut de = Deserializer::new(out.as_slice());
//! assert!(de.deserialize_bool()?);
//! assert_eq!(de.deserialize_uint8(uint8_max_bits(4))?, 5);
//! assert_eq!(de.deserialize_uint16(uint16_default())?, 1023);
//! # Ok::<(), packet_master::Error>(())
//! ```

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod de;
pub use de::Deserializer;

mod error;
pub use error::Error;

mod options;
pub use options::*;

mod ser;
pub use ser::{Serializer, SerializerOptions, State};

mod uint;
pub use uint::Uint;
