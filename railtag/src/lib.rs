//! Encoding of railway RFID tags.
//!
//! A tag record is laid out bit by bit into two 8-byte pages, X and Y,
//! according to a per-variant [`layout::Layout`]. A CRC-30 over the first 13
//! bytes of the page-reversed concatenation is then written into the top 30
//! bits of page Y.

pub mod types;
pub mod error;
pub mod bits;
pub mod crc;
pub mod layout;
pub mod record;
pub mod encode;
pub mod reference;

pub use encode::TagEncoder;
pub use record::{AdjTag, AlineTag, FieldSource, NtTag, TagDirection, TagRecord};
pub use types::{EncodedTag, TagKind};
