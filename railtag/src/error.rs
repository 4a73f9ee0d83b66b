use thiserror::Error;

use crate::layout::Field;
use crate::types::TagKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("field of {nbits} bits at bit {start} does not fit a 32-bit group")]
    TooWide { start: u32, nbits: u32 },

    #[error("{group_len}-byte group at offset {offset} exceeds buffer of {buf_len} bytes")]
    OutOfBounds {
        offset: usize,
        group_len: usize,
        buf_len: usize,
    },

    #[error("{0:?} overlaps {1:?} in {2} layout")]
    Overlap(Field, Field, TagKind),

    #[error("{0:?} overlaps the checksum in {1} layout")]
    ChecksumOverlap(Field, TagKind),

    #[error("{0:?} lies outside the checksum window in {1} layout")]
    Unprotected(Field, TagKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrcError {
    #[error("CRC order {0} is outside 8..=32")]
    Order(u32),

    #[error("CRC {name} {value:#x} does not fit in {order} bits")]
    ParamWidth {
        name: &'static str,
        value: u32,
        order: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("{kind} record has no value for {field:?}")]
    MissingField { field: Field, kind: TagKind },
}
