use std::ops::Range;

use crate::error::LayoutError;
use crate::types::PAGE_LEN;

/// Size in bytes of the big-endian group a field is written through.
///
/// `start` counts bits down from the most significant bit of the byte at the
/// field's offset, so the group must reach `start + nbits` bits:
/// 1 byte up to 8, 2 up to 16, 3 up to 24 and 4 up to 32.
pub fn group_len(start: u32, nbits: u32) -> Result<usize, LayoutError> {
    match start + nbits {
        0..=8 => Ok(1),
        9..=16 => Ok(2),
        17..=24 => Ok(3),
        25..=32 => Ok(4),
        _ => Err(LayoutError::TooWide { start, nbits }),
    }
}

/// Low `nbits` set.
pub fn field_mask(nbits: u32) -> u32 {
    if nbits >= 32 {
        u32::MAX
    } else {
        (1u32 << nbits) - 1
    }
}

/// Insert the low `nbits` of `value` into `buf`.
///
/// The field's most significant bit sits `start` bits below the MSB of
/// `buf[offset]` and the field runs towards less significant bits, spilling
/// into the following bytes. Bytes are loaded big-endian into a 1-4 byte
/// group, exactly `nbits` bits are cleared and replaced, and the group is
/// stored back. Values wider than `nbits` are masked, never rejected.
///
/// Returns the updated group value. Fails without touching `buf` when the
/// group would run past the end of the buffer.
pub fn insert_bits(
    buf: &mut [u8],
    start: u32,
    nbits: u32,
    offset: usize,
    value: u32,
) -> Result<u32, LayoutError> {
    let n = group_len(start, nbits)?;
    if offset + n > buf.len() {
        return Err(LayoutError::OutOfBounds {
            offset,
            group_len: n,
            buf_len: buf.len(),
        });
    }

    let group = &mut buf[offset..offset + n];
    let mut word = group.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);

    let shift = 8 * n as u32 - start - nbits;
    let mask = field_mask(nbits);
    word &= !(mask << shift);
    word |= (value & mask) << shift;

    for (i, byte) in group.iter_mut().enumerate() {
        *byte = (word >> (8 * (n - 1 - i))) as u8;
    }
    Ok(word)
}

/// Bit positions a field occupies within an 8-byte page.
///
/// Positions follow the X0..X63 / Y0..Y63 numbering: bit 0 is the least
/// significant bit of the page read as a big-endian `u64`, so byte 7 holds
/// bits 0-7 and byte 0 holds bits 56-63.
pub fn page_bits(start: u32, nbits: u32, offset: usize) -> Result<Range<u32>, LayoutError> {
    let n = group_len(start, nbits)?;
    if offset + n > PAGE_LEN {
        return Err(LayoutError::OutOfBounds {
            offset,
            group_len: n,
            buf_len: PAGE_LEN,
        });
    }
    let msb = 63 - 8 * offset as u32 - start;
    Ok(msb + 1 - nbits..msb + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_sizes() {
        assert_eq!(group_len(4, 4).unwrap(), 1);
        assert_eq!(group_len(7, 2).unwrap(), 2);
        assert_eq!(group_len(1, 16).unwrap(), 3);
        assert_eq!(group_len(1, 23).unwrap(), 3);
        assert_eq!(group_len(0, 30).unwrap(), 4);
        assert!(matches!(
            group_len(3, 30),
            Err(LayoutError::TooWide { start: 3, nbits: 30 })
        ));
    }

    #[test]
    fn insert_low_nibble() {
        let mut buf = [0u8; 8];
        let word = insert_bits(&mut buf, 4, 4, 7, 9).unwrap();
        assert_eq!(word, 0x09);
        assert_eq!(buf[7], 0x09);
    }

    #[test]
    fn insert_preserves_neighbours() {
        let mut buf = [0xFFu8; 2];
        insert_bits(&mut buf, 7, 2, 0, 0).unwrap();
        // bit 0 of byte 0 and bit 7 of byte 1 cleared
        assert_eq!(buf, [0xFE, 0x7F]);
    }

    #[test]
    fn insert_masks_overflowing_value() {
        let mut buf = [0u8; 1];
        insert_bits(&mut buf, 2, 2, 0, 0b111).unwrap();
        assert_eq!(buf[0], 0b0011_0000);
    }

    #[test]
    fn insert_spanning_three_bytes() {
        let mut buf = [0u8; 3];
        let word = insert_bits(&mut buf, 1, 23, 0, 0x7F_FFFF).unwrap();
        assert_eq!(word, 0x7F_FFFF);
        assert_eq!(buf, [0x7F, 0xFF, 0xFF]);
    }

    #[test]
    fn insert_thirty_bits_leaves_low_two() {
        let mut buf = [0u8, 0, 0, 0b11];
        insert_bits(&mut buf, 0, 30, 0, 0x3FFF_FFFF).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 0xFF, 0xFF]);
        insert_bits(&mut buf, 0, 30, 0, 0).unwrap();
        assert_eq!(buf, [0, 0, 0, 0b11]);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let mut buf = [0u8; 8];
        let err = insert_bits(&mut buf, 1, 16, 6, 1).unwrap_err();
        assert_eq!(
            err,
            LayoutError::OutOfBounds {
                offset: 6,
                group_len: 3,
                buf_len: 8
            }
        );
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn page_bits_numbering() {
        // tag type nibble: X0-X3
        assert_eq!(page_bits(4, 4, 7).unwrap(), 0..4);
        // unique id: X6-X15
        assert_eq!(page_bits(0, 10, 6).unwrap(), 6..16);
        // checksum: Y34-Y63
        assert_eq!(page_bits(0, 30, 0).unwrap(), 34..64);
        assert!(page_bits(0, 9, 7).is_err());
    }
}
