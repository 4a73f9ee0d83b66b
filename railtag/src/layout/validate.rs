use std::ops::Range;

use super::{Layout, CHECKSUM_SLOT};
use crate::crc::CHECKSUM_WINDOW_LEN;
use crate::error::LayoutError;
use crate::types::{Page, PAGE_LEN};

fn range_mask(bits: &Range<u32>) -> u64 {
    bits.clone().fold(0u64, |acc, b| acc | (1u64 << b))
}

/// Every insertion, and the checksum, must fit inside an 8-byte page.
pub fn check_bounds(layout: &Layout) -> Result<(), LayoutError> {
    CHECKSUM_SLOT.page_bits()?;
    for spec in layout.fields {
        spec.page_bits()?;
    }
    Ok(())
}

/// No two insertions may write the same bit, and none may touch the checksum.
pub fn check_overlap(layout: &Layout) -> Result<(), LayoutError> {
    let checksum = range_mask(&CHECKSUM_SLOT.page_bits()?);
    let mut taken: Vec<(Page, u64, super::Field)> = Vec::with_capacity(layout.fields.len());

    for spec in layout.fields {
        let mask = range_mask(&spec.page_bits()?);
        if spec.page == CHECKSUM_SLOT.page && mask & checksum != 0 {
            return Err(LayoutError::ChecksumOverlap(spec.field, layout.kind));
        }
        if let Some((_, _, other)) = taken
            .iter()
            .find(|(page, bits, _)| *page == spec.page && bits & mask != 0)
        {
            return Err(LayoutError::Overlap(*other, spec.field, layout.kind));
        }
        taken.push((spec.page, mask, spec.field));
    }
    Ok(())
}

/// Field bits must lie inside the checksum window.
///
/// The window is all of page X followed by the five highest-addressed bytes
/// of page Y, i.e. Y0 up to (but excluding) the first bit of byte 2.
pub fn check_coverage(layout: &Layout) -> Result<(), LayoutError> {
    let covered_y_bits = 8 * (CHECKSUM_WINDOW_LEN - PAGE_LEN) as u32;
    for spec in layout.fields {
        let bits = spec.page_bits()?;
        if spec.page == Page::Y && bits.end > covered_y_bits {
            return Err(LayoutError::Unprotected(spec.field, layout.kind));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Field, FieldSpec};
    use crate::types::{Page, TagKind};

    fn layout_of(fields: &'static [FieldSpec]) -> Layout {
        Layout {
            kind: TagKind::Nt,
            fields,
        }
    }

    #[test]
    fn overlapping_fields_are_rejected() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::new(Field::TagType, Page::X, 4, 4, 7),
            FieldSpec::new(Field::Version, Page::X, 3, 2, 7),
        ];
        assert_eq!(
            check_overlap(&layout_of(FIELDS)),
            Err(LayoutError::Overlap(Field::TagType, Field::Version, TagKind::Nt))
        );
    }

    #[test]
    fn same_bits_on_other_page_are_fine() {
        static FIELDS: &[FieldSpec] = &[
            FieldSpec::new(Field::TagType, Page::X, 4, 4, 7),
            FieldSpec::new(Field::Version, Page::Y, 4, 4, 7),
        ];
        assert!(check_overlap(&layout_of(FIELDS)).is_ok());
    }

    #[test]
    fn checksum_overlap_is_rejected() {
        static FIELDS: &[FieldSpec] = &[FieldSpec::new(Field::TagSubType, Page::Y, 5, 1, 3)];
        assert_eq!(
            check_overlap(&layout_of(FIELDS)),
            Err(LayoutError::ChecksumOverlap(Field::TagSubType, TagKind::Nt))
        );
    }

    #[test]
    fn unprotected_bits_are_rejected() {
        // Y38-Y41 reaches into byte 2, which the window does not cover.
        static FIELDS: &[FieldSpec] = &[FieldSpec::new(Field::Reserved, Page::Y, 6, 4, 2)];
        assert_eq!(
            check_coverage(&layout_of(FIELDS)),
            Err(LayoutError::Unprotected(Field::Reserved, TagKind::Nt))
        );
    }

    #[test]
    fn out_of_page_is_rejected() {
        static FIELDS: &[FieldSpec] = &[FieldSpec::new(Field::UniqueId, Page::X, 0, 10, 7)];
        assert!(matches!(
            check_bounds(&layout_of(FIELDS)),
            Err(LayoutError::OutOfBounds { offset: 7, .. })
        ));
    }
}
