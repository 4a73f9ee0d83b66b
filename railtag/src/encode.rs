//! Layout-driven tag encoder.

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, trace};

use crate::bits::{field_mask, insert_bits};
use crate::crc::{checksum_window, clear_checksum, Crc30, CHECKSUM_BITS};
use crate::error::EncodeError;
use crate::layout::{Field, FieldSpec, Layout, CHECKSUM_SLOT};
use crate::record::{FieldSource, TagRecord};
use crate::types::{EncodedTag, Page, PageBytes, TagKind, PAGE_LEN};

/// Encodes tag records into their two pages.
///
/// The encoder is immutable once built and can be shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct TagEncoder<'a> {
    crc: &'a Crc30,
}

impl TagEncoder<'static> {
    /// Encoder using the shared CRC-30/CDMA engine.
    pub fn new() -> Result<Self, EncodeError> {
        TagEncoder::with_engine(Crc30::cdma())
    }
}

impl<'a> TagEncoder<'a> {
    /// Encoder using a caller-supplied CRC engine. Only the low 30 bits of
    /// its result are stored.
    pub fn with_engine(crc: &'a Crc30) -> Result<Self, EncodeError> {
        for kind in TagKind::ALL {
            Layout::for_kind(kind).validate()?;
        }
        Ok(TagEncoder { crc })
    }

    pub fn engine(&self) -> &'a Crc30 {
        self.crc
    }

    pub fn encode(&self, record: &TagRecord) -> Result<EncodedTag, EncodeError> {
        self.encode_fields(record)
    }

    /// Lay out every field of `source`'s variant, then compute and insert
    /// the checksum.
    ///
    /// Values wider than their field are truncated to the field width.
    pub fn encode_fields<S: FieldSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<EncodedTag, EncodeError> {
        let layout = Layout::for_kind(source.kind());
        let mut page_x: PageBytes = [0; PAGE_LEN];
        let mut page_y: PageBytes = [0; PAGE_LEN];

        for spec in layout.fields {
            let value = source.value(spec.field).ok_or(EncodeError::MissingField {
                field: spec.field,
                kind: layout.kind,
            })?;
            if is_truncated(layout, spec, value) {
                trace!(
                    kind = %layout.kind,
                    field = ?spec.field,
                    value,
                    width = layout.field_width(spec.field),
                    "field value truncated"
                );
            }
            let page = match spec.page {
                Page::X => &mut page_x,
                Page::Y => &mut page_y,
            };
            insert_bits(page, spec.start, spec.width, spec.byte_offset, spec.slice(value))?;
        }

        let checksum = self.checksum(&page_x, &page_y);
        insert_bits(
            &mut page_y,
            CHECKSUM_SLOT.start,
            CHECKSUM_SLOT.width,
            CHECKSUM_SLOT.byte_offset,
            checksum,
        )?;

        debug!(
            kind = %layout.kind,
            unique_id = source.value(Field::UniqueId).unwrap_or_default(),
            checksum = %format_args!("{checksum:08x}"),
            "encoded tag"
        );

        Ok(EncodedTag {
            kind: layout.kind,
            page_x,
            page_y,
            checksum,
        })
    }

    /// Encode every record independently. Results are in input order; a
    /// failing record does not affect the others.
    pub fn encode_batch(&self, records: &[TagRecord]) -> Vec<Result<EncodedTag, EncodeError>> {
        debug!(count = records.len(), "encoding batch");

        #[cfg(feature = "parallel")]
        let results = records.par_iter().map(|r| self.encode(r)).collect();

        #[cfg(not(feature = "parallel"))]
        let results = records.iter().map(|r| self.encode(r)).collect();

        results
    }

    /// Recompute the checksum of an encoded tag and compare it with both the
    /// stored field and the bits in Y34-Y63.
    pub fn check(&self, tag: &EncodedTag) -> bool {
        let expected = self.checksum(&tag.page_x, &clear_checksum(&tag.page_y));
        let stored = (u64::from_be_bytes(tag.page_y) >> (64 - CHECKSUM_BITS)) as u32;
        expected == tag.checksum && expected == stored
    }

    fn checksum(&self, page_x: &PageBytes, page_y: &PageBytes) -> u32 {
        self.crc.checksum(&checksum_window(page_x, page_y)) & field_mask(CHECKSUM_BITS)
    }
}

/// Whether `value` has bits above the field's declared width. Only the
/// insertion carrying the field's top bits reports, so split fields are
/// counted once.
fn is_truncated(layout: &Layout, spec: &FieldSpec, value: u32) -> bool {
    let top = spec.shift + spec.width;
    value.checked_shr(top).unwrap_or(0) != 0 && top == layout.field_width(spec.field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::{CrcParams, CRC30_CDMA};
    use crate::record::{AlineTag, NtTag, TagDirection};
    use crate::types::Direction;

    fn nt_904() -> NtTag {
        NtTag {
            unique_id: 904,
            abs_location: 163_820,
            placement: 1,
            nominal: TagDirection {
                tin: 84,
                station_id: 528,
                section_type: 2,
                comm_required: 0,
            },
            reverse: TagDirection {
                tin: 84,
                station_id: 527,
                section_type: 2,
                comm_required: 0,
            },
            ..NtTag::default()
        }
    }

    #[test]
    fn encodes_nt_pages() {
        let enc = TagEncoder::new().unwrap();
        let tag = enc.encode(&nt_904().into()).unwrap();
        assert_eq!(tag.kind, TagKind::Nt);
        assert_eq!(tag.page_x_hex(), "082a2a027fece219");
        assert_eq!(tag.page_y_hex(), "f65d4fe80d010781");
        assert_eq!(tag.checksum, 0x3d97_53fa);
        assert!(enc.check(&tag));
    }

    #[test]
    fn check_accepts_every_reference_vector() {
        let enc = TagEncoder::new().unwrap();
        for v in crate::reference::reference_vectors() {
            let tag = enc.encode(&v.record).unwrap();
            assert!(enc.check(&tag), "{}", v.name);
        }
    }

    #[test]
    fn check_detects_payload_corruption() {
        let enc = TagEncoder::new().unwrap();
        let clean = enc.encode(&nt_904().into()).unwrap();
        assert!(enc.check(&clean));

        let mut tag = clean;
        tag.page_x[3] ^= 0x10;
        assert!(!enc.check(&tag));

        // Y24-Y31, inside the checksum window
        let mut tag = clean;
        tag.page_y[4] ^= 0x01;
        assert!(!enc.check(&tag));
    }

    #[test]
    fn check_detects_stored_checksum_corruption() {
        let enc = TagEncoder::new().unwrap();
        let clean = enc.encode(&nt_904().into()).unwrap();

        // Y34 only: the window is unchanged, the stored bits are not
        let mut tag = clean;
        tag.page_y[3] ^= 0x04;
        assert_eq!(clear_checksum(&tag.page_y), clear_checksum(&clean.page_y));
        assert!(!enc.check(&tag));

        let mut tag = clean;
        tag.page_y[0] ^= 0x80;
        assert!(!enc.check(&tag));

        let mut tag = clean;
        tag.checksum ^= 1;
        assert!(!enc.check(&tag));
    }

    #[test]
    fn station_id_is_ignored_outside_nt() {
        let enc = TagEncoder::new().unwrap();
        let with_station = TagDirection {
            station_id: 528,
            ..TagDirection::default()
        };
        let aline = AlineTag {
            nominal: with_station,
            ..AlineTag::default()
        };
        let adj = crate::record::AdjTag {
            reverse: with_station,
            ..crate::record::AdjTag::default()
        };
        assert_eq!(
            enc.encode(&aline.into()).unwrap(),
            enc.encode(&AlineTag::default().into()).unwrap()
        );
        assert_eq!(
            enc.encode(&adj.into()).unwrap(),
            enc.encode(&crate::record::AdjTag::default().into()).unwrap()
        );
    }

    #[test]
    fn overflow_is_masked_not_rejected() {
        let enc = TagEncoder::new().unwrap();
        let mut wide = nt_904();
        wide.nominal.tin += 256;
        wide.placement += 8;
        assert_eq!(
            enc.encode(&wide.into()).unwrap(),
            enc.encode(&nt_904().into()).unwrap()
        );
    }

    #[test]
    fn truncation_check_counts_split_fields_once() {
        let nt = Layout::for_kind(TagKind::Nt);
        let [low, high] = [nt.fields[6], nt.fields[7]];
        assert_eq!(low.field, Field::StationId(Direction::Nominal));
        assert!(!is_truncated(nt, &low, 0xFFFF));
        assert!(!is_truncated(nt, &high, 0xFFFF));
        assert!(is_truncated(nt, &high, 0x1_0000));
    }

    #[test]
    fn missing_field_is_reported() {
        struct NoTin;
        impl FieldSource for NoTin {
            fn kind(&self) -> TagKind {
                TagKind::Aline
            }
            fn value(&self, field: Field) -> Option<u32> {
                match field {
                    Field::Tin(_) => None,
                    _ => Some(0),
                }
            }
        }

        let err = TagEncoder::new().unwrap().encode_fields(&NoTin).unwrap_err();
        assert_eq!(
            err,
            EncodeError::MissingField {
                field: Field::Tin(Direction::Nominal),
                kind: TagKind::Aline,
            }
        );
    }

    #[test]
    fn custom_engine_changes_checksum_only() {
        let engine = Crc30::new(CrcParams {
            init: 0,
            ..CRC30_CDMA
        })
        .unwrap();
        let custom = TagEncoder::with_engine(&engine).unwrap();
        let standard = TagEncoder::new().unwrap();
        let record: TagRecord = AlineTag::default().into();

        let a = custom.encode(&record).unwrap();
        let b = standard.encode(&record).unwrap();
        assert_eq!(a.page_x, b.page_x);
        assert_eq!(a.page_y[4..], b.page_y[4..]);
        assert_ne!(a.checksum, b.checksum);
        assert!(custom.check(&a));
        assert!(!standard.check(&a));
    }

    #[test]
    fn batch_keeps_input_order() {
        let enc = TagEncoder::new().unwrap();
        let records: Vec<TagRecord> = (0..32)
            .map(|uid| {
                NtTag {
                    unique_id: uid,
                    ..nt_904()
                }
                .into()
            })
            .collect();
        let results = enc.encode_batch(&records);
        assert_eq!(results.len(), records.len());
        for (record, result) in records.iter().zip(&results) {
            assert_eq!(result.as_ref().unwrap(), &enc.encode(record).unwrap());
        }
    }
}
