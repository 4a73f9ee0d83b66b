mod tables;
mod validate;

use std::ops::Range;

use crate::bits;
use crate::error::LayoutError;
use crate::types::{Direction, Page, TagKind};

pub use tables::{ADJ_FIELDS, ALINE_FIELDS, NT_FIELDS};

/// Every value a tag layout can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TagType,
    Version,
    UniqueId,
    /// Absolute location in meters. NT and AlineT carry only the nominal one.
    AbsLocation(Direction),
    Tin(Direction),
    StationId(Direction),
    SectionType(Direction),
    CommRequired(Direction),
    TagPlacement,
    AbsLocationReset,
    /// Adjacent-line TIN, index 0..5.
    AdjacentTin(u8),
    TagDuplication,
    LocationReset(Direction),
    LocCorrectionType,
    Reserved,
    Reserved1,
    TagSubType,
    /// The CRC-30 written after both pages are laid out.
    Checksum,
}

/// One insertion of (part of) a field into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub page: Page,
    /// Bits below the MSB of the byte at `byte_offset` where the field starts.
    pub start: u32,
    pub width: u32,
    pub byte_offset: usize,
    /// Right shift applied to the source value before masking; non-zero for
    /// the upper part of a field split across pages.
    pub shift: u32,
}

impl FieldSpec {
    pub const fn new(field: Field, page: Page, start: u32, width: u32, byte_offset: usize) -> Self {
        FieldSpec {
            field,
            page,
            start,
            width,
            byte_offset,
            shift: 0,
        }
    }

    /// Carry the source value's bits from `shift` upwards.
    pub const fn upper(self, shift: u32) -> Self {
        FieldSpec { shift, ..self }
    }

    /// Page bit positions (X0..X63 / Y0..Y63) this insertion covers.
    pub fn page_bits(&self) -> Result<Range<u32>, LayoutError> {
        bits::page_bits(self.start, self.width, self.byte_offset)
    }

    /// The part of `value` this insertion stores.
    pub fn slice(&self, value: u32) -> u32 {
        value.checked_shr(self.shift).unwrap_or(0) & bits::field_mask(self.width)
    }
}

/// Where the checksum is written once both pages are laid out: Y34-Y63.
pub const CHECKSUM_SLOT: FieldSpec = FieldSpec {
    field: Field::Checksum,
    page: Page::Y,
    start: 0,
    width: crate::crc::CHECKSUM_BITS,
    byte_offset: 0,
    shift: 0,
};

/// The ordered insertion table for one tag variant.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub kind: TagKind,
    pub fields: &'static [FieldSpec],
}

static NT: Layout = Layout {
    kind: TagKind::Nt,
    fields: NT_FIELDS,
};

static ALINE: Layout = Layout {
    kind: TagKind::Aline,
    fields: ALINE_FIELDS,
};

static ADJ: Layout = Layout {
    kind: TagKind::Adj,
    fields: ADJ_FIELDS,
};

impl Layout {
    pub fn for_kind(kind: TagKind) -> &'static Layout {
        match kind {
            TagKind::Nt => &NT,
            TagKind::Aline => &ALINE,
            TagKind::Adj => &ADJ,
        }
    }

    /// Check the table against the page size, itself, the checksum slot and
    /// the checksum window.
    pub fn validate(&self) -> Result<(), LayoutError> {
        validate::check_bounds(self)?;
        validate::check_overlap(self)?;
        validate::check_coverage(self)
    }

    /// Bit positions a field occupies, one range per insertion.
    pub fn positions(&self, field: Field) -> Vec<(Page, Range<u32>)> {
        self.fields
            .iter()
            .filter(|spec| spec.field == field)
            .filter_map(|spec| spec.page_bits().ok().map(|r| (spec.page, r)))
            .collect()
    }

    /// Distinct fields in table order.
    pub fn distinct_fields(&self) -> Vec<Field> {
        let mut out: Vec<Field> = Vec::with_capacity(self.fields.len());
        for spec in self.fields {
            if !out.contains(&spec.field) {
                out.push(spec.field);
            }
        }
        out
    }

    /// Total declared width of a field across all of its insertions.
    pub fn field_width(&self, field: Field) -> u32 {
        self.fields
            .iter()
            .filter(|spec| spec.field == field)
            .map(|spec| spec.width)
            .sum()
    }
}
