//! Typed tag records, one per surveyed tag.
//!
//! Records carry plain integer field values. Omitted values take the
//! per-field defaults from the `Default` impls: the variant's canonical
//! tag-type code, version 1 and zero for everything else.

use crate::layout::Field;
use crate::types::{Direction, TagKind};

/// Attributes a tag carries for one travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TagDirection {
    /// Track identification number.
    pub tin: u32,
    /// Station identifier. Only NT tags carry it; AlineT and AdjT records
    /// accept the value but never encode it.
    pub station_id: u32,
    pub section_type: u32,
    /// Communication-required flag.
    pub comm_required: u32,
}

/// Normal / turnout tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NtTag {
    pub tag_type: u32,
    pub version: u32,
    pub unique_id: u32,
    pub abs_location: u32,
    pub placement: u32,
    pub location_reset: u32,
    pub nominal: TagDirection,
    pub reverse: TagDirection,
}

impl Default for NtTag {
    fn default() -> Self {
        NtTag {
            tag_type: TagKind::Nt.canonical_code(),
            version: 1,
            unique_id: 0,
            abs_location: 0,
            placement: 0,
            location_reset: 0,
            nominal: TagDirection::default(),
            reverse: TagDirection::default(),
        }
    }
}

/// Adjacent-line tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlineTag {
    pub tag_type: u32,
    pub version: u32,
    pub unique_id: u32,
    pub abs_location: u32,
    pub nominal: TagDirection,
    pub reverse: TagDirection,
    pub adjacent_tins: [u32; 5],
    pub duplication: u32,
}

impl Default for AlineTag {
    fn default() -> Self {
        AlineTag {
            tag_type: TagKind::Aline.canonical_code(),
            version: 1,
            unique_id: 0,
            abs_location: 0,
            nominal: TagDirection::default(),
            reverse: TagDirection::default(),
            adjacent_tins: [0; 5],
            duplication: 0,
        }
    }
}

/// Junction / adjustment tag. Locations and location resets are per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdjTag {
    pub tag_type: u32,
    pub version: u32,
    pub unique_id: u32,
    pub nominal_location: u32,
    pub reverse_location: u32,
    pub nominal_reset: u32,
    pub reverse_reset: u32,
    pub loc_correction_type: u32,
    pub reserved: u32,
    pub reserved1: u32,
    pub tag_sub_type: u32,
    pub nominal: TagDirection,
    pub reverse: TagDirection,
}

impl Default for AdjTag {
    fn default() -> Self {
        AdjTag {
            tag_type: TagKind::Adj.canonical_code(),
            version: 1,
            unique_id: 0,
            nominal_location: 0,
            reverse_location: 0,
            nominal_reset: 0,
            reverse_reset: 0,
            loc_correction_type: 0,
            reserved: 0,
            reserved1: 0,
            tag_sub_type: 0,
            nominal: TagDirection::default(),
            reverse: TagDirection::default(),
        }
    }
}

/// A tag of any variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum TagRecord {
    #[cfg_attr(feature = "serde", serde(alias = "NT"))]
    Nt(NtTag),
    #[cfg_attr(feature = "serde", serde(alias = "AlineT"))]
    Aline(AlineTag),
    #[cfg_attr(feature = "serde", serde(alias = "AdjT"))]
    Adj(AdjTag),
}

impl From<NtTag> for TagRecord {
    fn from(tag: NtTag) -> Self {
        TagRecord::Nt(tag)
    }
}

impl From<AlineTag> for TagRecord {
    fn from(tag: AlineTag) -> Self {
        TagRecord::Aline(tag)
    }
}

impl From<AdjTag> for TagRecord {
    fn from(tag: AdjTag) -> Self {
        TagRecord::Adj(tag)
    }
}

/// Supplies field values to the layout-driven encoder.
pub trait FieldSource {
    fn kind(&self) -> TagKind;

    /// The raw (unmasked) value of `field`, or `None` if this record has no
    /// such field.
    fn value(&self, field: Field) -> Option<u32>;
}

fn pick(nominal: &TagDirection, reverse: &TagDirection, d: Direction) -> TagDirection {
    match d {
        Direction::Nominal => *nominal,
        Direction::Reverse => *reverse,
    }
}

impl FieldSource for NtTag {
    fn kind(&self) -> TagKind {
        TagKind::Nt
    }

    fn value(&self, field: Field) -> Option<u32> {
        let dir = |d| pick(&self.nominal, &self.reverse, d);
        Some(match field {
            Field::TagType => self.tag_type,
            Field::Version => self.version,
            Field::UniqueId => self.unique_id,
            Field::AbsLocation(Direction::Nominal) => self.abs_location,
            Field::Tin(d) => dir(d).tin,
            Field::StationId(d) => dir(d).station_id,
            Field::SectionType(d) => dir(d).section_type,
            Field::CommRequired(d) => dir(d).comm_required,
            Field::TagPlacement => self.placement,
            Field::AbsLocationReset => self.location_reset,
            _ => return None,
        })
    }
}

impl FieldSource for AlineTag {
    fn kind(&self) -> TagKind {
        TagKind::Aline
    }

    fn value(&self, field: Field) -> Option<u32> {
        let dir = |d| pick(&self.nominal, &self.reverse, d);
        Some(match field {
            Field::TagType => self.tag_type,
            Field::Version => self.version,
            Field::UniqueId => self.unique_id,
            Field::AbsLocation(Direction::Nominal) => self.abs_location,
            Field::Tin(d) => dir(d).tin,
            Field::AdjacentTin(i) => *self.adjacent_tins.get(i as usize)?,
            Field::TagDuplication => self.duplication,
            _ => return None,
        })
    }
}

impl FieldSource for AdjTag {
    fn kind(&self) -> TagKind {
        TagKind::Adj
    }

    fn value(&self, field: Field) -> Option<u32> {
        let dir = |d| pick(&self.nominal, &self.reverse, d);
        Some(match field {
            Field::TagType => self.tag_type,
            Field::Version => self.version,
            Field::UniqueId => self.unique_id,
            Field::AbsLocation(Direction::Nominal) => self.nominal_location,
            Field::AbsLocation(Direction::Reverse) => self.reverse_location,
            Field::Tin(d) => dir(d).tin,
            Field::SectionType(d) => dir(d).section_type,
            Field::CommRequired(d) => dir(d).comm_required,
            Field::LocationReset(Direction::Nominal) => self.nominal_reset,
            Field::LocationReset(Direction::Reverse) => self.reverse_reset,
            Field::LocCorrectionType => self.loc_correction_type,
            Field::Reserved => self.reserved,
            Field::Reserved1 => self.reserved1,
            Field::TagSubType => self.tag_sub_type,
            _ => return None,
        })
    }
}

impl FieldSource for TagRecord {
    fn kind(&self) -> TagKind {
        match self {
            TagRecord::Nt(t) => t.kind(),
            TagRecord::Aline(t) => t.kind(),
            TagRecord::Adj(t) => t.kind(),
        }
    }

    fn value(&self, field: Field) -> Option<u32> {
        match self {
            TagRecord::Nt(t) => t.value(field),
            TagRecord::Aline(t) => t.value(field),
            TagRecord::Adj(t) => t.value(field),
        }
    }
}

impl TagRecord {
    /// A record of `kind` with every field at its default.
    pub fn default_for(kind: TagKind) -> TagRecord {
        match kind {
            TagKind::Nt => NtTag::default().into(),
            TagKind::Aline => AlineTag::default().into(),
            TagKind::Adj => AdjTag::default().into(),
        }
    }

    pub fn unique_id(&self) -> u32 {
        match self {
            TagRecord::Nt(t) => t.unique_id,
            TagRecord::Aline(t) => t.unique_id,
            TagRecord::Adj(t) => t.unique_id,
        }
    }

    /// Parse a single record from a TOML table with a `kind` key.
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<TagRecord, RecordError> {
        toml::from_str(toml_str).map_err(|e| RecordError::Toml(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid tag record: {0}")]
    Toml(String),
}
