//! Per-variant insertion tables, in encoding order.
//!
//! Position comments use the page bit numbering of [`crate::bits::page_bits`].

use super::{Field, FieldSpec};
use crate::types::Direction::{Nominal, Reverse};
use crate::types::Page::{X, Y};

pub const NT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(Field::TagType, X, 4, 4, 7),                 // X0-X3
    FieldSpec::new(Field::Version, X, 2, 2, 7),                 // X4-X5
    FieldSpec::new(Field::UniqueId, X, 0, 10, 6),               // X6-X15
    FieldSpec::new(Field::AbsLocation(Nominal), X, 1, 23, 3),   // X16-X38
    FieldSpec::new(Field::Tin(Nominal), X, 1, 8, 2),            // X39-X46
    FieldSpec::new(Field::Tin(Reverse), X, 1, 8, 1),            // X47-X54
    FieldSpec::new(Field::StationId(Nominal), X, 0, 9, 0),      // X55-X63
    FieldSpec::new(Field::StationId(Nominal), Y, 1, 7, 7).upper(9), // Y0-Y6
    FieldSpec::new(Field::StationId(Reverse), Y, 1, 16, 5),     // Y7-Y22
    FieldSpec::new(Field::SectionType(Nominal), Y, 7, 2, 4),    // Y23-Y24
    FieldSpec::new(Field::SectionType(Reverse), Y, 5, 2, 4),    // Y25-Y26
    FieldSpec::new(Field::TagPlacement, Y, 2, 3, 4),            // Y27-Y29
    FieldSpec::new(Field::AbsLocationReset, Y, 0, 2, 4),        // Y30-Y31
    FieldSpec::new(Field::CommRequired(Nominal), Y, 7, 1, 3),   // Y32
    FieldSpec::new(Field::CommRequired(Reverse), Y, 6, 1, 3),   // Y33
];

pub const ALINE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(Field::TagType, X, 4, 4, 7),                 // X0-X3
    FieldSpec::new(Field::Version, X, 2, 2, 7),                 // X4-X5
    FieldSpec::new(Field::UniqueId, X, 0, 10, 6),               // X6-X15
    FieldSpec::new(Field::AbsLocation(Nominal), X, 1, 23, 3),   // X16-X38
    FieldSpec::new(Field::Tin(Nominal), X, 1, 8, 2),            // X39-X46
    FieldSpec::new(Field::Tin(Reverse), X, 1, 8, 1),            // X47-X54
    FieldSpec::new(Field::AdjacentTin(0), X, 1, 8, 0),          // X55-X62
    FieldSpec::new(Field::AdjacentTin(1), X, 0, 1, 0),          // X63
    FieldSpec::new(Field::AdjacentTin(1), Y, 1, 7, 7).upper(1), // Y0-Y6
    FieldSpec::new(Field::AdjacentTin(2), Y, 1, 8, 6),          // Y7-Y14
    FieldSpec::new(Field::AdjacentTin(3), Y, 1, 8, 5),          // Y15-Y22
    FieldSpec::new(Field::AdjacentTin(4), Y, 1, 8, 4),          // Y23-Y30
    FieldSpec::new(Field::TagDuplication, Y, 0, 1, 4),          // Y31
];

pub const ADJ_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(Field::TagType, X, 4, 4, 7),                 // X0-X3
    FieldSpec::new(Field::Version, X, 2, 2, 7),                 // X4-X5
    FieldSpec::new(Field::UniqueId, X, 0, 10, 6),               // X6-X15
    FieldSpec::new(Field::AbsLocation(Nominal), X, 1, 23, 3),   // X16-X38
    FieldSpec::new(Field::Tin(Nominal), X, 1, 8, 2),            // X39-X46
    FieldSpec::new(Field::Tin(Reverse), X, 1, 8, 1),            // X47-X54
    FieldSpec::new(Field::AbsLocation(Reverse), X, 0, 9, 0),    // X55-X63
    FieldSpec::new(Field::AbsLocation(Reverse), Y, 2, 14, 6).upper(9), // Y0-Y13
    FieldSpec::new(Field::LocationReset(Nominal), Y, 7, 3, 5),  // Y14-Y16
    FieldSpec::new(Field::LocationReset(Reverse), Y, 4, 3, 5),  // Y17-Y19
    FieldSpec::new(Field::LocCorrectionType, Y, 3, 1, 5),       // Y20
    FieldSpec::new(Field::Reserved, Y, 1, 2, 5),                // Y21-Y22
    FieldSpec::new(Field::SectionType(Nominal), Y, 7, 2, 4),    // Y23-Y24
    FieldSpec::new(Field::SectionType(Reverse), Y, 5, 2, 4),    // Y25-Y26
    FieldSpec::new(Field::Reserved1, Y, 1, 4, 4),               // Y27-Y30
    FieldSpec::new(Field::TagSubType, Y, 0, 1, 4),              // Y31
    FieldSpec::new(Field::CommRequired(Nominal), Y, 7, 1, 3),   // Y32
    FieldSpec::new(Field::CommRequired(Reverse), Y, 6, 1, 3),   // Y33
];
