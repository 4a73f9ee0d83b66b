use std::fmt;
use std::str::FromStr;

/// Size of one tag page in bytes.
pub const PAGE_LEN: usize = 8;

/// One 64-bit payload block as written to the tag.
pub type PageBytes = [u8; PAGE_LEN];

/// The tag variants, each with its own field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TagKind {
    /// Normal / turnout tag.
    Nt,
    /// Adjacent-line tag.
    Aline,
    /// Junction / adjustment tag.
    Adj,
}

impl TagKind {
    pub const ALL: [TagKind; 3] = [TagKind::Nt, TagKind::Aline, TagKind::Adj];

    /// The tag-type code written into X0-X3 when a record does not override it.
    pub fn canonical_code(self) -> u32 {
        match self {
            TagKind::Nt => 9,
            TagKind::Aline => 11,
            TagKind::Adj => 12,
        }
    }

    /// Sheet name used by the survey workbooks.
    pub fn name(self) -> &'static str {
        match self {
            TagKind::Nt => "NT",
            TagKind::Aline => "AlineT",
            TagKind::Adj => "AdjT",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag kind '{0}' (expected nt, aline or adj)")]
pub struct UnknownKind(pub String);

impl FromStr for TagKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nt" => Ok(TagKind::Nt),
            "aline" | "alinet" => Ok(TagKind::Aline),
            "adj" | "adjt" => Ok(TagKind::Adj),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Travel direction for the dual-direction tag attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Nominal,
    Reverse,
}

/// Which of the two tag pages a field lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    X,
    Y,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::X => f.pad("X"),
            Page::Y => f.pad("Y"),
        }
    }
}

/// Encoder output: both pages and the checksum inserted into page Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedTag {
    pub kind: TagKind,
    pub page_x: PageBytes,
    pub page_y: PageBytes,
    /// CRC-30 value; the top two bits are always zero.
    pub checksum: u32,
}

impl EncodedTag {
    pub fn page(&self, page: Page) -> &PageBytes {
        match page {
            Page::X => &self.page_x,
            Page::Y => &self.page_y,
        }
    }

    pub fn page_x_hex(&self) -> String {
        hex::encode(self.page_x)
    }

    pub fn page_y_hex(&self) -> String {
        hex::encode(self.page_y)
    }

    /// Checksum as exactly 8 lowercase hex digits.
    pub fn checksum_hex(&self) -> String {
        format!("{:08x}", self.checksum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_str_accepts_sheet_names() {
        assert_eq!("NT".parse::<TagKind>().unwrap(), TagKind::Nt);
        assert_eq!("AlineT".parse::<TagKind>().unwrap(), TagKind::Aline);
        assert_eq!("adj".parse::<TagKind>().unwrap(), TagKind::Adj);
        assert!("lc".parse::<TagKind>().is_err());
    }

    #[test]
    fn canonical_codes() {
        assert_eq!(TagKind::Nt.canonical_code(), 9);
        assert_eq!(TagKind::Aline.canonical_code(), 11);
        assert_eq!(TagKind::Adj.canonical_code(), 12);
    }

    #[test]
    fn checksum_hex_is_zero_padded() {
        let tag = EncodedTag {
            kind: TagKind::Nt,
            page_x: [0; 8],
            page_y: [0; 8],
            checksum: 0x5c_c7b3,
        };
        assert_eq!(tag.checksum_hex(), "005cc7b3");
        assert_eq!(tag.page_x_hex(), "0000000000000000");
    }
}
