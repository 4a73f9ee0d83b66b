//! CRC-30 checksums over the tag page window.
//!
//! Two engines compute the same CRC-30/CDMA value: [`Crc30`], a table-driven
//! engine parameterised by [`CrcParams`], and [`crc30_cdma`], a byte-wise
//! shift register with the parameters baked in. The encoder uses the table
//! engine through the shared [`Crc30::cdma`] instance.

use std::sync::OnceLock;

use crate::error::CrcError;
use crate::types::{PageBytes, PAGE_LEN};

/// Number of leading bytes of the page concatenation covered by the checksum.
pub const CHECKSUM_WINDOW_LEN: usize = 13;

/// Width of the stored checksum in bits.
pub const CHECKSUM_BITS: u32 = 30;

/// CRC model parameters (Rocksoft notation, non-reflected polynomial).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CrcParams {
    pub order: u32,
    pub poly: u32,
    pub init: u32,
    pub xor_out: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub refin: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub refout: bool,
}

/// CRC-30/CDMA, the checksum stored in every tag.
pub const CRC30_CDMA: CrcParams = CrcParams {
    order: 30,
    poly: 0x2030_B9C7,
    init: 0x3FFF_FFFF,
    xor_out: 0x3FFF_FFFF,
    refin: false,
    refout: false,
};

const _: () = assert!(CRC30_CDMA.is_valid());

impl CrcParams {
    /// Mask with the low `order` bits set.
    pub const fn mask(&self) -> u32 {
        if self.order >= 32 {
            u32::MAX
        } else {
            (1u32 << self.order) - 1
        }
    }

    pub const fn is_valid(&self) -> bool {
        let mask = self.mask();
        self.order >= 8
            && self.order <= 32
            && self.poly & !mask == 0
            && self.init & !mask == 0
            && self.xor_out & !mask == 0
    }

    /// Reject parameter sets the table engine cannot run.
    pub fn validate(&self) -> Result<(), CrcError> {
        if !(8..=32).contains(&self.order) {
            return Err(CrcError::Order(self.order));
        }
        let mask = self.mask();
        for (name, value) in [
            ("polynomial", self.poly),
            ("init", self.init),
            ("xor_out", self.xor_out),
        ] {
            if value & !mask != 0 {
                return Err(CrcError::ParamWidth {
                    name,
                    value,
                    order: self.order,
                });
            }
        }
        Ok(())
    }
}

/// Table-driven CRC engine.
///
/// The 256-entry table is built from the polynomial when the engine is
/// constructed and is immutable afterwards, so one engine can be shared
/// across threads.
#[derive(Clone)]
pub struct Crc30 {
    params: CrcParams,
    table: [u32; 256],
}

impl std::fmt::Debug for Crc30 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc30")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

static CDMA: OnceLock<Crc30> = OnceLock::new();

impl Crc30 {
    pub fn new(params: CrcParams) -> Result<Crc30, CrcError> {
        params.validate()?;
        Ok(Crc30::build(params))
    }

    /// Process-wide CRC-30/CDMA engine, built on first use.
    pub fn cdma() -> &'static Crc30 {
        CDMA.get_or_init(|| Crc30::build(CRC30_CDMA))
    }

    fn build(params: CrcParams) -> Crc30 {
        let mask = params.mask();
        let high_bit = 1u32 << (params.order - 1);
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = (i as u32) << (params.order - 8);
            for _ in 0..8 {
                crc = if crc & high_bit != 0 {
                    (crc << 1) ^ params.poly
                } else {
                    crc << 1
                };
            }
            *entry = crc & mask;
        }
        Crc30 { params, table }
    }

    pub fn params(&self) -> &CrcParams {
        &self.params
    }

    pub fn checksum(&self, data: &[u8]) -> u32 {
        let p = &self.params;
        let mask = p.mask();
        let top_shift = p.order - 8;

        let mut crc = p.init;
        for &byte in data {
            let byte = if p.refin { byte.reverse_bits() } else { byte };
            let idx = ((crc >> top_shift) as u8 ^ byte) as usize;
            crc = ((crc << 8) ^ self.table[idx]) & mask;
        }
        if p.refout {
            crc = crc.reverse_bits() >> (32 - p.order);
        }
        (crc ^ p.xor_out) & mask
    }
}

const CDMA_POLY: u32 = 0x2030_B9C7;
const CDMA_MASK: u32 = 0x3FFF_FFFF;

/// Byte-wise CRC-30/CDMA without a lookup table.
///
/// Each byte is XORed into bits 22-29 of the register, followed by eight
/// shift/conditional-XOR steps, masking to 30 bits after every step.
pub fn crc30_cdma(data: &[u8]) -> u32 {
    let mut crc = CDMA_MASK;
    for &byte in data {
        crc ^= (byte as u32) << 22;
        for _ in 0..8 {
            crc = if crc & 0x2000_0000 != 0 {
                (crc << 1) ^ CDMA_POLY
            } else {
                crc << 1
            };
            crc &= CDMA_MASK;
        }
    }
    (crc ^ CDMA_MASK) & CDMA_MASK
}

/// Both pages with each page's byte order reversed: `x[7]..x[0] ++ y[7]..y[0]`.
pub fn page_concat(page_x: &PageBytes, page_y: &PageBytes) -> [u8; 2 * PAGE_LEN] {
    let mut out = [0u8; 2 * PAGE_LEN];
    for (dst, src) in out[..PAGE_LEN].iter_mut().zip(page_x.iter().rev()) {
        *dst = *src;
    }
    for (dst, src) in out[PAGE_LEN..].iter_mut().zip(page_y.iter().rev()) {
        *dst = *src;
    }
    out
}

/// Page Y with the checksum bits Y34-Y63 cleared, as the checksum saw it.
pub fn clear_checksum(page_y: &PageBytes) -> PageBytes {
    (u64::from_be_bytes(*page_y) & (u64::MAX >> CHECKSUM_BITS)).to_be_bytes()
}

/// The bytes the checksum is computed over: the first 13 of [`page_concat`].
pub fn checksum_window(page_x: &PageBytes, page_y: &PageBytes) -> [u8; CHECKSUM_WINDOW_LEN] {
    let mut out = [0u8; CHECKSUM_WINDOW_LEN];
    out.copy_from_slice(&page_concat(page_x, page_y)[..CHECKSUM_WINDOW_LEN]);
    out
}
