//! Dimensionality / bbox / geodetic flag byte and SRID policy.
//!
//! Flag byte layout (`---RGBMZ`):
//!   bit 0 (0x01): Z ordinate present
//!   bit 1 (0x02): M ordinate present
//!   bit 2 (0x04): bounding box cached
//!   bit 3 (0x08): geodetic (lon/lat on the sphere)
//!   bit 4 (0x10): read-only coordinate storage

use crate::error::{GeometryError, Result};

pub const FLAG_Z: u8 = 0x01;
pub const FLAG_M: u8 = 0x02;
pub const FLAG_BBOX: u8 = 0x04;
pub const FLAG_GEODETIC: u8 = 0x08;
pub const FLAG_READONLY: u8 = 0x10;

/// Raw-integer sentinel for "no spatial reference".
pub const SRID_UNKNOWN: i32 = -1;
/// Largest SRID accepted on input.
pub const SRID_MAXIMUM: i32 = 999_999;

/// Packed geometry flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    /// Build flags from the three semantic bits callers usually know about.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::flags::Flags;
    ///
    /// let flags = Flags::new(true, false, false);
    /// assert_eq!(flags.ndims(), 3);
    /// assert!(!flags.has_bbox());
    /// ```
    pub const fn new(has_z: bool, has_m: bool, geodetic: bool) -> Self {
        let mut bits = 0;
        if has_z {
            bits |= FLAG_Z;
        }
        if has_m {
            bits |= FLAG_M;
        }
        if geodetic {
            bits |= FLAG_GEODETIC;
        }
        Flags(bits)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Flags(bits & (FLAG_Z | FLAG_M | FLAG_BBOX | FLAG_GEODETIC | FLAG_READONLY))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn has_z(self) -> bool {
        self.0 & FLAG_Z != 0
    }

    pub const fn has_m(self) -> bool {
        self.0 & FLAG_M != 0
    }

    pub const fn has_bbox(self) -> bool {
        self.0 & FLAG_BBOX != 0
    }

    pub const fn is_geodetic(self) -> bool {
        self.0 & FLAG_GEODETIC != 0
    }

    pub const fn is_readonly(self) -> bool {
        self.0 & FLAG_READONLY != 0
    }

    /// Ordinates per coordinate: `2 + hasZ + hasM`.
    pub const fn ndims(self) -> usize {
        2 + self.has_z() as usize + self.has_m() as usize
    }

    /// Z/M bits only, for uniformity checks across a tree.
    pub const fn zm(self) -> u8 {
        self.0 & (FLAG_Z | FLAG_M)
    }

    const fn with(self, bit: u8, on: bool) -> Self {
        if on {
            Flags(self.0 | bit)
        } else {
            Flags(self.0 & !bit)
        }
    }

    pub const fn with_z(self, on: bool) -> Self {
        self.with(FLAG_Z, on)
    }

    pub const fn with_m(self, on: bool) -> Self {
        self.with(FLAG_M, on)
    }

    pub const fn with_bbox(self, on: bool) -> Self {
        self.with(FLAG_BBOX, on)
    }

    pub const fn with_geodetic(self, on: bool) -> Self {
        self.with(FLAG_GEODETIC, on)
    }

    pub const fn with_readonly(self, on: bool) -> Self {
        self.with(FLAG_READONLY, on)
    }
}

/// Return the dimension label used in error messages (`XY`, `Z`, `M`, `ZM`).
pub fn dimensions_label(has_z: bool, has_m: bool) -> &'static str {
    match (has_z, has_m) {
        (true, true) => "ZM",
        (true, false) => "Z",
        (false, true) => "M",
        (false, false) => "XY",
    }
}

/// Map an arbitrary integer onto the model's SRID, degrading to unknown.
///
/// Negative values and values above [`SRID_MAXIMUM`] become `None`;
/// they are never folded into a different valid SRID.
///
/// # Example
///
/// ```
/// use geoserial_core::flags::clamp_srid;
///
/// assert_eq!(clamp_srid(4326), Some(4326));
/// assert_eq!(clamp_srid(0), Some(0));
/// assert_eq!(clamp_srid(-3005), None);
/// ```
pub fn clamp_srid(srid: i32) -> Option<i32> {
    if srid == SRID_UNKNOWN {
        return None;
    }
    if srid < 0 {
        tracing::warn!(srid, "SRID is negative, treating it as unknown");
        return None;
    }
    if srid > SRID_MAXIMUM {
        tracing::warn!(srid, max = SRID_MAXIMUM, "SRID above maximum, treating it as unknown");
        return None;
    }
    Some(srid)
}

/// Strict variant of [`clamp_srid`]: out-of-range input is an error.
pub fn check_srid(srid: i32) -> Result<Option<i32>> {
    if srid == SRID_UNKNOWN {
        Ok(None)
    } else if (0..=SRID_MAXIMUM).contains(&srid) {
        Ok(Some(srid))
    } else {
        Err(GeometryError::InvalidSrid(srid))
    }
}

/// Raw integer form of a model SRID.
pub fn srid_to_raw(srid: Option<i32>) -> i32 {
    srid.unwrap_or(SRID_UNKNOWN)
}
