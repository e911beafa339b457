//! Per-caller codec configuration.
//!
//! A [`Context`] is a small `Copy` value; each worker builds its own and
//! passes it to the codec entry points. Nothing here is global.

use crate::error::Result;
use crate::flags::{check_srid, clamp_srid};
use crate::geometry::{CheckLevel, Geometry};
use crate::types::{ByteOrder, WkbVariant};
use crate::{gserialized, wkb};

/// What to do with an SRID outside `0..=SRID_MAXIMUM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SridPolicy {
    /// Treat it as unknown and log a warning.
    #[default]
    Clamp,
    /// Fail with `InvalidSrid`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Context {
    pub wkb_variant: WkbVariant,
    pub byte_order: ByteOrder,
    pub check_level: CheckLevel,
    pub srid_policy: SridPolicy,
    /// Store a bounding box when serializing geometries that benefit
    /// from one and have none cached.
    pub auto_bbox: bool,
    /// Let deserialized coordinate arrays borrow the input buffer.
    pub zero_copy: bool,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            wkb_variant: WkbVariant::Extended,
            byte_order: ByteOrder::Ndr,
            check_level: CheckLevel::ALL,
            srid_policy: SridPolicy::Clamp,
            auto_bbox: false,
            zero_copy: true,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wkb_variant(mut self, variant: WkbVariant) -> Self {
        self.wkb_variant = variant;
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_check_level(mut self, level: CheckLevel) -> Self {
        self.check_level = level;
        self
    }

    pub fn with_srid_policy(mut self, policy: SridPolicy) -> Self {
        self.srid_policy = policy;
        self
    }

    pub fn with_auto_bbox(mut self, on: bool) -> Self {
        self.auto_bbox = on;
        self
    }

    pub fn with_zero_copy(mut self, on: bool) -> Self {
        self.zero_copy = on;
        self
    }

    /// Map a raw SRID through this context's policy.
    pub fn resolve_srid(&self, raw: i32) -> Result<Option<i32>> {
        match self.srid_policy {
            SridPolicy::Clamp => Ok(clamp_srid(raw)),
            SridPolicy::Reject => check_srid(raw),
        }
    }

    /// Set `geom`'s SRID from a raw integer under this context's policy.
    pub fn apply_srid(&self, geom: &mut Geometry<'_>, raw: i32) -> Result<()> {
        let srid = self.resolve_srid(raw)?;
        geom.set_srid_unchecked(srid);
        Ok(())
    }

    pub fn required_size(&self, geom: &Geometry<'_>) -> Result<usize> {
        gserialized::required_size_with(self, geom)
    }

    pub fn serialize(&self, geom: &Geometry<'_>) -> Result<Vec<u8>> {
        gserialized::serialize_with(self, geom)
    }

    pub fn deserialize<'a>(&self, bytes: &'a [u8]) -> Result<Geometry<'a>> {
        gserialized::deserialize_with(self, bytes)
    }

    /// WKB in this context's default variant and byte order.
    pub fn to_wkb(&self, geom: &Geometry<'_>) -> Vec<u8> {
        wkb::to_wkb(geom, self.wkb_variant, self.byte_order)
    }

    pub fn from_wkb(&self, bytes: &[u8]) -> Result<Geometry<'static>> {
        wkb::from_wkb_with(self, bytes)
    }
}
