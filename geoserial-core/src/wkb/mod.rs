//! WKB wire codec.
//!
//! Wire format, per node:
//!   [u8]        byte order marker (0 = XDR big-endian, 1 = NDR little-endian)
//!   [u32]       type code in the chosen numbering scheme
//!   [i32]       SRID (Extended scheme, root node only, when known)
//!   payload     point: one coordinate tuple (NaN for EMPTY)
//!               linestring, circularstring: [u32 npoints] + tuples
//!               polygon, triangle: [u32 nrings] + per ring [u32 npoints] + tuples
//!               collections: [u32 ngeoms] + nested nodes
//!
//! Every node carries its own byte order marker, so mixed-endian input
//! is accepted on read.

mod reader;
mod writer;

pub use reader::{from_wkb, from_wkb_with, peek_wkb_header, WkbHeader};
pub use writer::{required_wkb_size, to_wkb};

use crate::error::Result;
use crate::geometry::{CheckLevel, Geometry};
use crate::types::{ByteOrder, WkbVariant};

/// Upper-case hex form of [`to_wkb`].
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::types::{ByteOrder, WkbVariant};
/// use geoserial_core::wkb::to_hex_wkb;
///
/// let hex = to_hex_wkb(&Geometry::point_xy(1.0, 2.0), WkbVariant::Iso, ByteOrder::Ndr);
/// assert_eq!(hex, "0101000000000000000000F03F0000000000000040");
/// ```
pub fn to_hex_wkb(geom: &Geometry<'_>, variant: WkbVariant, order: ByteOrder) -> String {
    hex::encode_upper(to_wkb(geom, variant, order))
}

/// Decode hex WKB in either case. Surrounding whitespace is ignored.
pub fn from_hex_wkb(text: &str, check_level: CheckLevel) -> Result<Geometry<'static>> {
    let bytes = hex::decode(text.trim())?;
    from_wkb(&bytes, check_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;

    #[test]
    fn hex_round_trip() {
        let p = Geometry::point_xy(-71.06, 42.28).with_srid(4326);
        let hex = to_hex_wkb(&p, WkbVariant::Extended, ByteOrder::Ndr);
        assert!(hex.starts_with("0101000020E6100000"));
        assert_eq!(from_hex_wkb(&hex, CheckLevel::ALL).unwrap(), p);
        assert_eq!(
            from_hex_wkb(&hex.to_lowercase(), CheckLevel::ALL).unwrap(),
            p
        );
    }

    #[test]
    fn bad_hex_is_an_error() {
        assert!(matches!(
            from_hex_wkb("01zz", CheckLevel::ALL),
            Err(GeometryError::Hex(_))
        ));
        assert!(matches!(
            from_hex_wkb("010", CheckLevel::ALL),
            Err(GeometryError::Hex(_))
        ));
    }
}
