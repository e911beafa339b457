//! Geometry type tags and their WKB / name encodings.
//!
//! Three WKB numbering schemes share the base codes 1..17:
//!   SFSQL     base code only, always 2-D
//!   ISO       base + 1000 (Z), + 2000 (M), + 3000 (ZM)
//!   Extended  base | 0x80000000 (Z) | 0x40000000 (M) | 0x20000000 (SRID)

use crate::error::{GeometryError, Result};
use crate::flags::Flags;

pub const WKB_Z_FLAG: u32 = 0x8000_0000;
pub const WKB_M_FLAG: u32 = 0x4000_0000;
pub const WKB_SRID_FLAG: u32 = 0x2000_0000;
const WKB_EXTENDED_MASK: u32 = 0xF000_0000;
const WKB_CODE_MASK: u32 = 0x0FFF_FFFF;

pub const WKB_POINT: u32 = 1;
pub const WKB_LINESTRING: u32 = 2;
pub const WKB_POLYGON: u32 = 3;
pub const WKB_MULTIPOINT: u32 = 4;
pub const WKB_MULTILINESTRING: u32 = 5;
pub const WKB_MULTIPOLYGON: u32 = 6;
pub const WKB_GEOMETRYCOLLECTION: u32 = 7;
pub const WKB_CIRCULARSTRING: u32 = 8;
pub const WKB_COMPOUNDCURVE: u32 = 9;
pub const WKB_CURVEPOLYGON: u32 = 10;
pub const WKB_MULTICURVE: u32 = 11;
pub const WKB_MULTISURFACE: u32 = 12;
/// ISO abstract `Curve`; no concrete model.
pub const WKB_CURVE: u32 = 13;
/// ISO abstract `Surface`; no concrete model.
pub const WKB_SURFACE: u32 = 14;
pub const WKB_POLYHEDRALSURFACE: u32 = 15;
pub const WKB_TIN: u32 = 16;
pub const WKB_TRIANGLE: u32 = 17;

/// Internal geometry type tag.
///
/// The discriminants are the tags written into GSERIALIZED payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 10,
    MultiCurve = 11,
    MultiSurface = 12,
    PolyhedralSurface = 13,
    Triangle = 14,
    Tin = 15,
}

impl GeometryType {
    pub const ALL: [GeometryType; 15] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
        GeometryType::CircularString,
        GeometryType::CompoundCurve,
        GeometryType::CurvePolygon,
        GeometryType::MultiCurve,
        GeometryType::MultiSurface,
        GeometryType::PolyhedralSurface,
        GeometryType::Triangle,
        GeometryType::Tin,
    ];

    pub const fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Mixed-case name, e.g. `CircularString`.
    pub const fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
            GeometryType::CircularString => "CircularString",
            GeometryType::CompoundCurve => "CompoundCurve",
            GeometryType::CurvePolygon => "CurvePolygon",
            GeometryType::MultiCurve => "MultiCurve",
            GeometryType::MultiSurface => "MultiSurface",
            GeometryType::PolyhedralSurface => "PolyhedralSurface",
            GeometryType::Triangle => "Triangle",
            GeometryType::Tin => "Tin",
        }
    }

    /// SQL/MM function-style name, e.g. `ST_CircularString`.
    pub fn st_name(self) -> String {
        format!("ST_{}", self.name())
    }

    /// Types whose payload is a list of child geometries.
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint
                | GeometryType::MultiLineString
                | GeometryType::MultiPolygon
                | GeometryType::GeometryCollection
                | GeometryType::CompoundCurve
                | GeometryType::CurvePolygon
                | GeometryType::MultiCurve
                | GeometryType::MultiSurface
                | GeometryType::PolyhedralSurface
                | GeometryType::Tin
        )
    }

    /// Types drawn with circular arcs somewhere in their closure.
    pub const fn is_curve_type(self) -> bool {
        matches!(
            self,
            GeometryType::CircularString
                | GeometryType::CompoundCurve
                | GeometryType::CurvePolygon
                | GeometryType::MultiCurve
                | GeometryType::MultiSurface
        )
    }

    /// Whether a collection of type `self` may hold a child of type `child`.
    pub const fn allows_subtype(self, child: GeometryType) -> bool {
        use GeometryType::*;
        match self {
            MultiPoint => matches!(child, Point),
            MultiLineString => matches!(child, LineString),
            MultiPolygon => matches!(child, Polygon),
            CompoundCurve => matches!(child, LineString | CircularString),
            CurvePolygon | MultiCurve => {
                matches!(child, LineString | CircularString | CompoundCurve)
            }
            MultiSurface => matches!(child, Polygon | CurvePolygon),
            PolyhedralSurface => matches!(child, Polygon),
            Tin => matches!(child, Triangle),
            GeometryCollection => true,
            Point | LineString | Polygon | CircularString | Triangle => false,
        }
    }

    /// Base WKB code shared by all three numbering schemes.
    pub const fn wkb_base_code(self) -> u32 {
        match self {
            GeometryType::Point => WKB_POINT,
            GeometryType::LineString => WKB_LINESTRING,
            GeometryType::Polygon => WKB_POLYGON,
            GeometryType::MultiPoint => WKB_MULTIPOINT,
            GeometryType::MultiLineString => WKB_MULTILINESTRING,
            GeometryType::MultiPolygon => WKB_MULTIPOLYGON,
            GeometryType::GeometryCollection => WKB_GEOMETRYCOLLECTION,
            GeometryType::CircularString => WKB_CIRCULARSTRING,
            GeometryType::CompoundCurve => WKB_COMPOUNDCURVE,
            GeometryType::CurvePolygon => WKB_CURVEPOLYGON,
            GeometryType::MultiCurve => WKB_MULTICURVE,
            GeometryType::MultiSurface => WKB_MULTISURFACE,
            GeometryType::PolyhedralSurface => WKB_POLYHEDRALSURFACE,
            GeometryType::Tin => WKB_TIN,
            GeometryType::Triangle => WKB_TRIANGLE,
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// WKB numbering scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WkbVariant {
    /// ISO SQL/MM: Z/M as thousands offsets, no SRID.
    Iso,
    /// PostGIS EWKB: Z/M/SRID as high bits.
    #[default]
    Extended,
    /// OGC simple features 1.1: 2-D only.
    Sfsql,
}

/// WKB byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Big-endian, marker byte 0.
    Xdr,
    /// Little-endian, marker byte 1.
    #[default]
    Ndr,
}

impl ByteOrder {
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Ndr
        } else {
            ByteOrder::Xdr
        }
    }

    pub const fn marker(self) -> u8 {
        match self {
            ByteOrder::Xdr => 0,
            ByteOrder::Ndr => 1,
        }
    }

    pub fn from_marker(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(ByteOrder::Xdr),
            1 => Ok(ByteOrder::Ndr),
            other => Err(GeometryError::InvalidByteOrder(other)),
        }
    }
}

/// Encode a type tag and its dimensionality as a WKB type integer.
///
/// The Extended SRID bit is not set here; the writer adds
/// [`WKB_SRID_FLAG`] on the root node when it emits an SRID.
///
/// # Example
///
/// ```
/// use geoserial_core::flags::Flags;
/// use geoserial_core::types::{wkb_type_code, GeometryType, WkbVariant};
///
/// let zm = Flags::new(true, true, false);
/// assert_eq!(wkb_type_code(GeometryType::Point, zm, WkbVariant::Iso), 3001);
/// assert_eq!(wkb_type_code(GeometryType::Point, zm, WkbVariant::Sfsql), 1);
/// assert_eq!(
///     wkb_type_code(GeometryType::Point, zm, WkbVariant::Extended),
///     0xC000_0001
/// );
/// ```
pub fn wkb_type_code(ty: GeometryType, flags: Flags, variant: WkbVariant) -> u32 {
    let base = ty.wkb_base_code();
    match variant {
        WkbVariant::Sfsql => base,
        WkbVariant::Iso => {
            let offset = match (flags.has_z(), flags.has_m()) {
                (true, true) => 3000,
                (true, false) => 1000,
                (false, true) => 2000,
                (false, false) => 0,
            };
            base + offset
        }
        WkbVariant::Extended => {
            let mut code = base;
            if flags.has_z() {
                code |= WKB_Z_FLAG;
            }
            if flags.has_m() {
                code |= WKB_M_FLAG;
            }
            code
        }
    }
}

/// Decoded WKB type integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WkbType {
    pub geometry_type: GeometryType,
    pub has_z: bool,
    pub has_m: bool,
    pub has_srid: bool,
}

/// Decode a WKB type integer from any of the three schemes.
///
/// High bits are inspected first; the remaining code is then read as
/// an ISO thousands offset plus base code.
pub fn type_from_wkb_code(code: u32) -> Result<WkbType> {
    let mut has_z = false;
    let mut has_m = false;
    let mut has_srid = false;

    if code & WKB_EXTENDED_MASK != 0 {
        has_z = code & WKB_Z_FLAG != 0;
        has_m = code & WKB_M_FLAG != 0;
        has_srid = code & WKB_SRID_FLAG != 0;
    }
    let masked = code & WKB_CODE_MASK;

    match masked / 1000 {
        0 => {}
        1 => has_z = true,
        2 => has_m = true,
        3 => {
            has_z = true;
            has_m = true;
        }
        _ => return Err(GeometryError::UnknownWkbTypeCode(code)),
    }

    let geometry_type = match masked % 1000 {
        WKB_POINT => GeometryType::Point,
        WKB_LINESTRING => GeometryType::LineString,
        WKB_POLYGON => GeometryType::Polygon,
        WKB_MULTIPOINT => GeometryType::MultiPoint,
        WKB_MULTILINESTRING => GeometryType::MultiLineString,
        WKB_MULTIPOLYGON => GeometryType::MultiPolygon,
        WKB_GEOMETRYCOLLECTION => GeometryType::GeometryCollection,
        WKB_CIRCULARSTRING => GeometryType::CircularString,
        WKB_COMPOUNDCURVE => GeometryType::CompoundCurve,
        WKB_CURVEPOLYGON => GeometryType::CurvePolygon,
        WKB_MULTICURVE => GeometryType::MultiCurve,
        WKB_MULTISURFACE => GeometryType::MultiSurface,
        WKB_CURVE | WKB_SURFACE => return Err(GeometryError::UnsupportedWkbType(code)),
        WKB_POLYHEDRALSURFACE => GeometryType::PolyhedralSurface,
        WKB_TIN => GeometryType::Tin,
        WKB_TRIANGLE => GeometryType::Triangle,
        _ => return Err(GeometryError::UnknownWkbTypeCode(code)),
    };

    Ok(WkbType {
        geometry_type,
        has_z,
        has_m,
        has_srid,
    })
}

/// Result of [`type_from_name`]. `geometry_type` is `None` for the
/// generic `GEOMETRY` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeName {
    pub geometry_type: Option<GeometryType>,
    pub has_z: bool,
    pub has_m: bool,
}

type NameEntry = (&'static str, Option<GeometryType>, bool, bool);

macro_rules! name_family {
    ($base:literal, $ty:expr) => {
        [
            (concat!($base, "ZM"), $ty, true, true),
            (concat!($base, "Z"), $ty, true, false),
            (concat!($base, "M"), $ty, false, true),
            ($base, $ty, false, false),
        ]
    };
}

/// Type names, most specific first: every entry precedes the entries
/// it is a prefix of.
static TYPE_NAMES: [[NameEntry; 4]; 16] = [
    name_family!("GEOMETRYCOLLECTION", Some(GeometryType::GeometryCollection)),
    name_family!("POLYHEDRALSURFACE", Some(GeometryType::PolyhedralSurface)),
    name_family!("MULTILINESTRING", Some(GeometryType::MultiLineString)),
    name_family!("CIRCULARSTRING", Some(GeometryType::CircularString)),
    name_family!("COMPOUNDCURVE", Some(GeometryType::CompoundCurve)),
    name_family!("CURVEPOLYGON", Some(GeometryType::CurvePolygon)),
    name_family!("MULTIPOLYGON", Some(GeometryType::MultiPolygon)),
    name_family!("MULTISURFACE", Some(GeometryType::MultiSurface)),
    name_family!("MULTIPOINT", Some(GeometryType::MultiPoint)),
    name_family!("MULTICURVE", Some(GeometryType::MultiCurve)),
    name_family!("LINESTRING", Some(GeometryType::LineString)),
    name_family!("TRIANGLE", Some(GeometryType::Triangle)),
    name_family!("GEOMETRY", None),
    name_family!("POLYGON", Some(GeometryType::Polygon)),
    name_family!("POINT", Some(GeometryType::Point)),
    name_family!("TIN", Some(GeometryType::Tin)),
];

fn type_names() -> impl Iterator<Item = &'static NameEntry> {
    TYPE_NAMES.iter().flatten()
}

/// Parse a type name such as `"POINTZ"` or `"st_multipolygon"`.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Example
///
/// ```
/// use geoserial_core::types::{type_from_name, GeometryType};
///
/// let parsed = type_from_name("  POINTZ").unwrap();
/// assert_eq!(parsed.geometry_type, Some(GeometryType::Point));
/// assert!(parsed.has_z && !parsed.has_m);
/// assert!(type_from_name("GEOMERYCOLLECTIONZM").is_err());
/// ```
pub fn type_from_name(name: &str) -> Result<TypeName> {
    let trimmed = name.trim();
    let bare = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ST_") => &trimmed[3..],
        _ => trimmed,
    };

    type_names()
        .find(|(candidate, ..)| candidate.eq_ignore_ascii_case(bare))
        .map(|&(_, geometry_type, has_z, has_m)| TypeName {
            geometry_type,
            has_z,
            has_m,
        })
        .ok_or_else(|| GeometryError::UnknownTypeName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for ty in GeometryType::ALL {
            assert_eq!(GeometryType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(GeometryType::from_tag(0), None);
        assert_eq!(GeometryType::from_tag(16), None);
    }

    #[test]
    fn name_parsing_examples() {
        let p = type_from_name("  POINTZ").unwrap();
        assert_eq!(
            p,
            TypeName {
                geometry_type: Some(GeometryType::Point),
                has_z: true,
                has_m: false
            }
        );

        let p = type_from_name("MULTIPOLYGONZM").unwrap();
        assert_eq!(p.geometry_type, Some(GeometryType::MultiPolygon));
        assert!(p.has_z && p.has_m);

        assert!(matches!(
            type_from_name("GEOMERYCOLLECTIONZM"),
            Err(GeometryError::UnknownTypeName(_))
        ));
    }

    #[test]
    fn name_parsing_is_case_insensitive_and_accepts_st_prefix() {
        let p = type_from_name("st_CircularStringM ").unwrap();
        assert_eq!(p.geometry_type, Some(GeometryType::CircularString));
        assert!(!p.has_z && p.has_m);

        let p = type_from_name("multipoint").unwrap();
        assert_eq!(p.geometry_type, Some(GeometryType::MultiPoint));

        let p = type_from_name("GEOMETRYZ").unwrap();
        assert_eq!(p.geometry_type, None);
        assert!(p.has_z);
    }

    #[test]
    fn name_table_never_shadows_a_longer_entry() {
        let names: Vec<&str> = type_names().map(|(n, ..)| *n).collect();
        for (i, earlier) in names.iter().enumerate() {
            for later in &names[i + 1..] {
                assert!(
                    !later.starts_with(earlier),
                    "{earlier} precedes the longer {later}"
                );
            }
        }
    }

    #[test]
    fn every_type_name_parses_back() {
        for ty in GeometryType::ALL {
            let upper = ty.name().to_ascii_uppercase();
            assert_eq!(type_from_name(&upper).unwrap().geometry_type, Some(ty));
            assert_eq!(type_from_name(&ty.st_name()).unwrap().geometry_type, Some(ty));
        }
    }

    #[test]
    fn wkb_codes_round_trip_in_every_scheme() {
        for ty in GeometryType::ALL {
            for (z, m) in [(false, false), (true, false), (false, true), (true, true)] {
                let flags = Flags::new(z, m, false);
                for variant in [WkbVariant::Iso, WkbVariant::Extended] {
                    let decoded = type_from_wkb_code(wkb_type_code(ty, flags, variant)).unwrap();
                    assert_eq!(decoded.geometry_type, ty);
                    assert_eq!((decoded.has_z, decoded.has_m), (z, m));
                    assert!(!decoded.has_srid);
                }
                let sfsql = type_from_wkb_code(wkb_type_code(ty, flags, WkbVariant::Sfsql)).unwrap();
                assert_eq!(sfsql.geometry_type, ty);
                assert!(!sfsql.has_z && !sfsql.has_m);
            }
        }
    }

    #[test]
    fn extended_srid_bit_is_detected() {
        let decoded = type_from_wkb_code(WKB_POLYGON | WKB_SRID_FLAG | WKB_Z_FLAG).unwrap();
        assert_eq!(decoded.geometry_type, GeometryType::Polygon);
        assert!(decoded.has_srid && decoded.has_z && !decoded.has_m);
    }

    #[test]
    fn abstract_and_unknown_codes_are_rejected() {
        assert!(matches!(
            type_from_wkb_code(WKB_CURVE),
            Err(GeometryError::UnsupportedWkbType(13))
        ));
        assert!(matches!(
            type_from_wkb_code(1014),
            Err(GeometryError::UnsupportedWkbType(1014))
        ));
        assert!(matches!(
            type_from_wkb_code(99),
            Err(GeometryError::UnknownWkbTypeCode(99))
        ));
        assert!(matches!(
            type_from_wkb_code(4001),
            Err(GeometryError::UnknownWkbTypeCode(4001))
        ));
    }

    #[test]
    fn subtype_rules() {
        use GeometryType::*;
        assert!(MultiPoint.allows_subtype(Point));
        assert!(!MultiPoint.allows_subtype(LineString));
        assert!(CompoundCurve.allows_subtype(CircularString));
        assert!(!CompoundCurve.allows_subtype(CompoundCurve));
        assert!(CurvePolygon.allows_subtype(CompoundCurve));
        assert!(MultiSurface.allows_subtype(CurvePolygon));
        assert!(Tin.allows_subtype(Triangle));
        assert!(!Tin.allows_subtype(Polygon));
        assert!(GeometryCollection.allows_subtype(GeometryCollection));
        assert!(!Point.allows_subtype(Point));
    }

    #[test]
    fn byte_order_markers() {
        assert_eq!(ByteOrder::from_marker(0).unwrap(), ByteOrder::Xdr);
        assert_eq!(ByteOrder::from_marker(1).unwrap(), ByteOrder::Ndr);
        assert!(matches!(
            ByteOrder::from_marker(7),
            Err(GeometryError::InvalidByteOrder(7))
        ));
    }
}
