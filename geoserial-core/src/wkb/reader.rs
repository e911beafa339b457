use crate::context::Context;
use crate::cursor::{decode_f64s, ByteCursor};
use crate::error::{GeometryError, Result};
use crate::flags::{dimensions_label, Flags};
use crate::geometry::{CheckLevel, CollectionKind, Geometry, Shape};
use crate::ptarray::PointArray;
use crate::types::{type_from_wkb_code, ByteOrder, GeometryType};
use crate::MAX_NESTING;

/// Root node header, read without touching coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WkbHeader {
    pub byte_order: ByteOrder,
    pub geometry_type: GeometryType,
    pub has_z: bool,
    pub has_m: bool,
    /// Raw SRID when the Extended SRID bit is set.
    pub srid: Option<i32>,
    /// Offset of the first payload byte.
    pub data_offset: usize,
}

fn read_header(cursor: &mut ByteCursor<'_>) -> Result<WkbHeader> {
    let byte_order = ByteOrder::from_marker(cursor.read_u8()?)?;
    cursor.set_order(byte_order);
    let ty = type_from_wkb_code(cursor.read_u32()?)?;
    let srid = if ty.has_srid {
        Some(cursor.read_i32()?)
    } else {
        None
    };
    Ok(WkbHeader {
        byte_order,
        geometry_type: ty.geometry_type,
        has_z: ty.has_z,
        has_m: ty.has_m,
        srid,
        data_offset: cursor.position(),
    })
}

/// Peek at the root header of a WKB buffer.
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::types::{ByteOrder, GeometryType, WkbVariant};
/// use geoserial_core::wkb::{peek_wkb_header, to_wkb};
///
/// let p = Geometry::point_xy(1.0, 2.0).with_srid(4326);
/// let hdr = peek_wkb_header(&to_wkb(&p, WkbVariant::Extended, ByteOrder::Ndr)).unwrap();
/// assert_eq!(hdr.geometry_type, GeometryType::Point);
/// assert_eq!(hdr.srid, Some(4326));
/// assert_eq!(hdr.data_offset, 9);
/// ```
pub fn peek_wkb_header(bytes: &[u8]) -> Result<WkbHeader> {
    read_header(&mut ByteCursor::new(bytes, ByteOrder::Ndr))
}

struct Reader<'b> {
    cursor: ByteCursor<'b>,
}

impl Reader<'_> {
    fn read_tuples(
        &mut self,
        npoints: usize,
        flags: Flags,
        order: ByteOrder,
    ) -> Result<PointArray<'static>> {
        let bytes = self.cursor.take_array(npoints, flags.ndims() * 8)?;
        PointArray::from_ordinates(flags.has_z(), flags.has_m(), decode_f64s(bytes, order))
    }

    fn read_counted(&mut self, flags: Flags, order: ByteOrder) -> Result<PointArray<'static>> {
        let npoints = self.cursor.read_count()?;
        self.read_tuples(npoints, flags, order)
    }

    fn read_rings(&mut self, flags: Flags, order: ByteOrder) -> Result<Vec<PointArray<'static>>> {
        let nrings = self.cursor.read_count()?;
        // each ring needs at least its 4-byte count
        let mut rings = Vec::with_capacity(nrings.min(self.cursor.remaining() / 4));
        for _ in 0..nrings {
            rings.push(self.read_counted(flags, order)?);
        }
        Ok(rings)
    }

    /// Decode one node. `parent` is the enclosing collection type and
    /// dimensionality, if any.
    fn read_node(
        &mut self,
        parent: Option<(GeometryType, Flags)>,
        depth: usize,
    ) -> Result<(Geometry<'static>, Option<i32>)> {
        let header = read_header(&mut self.cursor)?;
        let ty = header.geometry_type;
        let order = header.byte_order;
        let flags = Flags::new(header.has_z, header.has_m, false);
        tracing::trace!(geometry_type = %ty, ?order, depth, "wkb node");

        if let Some((parent_ty, parent_flags)) = parent {
            if !parent_ty.allows_subtype(ty) {
                return Err(GeometryError::structure(format!("{parent_ty} cannot contain {ty}")));
            }
            if parent_flags.zm() != flags.zm() {
                return Err(GeometryError::structure(format!(
                    "{parent_ty} is {} but a member is {}",
                    dimensions_label(parent_flags.has_z(), parent_flags.has_m()),
                    dimensions_label(flags.has_z(), flags.has_m())
                )));
            }
        }

        let shape = match ty {
            GeometryType::Point => {
                let pa = self.read_tuples(1, flags, order)?;
                let empty = pa.as_slice()[..2].iter().all(|v| v.is_nan());
                if empty {
                    Shape::Point(PointArray::new(flags.has_z(), flags.has_m()))
                } else {
                    Shape::Point(pa)
                }
            }
            GeometryType::LineString => Shape::LineString(self.read_counted(flags, order)?),
            GeometryType::CircularString => Shape::CircularString(self.read_counted(flags, order)?),
            GeometryType::Polygon => Shape::Polygon(self.read_rings(flags, order)?),
            GeometryType::Triangle => {
                let mut rings = self.read_rings(flags, order)?;
                if rings.len() > 1 {
                    return Err(GeometryError::structure(format!(
                        "triangle has {} rings",
                        rings.len()
                    )));
                }
                Shape::Triangle(
                    rings
                        .pop()
                        .unwrap_or_else(|| PointArray::new(flags.has_z(), flags.has_m())),
                )
            }
            GeometryType::MultiPoint
            | GeometryType::MultiLineString
            | GeometryType::MultiPolygon
            | GeometryType::GeometryCollection
            | GeometryType::CompoundCurve
            | GeometryType::CurvePolygon
            | GeometryType::MultiCurve
            | GeometryType::MultiSurface
            | GeometryType::PolyhedralSurface
            | GeometryType::Tin => {
                if depth >= MAX_NESTING {
                    return Err(GeometryError::structure("collections nested too deeply"));
                }
                let kind = CollectionKind::from_type(ty)
                    .ok_or_else(|| GeometryError::structure(format!("{ty} is not a collection")))?;
                let ngeoms = self.cursor.read_count()?;
                // smallest member is an empty node: marker, type, count
                let mut children = Vec::with_capacity(ngeoms.min(self.cursor.remaining() / 9));
                for _ in 0..ngeoms {
                    let (child, _) = self.read_node(Some((ty, flags)), depth + 1)?;
                    children.push(child);
                }
                Shape::Collection(kind, children)
            }
        };

        Ok((Geometry::from_parts(flags, None, shape), header.srid))
    }
}

/// Decode WKB in any of the three numbering schemes.
///
/// Byte-level problems (bad markers, unknown codes, truncation,
/// disallowed members) always fail; `check_level` picks which
/// structural rules are enforced on top.
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::{CheckLevel, Geometry};
/// use geoserial_core::types::{ByteOrder, WkbVariant};
/// use geoserial_core::wkb::{from_wkb, to_wkb};
///
/// let p = Geometry::point_xy(1.0, 2.0).with_srid(4326);
/// let bytes = to_wkb(&p, WkbVariant::Extended, ByteOrder::Xdr);
/// assert_eq!(from_wkb(&bytes, CheckLevel::ALL).unwrap(), p);
/// assert!(from_wkb(&bytes[..10], CheckLevel::ALL).is_err());
/// ```
pub fn from_wkb(bytes: &[u8], check_level: CheckLevel) -> Result<Geometry<'static>> {
    from_wkb_with(&Context::default().with_check_level(check_level), bytes)
}

/// [`from_wkb`] with the check level and SRID policy taken from `ctx`.
pub fn from_wkb_with(ctx: &Context, bytes: &[u8]) -> Result<Geometry<'static>> {
    let mut reader = Reader {
        cursor: ByteCursor::new(bytes, ByteOrder::Ndr),
    };
    let (mut geom, raw_srid) = reader.read_node(None, 0)?;
    if let Some(raw) = raw_srid {
        ctx.apply_srid(&mut geom, raw)?;
    }
    geom.validate(ctx.check_level)?;

    let trailing = reader.cursor.remaining();
    if trailing > 0 {
        tracing::debug!(trailing, "ignoring bytes after wkb geometry");
    }
    tracing::debug!(
        size = bytes.len() - trailing,
        geometry_type = %geom.geometry_type(),
        srid = ?geom.srid(),
        "decoded wkb"
    );
    Ok(geom)
}
