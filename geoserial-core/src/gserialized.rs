//! GSERIALIZED: the flat, pointer-free storage form.
//!
//! Layout (all integers and doubles little-endian):
//!   [u32]        total size << 2
//!   [3 bytes]    SRID, 21-bit two's complement, -1 = unknown
//!   [u8]         flags (Z, M, BBOX, GEODETIC)
//!   [f32 * n]    optional box: xmin,xmax,ymin,ymax[,zmin,zmax][,mmin,mmax]
//!   payload      per node: [u32 type][u32 count] then doubles or children;
//!                polygons list every ring's point count, padded to 8 bytes
//!
//! Every coordinate run starts on an 8-byte boundary relative to the
//! buffer start, so an aligned buffer can be read without copying.

use crate::bbox::{self, BoundingBox};
use crate::context::Context;
use crate::cursor::{decode_f64s, view_f64s, ByteCursor, ByteSink};
use crate::error::{GeometryError, Result};
use crate::flags::{srid_to_raw, Flags};
use crate::geometry::{CollectionKind, Geometry, Shape};
use crate::ptarray::PointArray;
use crate::types::{ByteOrder, GeometryType};
use crate::MAX_NESTING;

const HEADER_SIZE: usize = 8;
const SRID_BITS: u32 = 0x1F_FFFF;
/// Largest total size the `size << 2` header can express.
const MAX_SIZE: usize = (u32::MAX >> 2) as usize;

struct Header {
    size: usize,
    raw_srid: i32,
    flags: Flags,
}

impl Header {
    fn parse(bytes: &[u8]) -> Result<Header> {
        if bytes.len() < HEADER_SIZE {
            return Err(GeometryError::InvalidSerialized("buffer shorter than header"));
        }
        let size = (u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) >> 2) as usize;
        let bits = (u32::from(bytes[4] & 0x1F) << 16) | (u32::from(bytes[5]) << 8) | u32::from(bytes[6]);
        let raw_srid = ((bits << 11) as i32) >> 11;
        Ok(Header {
            size,
            raw_srid,
            flags: Flags::from_bits(bytes[7]),
        })
    }

    fn box_size(&self) -> usize {
        if self.flags.has_bbox() {
            bbox::serialized_size(self.flags)
        } else {
            0
        }
    }

    fn payload_offset(&self) -> usize {
        HEADER_SIZE + self.box_size()
    }
}

fn write_srid(out: &mut [u8], srid: Option<i32>) {
    let bits = (srid_to_raw(srid) as u32) & SRID_BITS;
    out[0] = (bits >> 16) as u8;
    out[1] = (bits >> 8) as u8;
    out[2] = bits as u8;
}

fn truncated_payload(err: GeometryError) -> GeometryError {
    match err {
        GeometryError::TruncatedWkb { .. } => GeometryError::InvalidSerialized("payload truncated"),
        other => other,
    }
}

fn payload_size(geom: &Geometry<'_>) -> usize {
    let coords = |pa: &PointArray<'_>| pa.as_slice().len() * 8;
    match geom.shape() {
        Shape::Point(pa)
        | Shape::LineString(pa)
        | Shape::CircularString(pa)
        | Shape::Triangle(pa) => 8 + coords(pa),
        Shape::Polygon(rings) => {
            let pad = if rings.len() % 2 == 1 { 4 } else { 0 };
            8 + 4 * rings.len() + pad + rings.iter().map(coords).sum::<usize>()
        }
        Shape::Collection(_, children) => 8 + children.iter().map(payload_size).sum::<usize>(),
    }
}

fn box_to_store(ctx: &Context, geom: &Geometry<'_>) -> Result<Option<BoundingBox>> {
    match geom.bbox() {
        Some(b) => Ok(Some(*b)),
        None if ctx.auto_bbox && bbox::needs_bbox(geom) => bbox::compute(geom),
        None => Ok(None),
    }
}

fn total_size(geom: &Geometry<'_>, stored: Option<&BoundingBox>) -> usize {
    let box_size = stored.map_or(0, |_| bbox::serialized_size(geom.flags()));
    HEADER_SIZE + box_size + payload_size(geom)
}

/// Exact length [`serialize`] will produce for `geom`.
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::gserialized::{required_size, serialize};
///
/// let p = Geometry::point_xy(0.0, 0.0);
/// assert_eq!(required_size(&p), 32);
/// assert_eq!(serialize(&p).unwrap().len(), 32);
/// ```
pub fn required_size(geom: &Geometry<'_>) -> usize {
    total_size(geom, geom.bbox())
}

/// [`required_size`] under `ctx`, which may add a computed box.
pub fn required_size_with(ctx: &Context, geom: &Geometry<'_>) -> Result<usize> {
    let stored = box_to_store(ctx, geom)?;
    Ok(total_size(geom, stored.as_ref()))
}

fn write_node(sink: &mut ByteSink, geom: &Geometry<'_>) {
    tracing::trace!(geometry_type = %geom.geometry_type(), "gserialized node");
    sink.put_u32(geom.type_tag());
    match geom.shape() {
        Shape::Point(pa)
        | Shape::LineString(pa)
        | Shape::CircularString(pa)
        | Shape::Triangle(pa) => {
            sink.put_count(pa.len());
            sink.put_f64s(pa.as_slice());
        }
        Shape::Polygon(rings) => {
            sink.put_count(rings.len());
            for ring in rings {
                sink.put_count(ring.len());
            }
            if rings.len() % 2 == 1 {
                sink.put_u32(0);
            }
            for ring in rings {
                sink.put_f64s(ring.as_slice());
            }
        }
        Shape::Collection(_, children) => {
            sink.put_count(children.len());
            for child in children {
                write_node(sink, child);
            }
        }
    }
}

fn write(geom: &Geometry<'_>, stored: Option<&BoundingBox>) -> Result<Vec<u8>> {
    let expected = total_size(geom, stored);
    if expected > MAX_SIZE {
        return Err(GeometryError::InvalidSerialized("geometry exceeds the 1 GiB size limit"));
    }

    let mut sink = ByteSink::with_capacity(expected, ByteOrder::Ndr);
    sink.put_u32((expected as u32) << 2);
    let mut srid = [0u8; 3];
    write_srid(&mut srid, geom.srid());
    sink.put_bytes(&srid);
    let flags = Flags::new(geom.has_z(), geom.has_m(), geom.is_geodetic()).with_bbox(stored.is_some());
    sink.put_u8(flags.bits());
    if let Some(b) = stored {
        for v in b.to_f32_extents() {
            sink.put_f32(v);
        }
    }
    write_node(&mut sink, geom);

    assert_eq!(
        sink.len(),
        expected,
        "GSERIALIZED writer disagrees with its size computation"
    );
    tracing::debug!(
        size = expected,
        geometry_type = %geom.geometry_type(),
        with_bbox = stored.is_some(),
        "serialized geometry"
    );
    Ok(sink.into_inner())
}

/// Serialize `geom`, storing its cached box if it has one.
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::gserialized::{deserialize, serialize};
///
/// let p = Geometry::point_xy(3.0, 4.0).with_srid(4326);
/// let bytes = serialize(&p).unwrap();
/// let back = deserialize(&bytes).unwrap();
/// assert_eq!(back, p);
/// ```
pub fn serialize(geom: &Geometry<'_>) -> Result<Vec<u8>> {
    write(geom, geom.bbox())
}

pub fn serialize_with(ctx: &Context, geom: &Geometry<'_>) -> Result<Vec<u8>> {
    let stored = box_to_store(ctx, geom)?;
    write(geom, stored.as_ref())
}

fn read_points<'a>(
    cursor: &mut ByteCursor<'a>,
    npoints: usize,
    flags: Flags,
    zero_copy: bool,
) -> Result<PointArray<'a>> {
    let (z, m) = (flags.has_z(), flags.has_m());
    let bytes = cursor.take_array(npoints, flags.ndims() * 8)?;
    if zero_copy {
        if let Some(view) = view_f64s(bytes) {
            return PointArray::borrowed(z, m, view);
        }
    }
    PointArray::from_ordinates(z, m, decode_f64s(bytes, ByteOrder::Ndr))
}

fn read_node<'a>(
    cursor: &mut ByteCursor<'a>,
    flags: Flags,
    zero_copy: bool,
    depth: usize,
) -> Result<Geometry<'a>> {
    let tag = cursor.read_u32()?;
    let ty = GeometryType::from_tag(tag).ok_or(GeometryError::InvalidSerialized("unknown type tag"))?;
    let count = cursor.read_count()?;
    tracing::trace!(geometry_type = %ty, count, depth, "gserialized node");

    let shape = match ty {
        GeometryType::Point => Shape::Point(read_points(cursor, count, flags, zero_copy)?),
        GeometryType::LineString => Shape::LineString(read_points(cursor, count, flags, zero_copy)?),
        GeometryType::CircularString => {
            Shape::CircularString(read_points(cursor, count, flags, zero_copy)?)
        }
        GeometryType::Triangle => Shape::Triangle(read_points(cursor, count, flags, zero_copy)?),
        GeometryType::Polygon => {
            let mut counts = ByteCursor::new(cursor.take_array(count, 4)?, ByteOrder::Ndr);
            if count % 2 == 1 {
                cursor.take(4)?;
            }
            let mut rings = Vec::with_capacity(count);
            for _ in 0..count {
                let npoints = counts.read_count()?;
                rings.push(read_points(cursor, npoints, flags, zero_copy)?);
            }
            Shape::Polygon(rings)
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
                return Err(GeometryError::InvalidSerialized("collections nested too deeply"));
            }
            let kind = CollectionKind::from_type(ty)
                .ok_or(GeometryError::InvalidSerialized("unknown type tag"))?;
            // every member takes at least 8 bytes
            let mut children = Vec::with_capacity(count.min(cursor.remaining() / 8));
            for _ in 0..count {
                let child = read_node(cursor, flags, zero_copy, depth + 1)?;
                if !ty.allows_subtype(child.geometry_type()) {
                    return Err(GeometryError::structure(format!(
                        "{ty} cannot contain {}",
                        child.geometry_type()
                    )));
                }
                children.push(child);
            }
            Shape::Collection(kind, children)
        }
    };

    let geom = Geometry::from_parts(flags, None, shape);
    geom.check_node(crate::geometry::CheckLevel::NONE)?;
    Ok(geom)
}

/// Rebuild a geometry from its storage form, borrowing coordinates from
/// `bytes` where alignment allows.
pub fn deserialize(bytes: &[u8]) -> Result<Geometry<'_>> {
    deserialize_with(&Context::default(), bytes)
}

pub fn deserialize_with<'a>(ctx: &Context, bytes: &'a [u8]) -> Result<Geometry<'a>> {
    let header = Header::parse(bytes)?;
    if header.size != bytes.len() {
        return Err(GeometryError::SizeMismatch {
            declared: header.size,
            actual: bytes.len(),
        });
    }
    let node_flags = Flags::new(
        header.flags.has_z(),
        header.flags.has_m(),
        header.flags.is_geodetic(),
    );

    let mut cursor = ByteCursor::at(bytes, HEADER_SIZE, ByteOrder::Ndr);
    let stored = if header.flags.has_bbox() {
        let n = header.box_size() / 4;
        let mut extents = Vec::with_capacity(n);
        for _ in 0..n {
            extents.push(cursor.read_f32().map_err(truncated_payload)?);
        }
        Some(BoundingBox::from_f32_extents(node_flags, &extents)?)
    } else {
        None
    };

    let mut geom = read_node(&mut cursor, node_flags, ctx.zero_copy, 0).map_err(truncated_payload)?;
    if cursor.remaining() != 0 {
        return Err(GeometryError::InvalidSerialized("trailing bytes after payload"));
    }
    geom.set_srid_unchecked(ctx.resolve_srid(header.raw_srid)?);
    geom.set_bbox_unchecked(stored);

    tracing::debug!(
        size = bytes.len(),
        geometry_type = %geom.geometry_type(),
        srid = ?geom.srid(),
        "deserialized geometry"
    );
    Ok(geom)
}

/// SRID from the header, `None` when unknown.
pub fn peek_srid(bytes: &[u8]) -> Result<Option<i32>> {
    let header = Header::parse(bytes)?;
    Context::default().resolve_srid(header.raw_srid)
}

pub fn peek_flags(bytes: &[u8]) -> Result<Flags> {
    Ok(Header::parse(bytes)?.flags)
}

/// Root type without decoding the payload.
pub fn peek_type(bytes: &[u8]) -> Result<GeometryType> {
    let header = Header::parse(bytes)?;
    let mut cursor = ByteCursor::at(bytes, header.payload_offset(), ByteOrder::Ndr);
    let tag = cursor.read_u32().map_err(truncated_payload)?;
    GeometryType::from_tag(tag).ok_or(GeometryError::InvalidSerialized("unknown type tag"))
}

fn skip_is_empty(cursor: &mut ByteCursor<'_>, ndims: usize, depth: usize) -> Result<bool> {
    let tag = cursor.read_u32()?;
    let ty = GeometryType::from_tag(tag).ok_or(GeometryError::InvalidSerialized("unknown type tag"))?;
    let count = cursor.read_count()?;
    match ty {
        GeometryType::Point
        | GeometryType::LineString
        | GeometryType::CircularString
        | GeometryType::Triangle => {
            cursor.take_array(count, ndims * 8)?;
            Ok(count == 0)
        }
        GeometryType::Polygon => {
            let mut counts = ByteCursor::new(cursor.take_array(count, 4)?, ByteOrder::Ndr);
            if count % 2 == 1 {
                cursor.take(4)?;
            }
            let mut shell_empty = true;
            for i in 0..count {
                let npoints = counts.read_count()?;
                if i == 0 {
                    shell_empty = npoints == 0;
                }
                cursor.take_array(npoints, ndims * 8)?;
            }
            Ok(shell_empty)
        }
        _ => {
            if depth >= MAX_NESTING {
                return Err(GeometryError::InvalidSerialized("collections nested too deeply"));
            }
            let mut all_empty = true;
            for _ in 0..count {
                all_empty &= skip_is_empty(cursor, ndims, depth + 1)?;
            }
            Ok(all_empty)
        }
    }
}

/// Emptiness test that walks counts only.
pub fn peek_is_empty(bytes: &[u8]) -> Result<bool> {
    let header = Header::parse(bytes)?;
    let mut cursor = ByteCursor::at(bytes, header.payload_offset(), ByteOrder::Ndr);
    skip_is_empty(&mut cursor, header.flags.ndims(), 0).map_err(truncated_payload)
}

fn fast_box(cursor: &mut ByteCursor<'_>, flags: Flags) -> Result<Option<BoundingBox>> {
    let ty = GeometryType::from_tag(cursor.read_u32()?);
    let count = cursor.read_count()?;
    let (wrapped, expected) = match ty {
        Some(GeometryType::Point) => (false, 1),
        Some(GeometryType::LineString) => (false, 2),
        Some(GeometryType::MultiPoint) => (true, 1),
        Some(GeometryType::MultiLineString) => (true, 2),
        _ => return Ok(None),
    };
    let npoints = if wrapped {
        if count != 1 {
            return Ok(None);
        }
        cursor.read_u32()?;
        cursor.read_count()?
    } else {
        count
    };
    if npoints != expected {
        return Ok(None);
    }
    let pa = read_points(cursor, npoints, flags, false)?;
    let mut points = pa.iter();
    let Some(first) = points.next() else {
        return Ok(None);
    };
    let mut b = BoundingBox::from_point(flags, &first);
    for p in points {
        b.expand(&p);
    }
    Ok(Some(b.rounded()))
}

/// Stored box, or a box read straight off the coordinates of a point,
/// a two-point line, or their one-member multi forms. `None` means the
/// geometry has to be decoded to get its box.
pub fn peek_bbox(bytes: &[u8]) -> Result<Option<BoundingBox>> {
    let header = Header::parse(bytes)?;
    let node_flags = Flags::new(
        header.flags.has_z(),
        header.flags.has_m(),
        header.flags.is_geodetic(),
    );
    let mut cursor = ByteCursor::at(bytes, HEADER_SIZE, ByteOrder::Ndr);
    if header.flags.has_bbox() {
        let mut extents = Vec::with_capacity(header.box_size() / 4);
        for _ in 0..header.box_size() / 4 {
            extents.push(cursor.read_f32().map_err(truncated_payload)?);
        }
        return BoundingBox::from_f32_extents(node_flags, &extents).map(Some);
    }
    if header.flags.is_geodetic() {
        return Ok(None);
    }
    fast_box(&mut cursor, node_flags).map_err(truncated_payload)
}

/// Rewrite the SRID in place. Out-of-range values are stored as unknown.
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::gserialized::{peek_srid, serialize, set_srid};
///
/// let mut bytes = serialize(&Geometry::point_xy(1.0, 1.0)).unwrap();
/// set_srid(&mut bytes, 100_000).unwrap();
/// assert_eq!(peek_srid(&bytes).unwrap(), Some(100_000));
/// set_srid(&mut bytes, -3005).unwrap();
/// assert_eq!(peek_srid(&bytes).unwrap(), None);
/// ```
pub fn set_srid(bytes: &mut [u8], srid: i32) -> Result<()> {
    Header::parse(bytes)?;
    let resolved = Context::default().resolve_srid(srid)?;
    write_srid(&mut bytes[4..7], resolved);
    Ok(())
}

/// Copy of `bytes` with a freshly computed box stored.
pub fn with_bbox(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut geom = deserialize_with(&Context::default().with_zero_copy(false), bytes)?;
    geom.add_bbox()?;
    serialize(&geom)
}

/// Copy of `bytes` with any stored box removed.
pub fn without_bbox(bytes: &[u8]) -> Result<Vec<u8>> {
    let header = Header::parse(bytes)?;
    if header.size != bytes.len() {
        return Err(GeometryError::SizeMismatch {
            declared: header.size,
            actual: bytes.len(),
        });
    }
    if !header.flags.has_bbox() {
        return Ok(bytes.to_vec());
    }
    let payload = bytes
        .get(header.payload_offset()..)
        .ok_or(GeometryError::InvalidSerialized("payload truncated"))?;
    let size = HEADER_SIZE + payload.len();
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&((size as u32) << 2).to_le_bytes());
    out.extend_from_slice(&bytes[4..7]);
    out.push(header.flags.with_bbox(false).bits());
    out.extend_from_slice(payload);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ptarray::Point4D;

    fn pa(has_z: bool, coords: &[f64]) -> PointArray<'static> {
        PointArray::from_ordinates(has_z, false, coords.to_vec()).unwrap()
    }

    fn unit_square() -> PointArray<'static> {
        pa(false, &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0])
    }

    /// Copy into 8-byte aligned storage so zero-copy reads can borrow.
    fn aligned(bytes: &[u8]) -> Vec<u64> {
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut b = [0u8; 8];
            b[..chunk.len()].copy_from_slice(chunk);
            words[i] = u64::from_ne_bytes(b);
        }
        words
    }

    fn as_bytes(words: &[u64], len: usize) -> &[u8] {
        // SAFETY: reading u64 storage as bytes is always valid.
        let (_, bytes, _) = unsafe { words.align_to::<u8>() };
        &bytes[..len]
    }

    #[test]
    fn header_layout() {
        let p = Geometry::point_xy(0.0, 0.0).with_srid(4326);
        let bytes = serialize(&p).unwrap();
        assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 32 << 2);
        assert_eq!(&bytes[4..7], &[0x00, 0x10, 0xE6]);
        assert_eq!(bytes[7], 0);
        assert_eq!(u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]), 1);
    }

    #[test]
    fn reference_sizes() {
        let p3 = Geometry::point_from(Point4D::xyz(0.0, 0.0, 0.0), true, false);
        assert_eq!(required_size(&p3), 40);

        let line = Geometry::line_string(pa(false, &[0.0, 0.0, 1.0, 1.0])).unwrap();
        assert_eq!(required_size(&line), 48);

        let poly = Geometry::polygon(vec![unit_square()]).unwrap();
        assert_eq!(required_size(&poly), 104);
        assert_eq!(serialize(&poly).unwrap().len(), 104);
    }

    #[test]
    fn srid_field_keeps_zero_and_unknown_apart() {
        let zero = Geometry::point_xy(0.0, 0.0).with_srid(0);
        let unknown = Geometry::point_xy(0.0, 0.0);
        let big = Geometry::point_xy(0.0, 0.0).with_srid(100_000);
        assert_eq!(deserialize(&serialize(&zero).unwrap()).unwrap().srid(), Some(0));
        assert_eq!(deserialize(&serialize(&unknown).unwrap()).unwrap().srid(), None);
        assert_eq!(deserialize(&serialize(&big).unwrap()).unwrap().srid(), Some(100_000));
        assert_eq!(&serialize(&unknown).unwrap()[4..7], &[0x1F, 0xFF, 0xFF]);
    }

    #[test]
    fn stored_box_round_trips_rounded() {
        let mut line = Geometry::line_string(pa(true, &[0.1, 0.2, 0.3, 1.1, 1.2, 1.3, 2.0, 0.0, 5.0]))
            .unwrap();
        line.add_bbox().unwrap();
        let bytes = serialize(&line).unwrap();
        assert_eq!(bytes.len(), required_size(&line));
        assert_eq!(bytes.len(), 8 + 24 + 8 + 72);
        assert!(peek_flags(&bytes).unwrap().has_bbox());

        let back = deserialize(&bytes).unwrap();
        let stored = back.bbox().unwrap();
        let exact = line.bbox().unwrap();
        assert_eq!(stored, &exact.rounded());
        assert!(stored.xmin <= exact.xmin && stored.zmax >= exact.zmax);
        assert_eq!(peek_bbox(&bytes).unwrap().as_ref(), Some(stored));
    }

    #[test]
    fn auto_bbox_only_where_needed() {
        let ctx = Context::default().with_auto_bbox(true);
        let p = Geometry::point_xy(1.0, 2.0);
        assert_eq!(ctx.required_size(&p).unwrap(), 32);
        let poly = Geometry::polygon(vec![unit_square()]).unwrap();
        assert_eq!(ctx.required_size(&poly).unwrap(), 120);
        let bytes = ctx.serialize(&poly).unwrap();
        assert_eq!(bytes.len(), 120);
        assert!(deserialize(&bytes).unwrap().bbox().is_some());
    }

    #[test]
    fn zero_copy_borrows_aligned_input() {
        let line = Geometry::line_string(pa(false, &[0.0, 0.0, 1.0, 1.0, 2.0, 5.0])).unwrap();
        let bytes = serialize(&line).unwrap();
        let words = aligned(&bytes);
        let view = as_bytes(&words, bytes.len());

        let back = deserialize(view).unwrap();
        assert_eq!(back, line);
        if cfg!(target_endian = "little") {
            assert!(back.points().unwrap().is_readonly());
        }

        let copied = deserialize_with(&Context::default().with_zero_copy(false), view).unwrap();
        assert!(!copied.points().unwrap().is_readonly());
    }

    #[test]
    fn misaligned_input_is_copied() {
        let line = Geometry::line_string(pa(false, &[0.0, 0.0, 1.0, 1.0])).unwrap();
        let bytes = serialize(&line).unwrap();
        let words = aligned(&[&[0u8][..], &bytes[..]].concat());
        let shifted = &as_bytes(&words, bytes.len() + 1)[1..];
        let back = deserialize(shifted).unwrap();
        assert!(!back.points().unwrap().is_readonly());
        assert_eq!(back, line);
    }

    #[test]
    fn size_header_must_match() {
        let bytes = serialize(&Geometry::point_xy(0.0, 0.0)).unwrap();
        assert!(matches!(
            deserialize(&bytes[..24]),
            Err(GeometryError::SizeMismatch {
                declared: 32,
                actual: 24
            })
        ));
        assert!(matches!(
            deserialize(&bytes[..4]),
            Err(GeometryError::InvalidSerialized(_))
        ));
    }

    #[test]
    fn lying_counts_are_rejected() {
        let line = Geometry::line_string(pa(false, &[0.0, 0.0, 1.0, 1.0])).unwrap();
        let mut bytes = serialize(&line).unwrap();
        bytes[12..16].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(
            deserialize(&bytes),
            Err(GeometryError::InvalidSerialized("payload truncated"))
        ));
    }

    #[test]
    fn bad_tags_and_members_are_rejected() {
        let mut bytes = serialize(&Geometry::point_xy(0.0, 0.0)).unwrap();
        bytes[8] = 99;
        assert!(deserialize(&bytes).is_err());
        assert!(peek_type(&bytes).is_err());

        // a multipoint whose member claims to be a linestring
        let mp = Geometry::collection(GeometryType::MultiPoint, vec![Geometry::point_xy(1.0, 1.0)])
            .unwrap();
        let mut bytes = serialize(&mp).unwrap();
        bytes[16] = GeometryType::LineString.tag() as u8;
        assert!(matches!(
            deserialize(&bytes),
            Err(GeometryError::InvalidGeometryStructure(_))
        ));
    }

    #[test]
    fn peeks() {
        let gc = Geometry::collection(
            GeometryType::GeometryCollection,
            vec![
                Geometry::empty(GeometryType::Polygon, false, false),
                Geometry::empty(GeometryType::Point, false, false),
            ],
        )
        .unwrap();
        let bytes = serialize(&gc).unwrap();
        assert!(peek_is_empty(&bytes).unwrap());
        assert_eq!(peek_type(&bytes).unwrap(), GeometryType::GeometryCollection);
        assert_eq!(peek_bbox(&bytes).unwrap(), None);

        let line = Geometry::line_string(pa(false, &[3.0, 0.0, 1.0, 4.0])).unwrap();
        let bytes = serialize(&line).unwrap();
        assert!(!peek_is_empty(&bytes).unwrap());
        let b = peek_bbox(&bytes).unwrap().unwrap();
        assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (1.0, 3.0, 0.0, 4.0));

        let ml = Geometry::collection(GeometryType::MultiLineString, vec![line]).unwrap();
        let b = peek_bbox(&serialize(&ml).unwrap()).unwrap().unwrap();
        assert_eq!((b.xmin, b.ymax), (1.0, 4.0));
    }

    #[test]
    fn box_insert_and_removal() {
        let poly = Geometry::polygon(vec![unit_square()]).unwrap();
        let plain = serialize(&poly).unwrap();
        let boxed = with_bbox(&plain).unwrap();
        assert_eq!(boxed.len(), plain.len() + 16);
        assert!(peek_flags(&boxed).unwrap().has_bbox());
        assert_eq!(without_bbox(&boxed).unwrap(), plain);
        assert_eq!(without_bbox(&plain).unwrap(), plain);
    }

    #[test]
    fn geodetic_box_is_geocentric() {
        let mut line = Geometry::line_string(pa(false, &[-45.0, 0.0, 45.0, 0.0, 50.0, 10.0])).unwrap();
        line.set_geodetic(true).unwrap();
        line.add_bbox().unwrap();
        let bytes = serialize(&line).unwrap();
        assert_eq!(bytes.len(), 8 + 24 + 8 + 48);
        let back = deserialize(&bytes).unwrap();
        assert!(back.is_geodetic());
        assert!(back.bbox().unwrap().is_geodetic());
    }
}
