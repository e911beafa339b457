//! Sample geometries shared by the integration tests.
#![allow(dead_code)]

use geoserial_core::geometry::Geometry;
use geoserial_core::ptarray::{Point4D, PointArray};
use geoserial_core::types::GeometryType;

pub const DIMS: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

/// Z and M derive from x and y so closed rings stay closed in every
/// dimensionality.
pub fn pa(has_z: bool, has_m: bool, xy: &[(f64, f64)]) -> PointArray<'static> {
    PointArray::from_points(
        has_z,
        has_m,
        xy.iter()
            .map(|&(x, y)| Point4D::new(x, y, x + y, x * y + 0.5)),
    )
}

fn square(z: bool, m: bool, x0: f64, y0: f64, size: f64) -> PointArray<'static> {
    pa(
        z,
        m,
        &[
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ],
    )
}

fn coll(ty: GeometryType, members: Vec<Geometry<'static>>) -> Geometry<'static> {
    Geometry::collection(ty, members).unwrap()
}

pub fn point(z: bool, m: bool) -> Geometry<'static> {
    Geometry::point(pa(z, m, &[(1.0, 2.0)])).unwrap()
}

pub fn line(z: bool, m: bool) -> Geometry<'static> {
    Geometry::line_string(pa(z, m, &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])).unwrap()
}

pub fn polygon(z: bool, m: bool) -> Geometry<'static> {
    Geometry::polygon(vec![square(z, m, 0.0, 0.0, 4.0), square(z, m, 1.0, 1.0, 1.0)]).unwrap()
}

pub fn arc(z: bool, m: bool) -> Geometry<'static> {
    Geometry::circular_string(pa(z, m, &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])).unwrap()
}

pub fn compound(z: bool, m: bool) -> Geometry<'static> {
    coll(
        GeometryType::CompoundCurve,
        vec![
            arc(z, m),
            Geometry::line_string(pa(z, m, &[(2.0, 0.0), (4.0, 0.0)])).unwrap(),
        ],
    )
}

pub fn curve_polygon(z: bool, m: bool) -> Geometry<'static> {
    let shell = Geometry::circular_string(pa(
        z,
        m,
        &[(0.0, 0.0), (2.0, 2.0), (4.0, 0.0), (2.0, -2.0), (0.0, 0.0)],
    ))
    .unwrap();
    let hole = Geometry::line_string(pa(
        z,
        m,
        &[(1.5, -0.5), (2.5, -0.5), (2.5, 0.5), (1.5, -0.5)],
    ))
    .unwrap();
    coll(GeometryType::CurvePolygon, vec![shell, hole])
}

pub fn triangle(z: bool, m: bool) -> Geometry<'static> {
    Geometry::triangle(pa(z, m, &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)])).unwrap()
}

/// One non-empty geometry of every type.
pub fn all_types(z: bool, m: bool) -> Vec<Geometry<'static>> {
    vec![
        point(z, m),
        line(z, m),
        polygon(z, m),
        coll(
            GeometryType::MultiPoint,
            vec![point(z, m), Geometry::point(pa(z, m, &[(5.0, 6.0)])).unwrap()],
        ),
        coll(GeometryType::MultiLineString, vec![line(z, m), line(z, m)]),
        coll(
            GeometryType::MultiPolygon,
            vec![
                polygon(z, m),
                Geometry::polygon(vec![square(z, m, 10.0, 10.0, 2.0)]).unwrap(),
            ],
        ),
        coll(
            GeometryType::GeometryCollection,
            vec![point(z, m), line(z, m), polygon(z, m), arc(z, m)],
        ),
        arc(z, m),
        compound(z, m),
        curve_polygon(z, m),
        coll(GeometryType::MultiCurve, vec![line(z, m), arc(z, m), compound(z, m)]),
        coll(GeometryType::MultiSurface, vec![polygon(z, m), curve_polygon(z, m)]),
        coll(
            GeometryType::PolyhedralSurface,
            vec![
                Geometry::polygon(vec![square(z, m, 0.0, 0.0, 1.0)]).unwrap(),
                Geometry::polygon(vec![square(z, m, 1.0, 0.0, 1.0)]).unwrap(),
            ],
        ),
        triangle(z, m),
        coll(GeometryType::Tin, vec![triangle(z, m), triangle(z, m)]),
    ]
}

/// An empty geometry of every type.
pub fn all_empty(z: bool, m: bool) -> Vec<Geometry<'static>> {
    GeometryType::ALL
        .iter()
        .map(|&ty| Geometry::empty(ty, z, m))
        .collect()
}

/// Copy into 8-byte aligned storage so zero-copy reads can borrow.
pub fn aligned(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks(8)
        .map(|chunk| {
            let mut b = [0u8; 8];
            b[..chunk.len()].copy_from_slice(chunk);
            u64::from_ne_bytes(b)
        })
        .collect()
}

pub fn as_bytes(words: &[u64], len: usize) -> &[u8] {
    // SAFETY: any u64 storage is valid to view as bytes.
    let (_, bytes, _) = unsafe { words.align_to::<u8>() };
    &bytes[..len]
}
