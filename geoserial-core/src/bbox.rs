//! Axis-aligned bounding boxes.
//!
//! Cartesian boxes cover the dimensions the geometry has (2 to 4).
//! Geodetic geometries get a box in geocentric unit-sphere XYZ instead,
//! whatever their Z/M flags say.

use crate::error::{GeometryError, Result};
use crate::flags::Flags;
use crate::geometry::{Geometry, Shape};
use crate::ptarray::{Point4D, PointArray};
use crate::types::GeometryType;

const FP_TOLERANCE: f64 = 1e-12;

fn fp_equals(a: f64, b: f64) -> bool {
    (a - b).abs() <= FP_TOLERANCE
}

/// Per-axis extents.
///
/// For a geodetic box `x`/`y`/`z` are geocentric and `m` is unused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    flags: Flags,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub mmin: f64,
    pub mmax: f64,
}

/// Bytes the stored box occupies for a geometry with `flags`.
///
/// # Example
///
/// ```
/// use geoserial_core::bbox::serialized_size;
/// use geoserial_core::flags::Flags;
///
/// assert_eq!(serialized_size(Flags::new(false, false, false)), 16);
/// assert_eq!(serialized_size(Flags::new(true, true, false)), 32);
/// assert_eq!(serialized_size(Flags::new(true, true, true)), 24);
/// ```
pub fn serialized_size(flags: Flags) -> usize {
    if flags.is_geodetic() {
        6 * 4
    } else {
        2 * flags.ndims() * 4
    }
}

/// Largest `f32` not above `d`.
pub fn next_float_down(d: f64) -> f32 {
    let f = d as f32;
    if f64::from(f) > d {
        f.next_down()
    } else {
        f
    }
}

/// Smallest `f32` not below `d`.
pub fn next_float_up(d: f64) -> f32 {
    let f = d as f32;
    if f64::from(f) < d {
        f.next_up()
    } else {
        f
    }
}

impl BoundingBox {
    /// Degenerate box around one point.
    pub fn from_point(flags: Flags, p: &Point4D) -> Self {
        BoundingBox {
            flags: Self::box_flags(flags),
            xmin: p.x,
            xmax: p.x,
            ymin: p.y,
            ymax: p.y,
            zmin: p.z,
            zmax: p.z,
            mmin: p.m,
            mmax: p.m,
        }
    }

    fn box_flags(flags: Flags) -> Flags {
        if flags.is_geodetic() {
            Flags::new(false, false, true)
        } else {
            Flags::new(flags.has_z(), flags.has_m(), false)
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn is_geodetic(&self) -> bool {
        self.flags.is_geodetic()
    }

    fn has_z_axis(&self) -> bool {
        self.flags.has_z() || self.flags.is_geodetic()
    }

    fn has_m_axis(&self) -> bool {
        self.flags.has_m() && !self.flags.is_geodetic()
    }

    /// Grow to include `p`.
    pub fn expand(&mut self, p: &Point4D) {
        self.xmin = self.xmin.min(p.x);
        self.xmax = self.xmax.max(p.x);
        self.ymin = self.ymin.min(p.y);
        self.ymax = self.ymax.max(p.y);
        self.zmin = self.zmin.min(p.z);
        self.zmax = self.zmax.max(p.z);
        self.mmin = self.mmin.min(p.m);
        self.mmax = self.mmax.max(p.m);
    }

    /// Smallest box covering both.
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            flags: self.flags,
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
            zmin: self.zmin.min(other.zmin),
            zmax: self.zmax.max(other.zmax),
            mmin: self.mmin.min(other.mmin),
            mmax: self.mmax.max(other.mmax),
        }
    }

    pub fn contains_point(&self, p: &Point4D) -> bool {
        let xy = self.xmin <= p.x && p.x <= self.xmax && self.ymin <= p.y && p.y <= self.ymax;
        let z = !self.has_z_axis() || (self.zmin <= p.z && p.z <= self.zmax);
        let m = !self.has_m_axis() || (self.mmin <= p.m && p.m <= self.mmax);
        xy && z && m
    }

    /// Intersection test over the axes both boxes carry.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if self.xmax < other.xmin
            || other.xmax < self.xmin
            || self.ymax < other.ymin
            || other.ymax < self.ymin
        {
            return false;
        }
        if self.has_z_axis()
            && other.has_z_axis()
            && (self.zmax < other.zmin || other.zmax < self.zmin)
        {
            return false;
        }
        if self.has_m_axis()
            && other.has_m_axis()
            && (self.mmax < other.mmin || other.mmax < self.mmin)
        {
            return false;
        }
        true
    }

    /// Same box for a re-dimensioned geometry. New axes span `[0, 0]`.
    pub fn force_dims(&self, has_z: bool, has_m: bool) -> BoundingBox {
        if self.is_geodetic() {
            return *self;
        }
        let mut out = *self;
        out.flags = Flags::new(has_z, has_m, false);
        if !self.flags.has_z() {
            out.zmin = 0.0;
            out.zmax = 0.0;
        }
        if !self.flags.has_m() {
            out.mmin = 0.0;
            out.mmax = 0.0;
        }
        out
    }

    /// Bytes this box takes in storage.
    pub fn serialized_size(&self) -> usize {
        serialized_size(self.flags)
    }

    /// Widen each extent to the enclosing `f32` values, in storage order
    /// `xmin,xmax,ymin,ymax[,zmin,zmax][,mmin,mmax]`.
    pub fn to_f32_extents(&self) -> Vec<f32> {
        let mut out = vec![
            next_float_down(self.xmin),
            next_float_up(self.xmax),
            next_float_down(self.ymin),
            next_float_up(self.ymax),
        ];
        if self.has_z_axis() {
            out.push(next_float_down(self.zmin));
            out.push(next_float_up(self.zmax));
        }
        if self.has_m_axis() {
            out.push(next_float_down(self.mmin));
            out.push(next_float_up(self.mmax));
        }
        out
    }

    /// Rebuild from stored `f32` extents for a geometry with `flags`.
    pub fn from_f32_extents(flags: Flags, extents: &[f32]) -> Result<BoundingBox> {
        let mut out = BoundingBox::from_point(flags, &Point4D::default());
        if extents.len() * 4 != out.serialized_size() {
            return Err(GeometryError::InvalidSerialized("bounding box has the wrong width"));
        }
        let mut it = extents.iter().map(|v| f64::from(*v));
        let mut pair = || (it.next().unwrap_or(0.0), it.next().unwrap_or(0.0));
        (out.xmin, out.xmax) = pair();
        (out.ymin, out.ymax) = pair();
        if out.has_z_axis() {
            (out.zmin, out.zmax) = pair();
        }
        if out.has_m_axis() {
            (out.mmin, out.mmax) = pair();
        }
        Ok(out)
    }

    /// Copy whose extents are exactly representable as `f32`, i.e. what
    /// a storage round trip yields.
    pub fn rounded(&self) -> BoundingBox {
        BoundingBox::from_f32_extents(self.flags, &self.to_f32_extents()).unwrap_or(*self)
    }
}

fn ptarray_box(flags: Flags, pa: &PointArray<'_>) -> Option<BoundingBox> {
    let mut points = pa.iter();
    let mut bbox = BoundingBox::from_point(flags, &points.next()?);
    for p in points {
        bbox.expand(&p);
    }
    Some(bbox)
}

/// Box of one circular arc `p1 -> p2 -> p3`, including the circle's
/// axis-aligned extremes the arc passes through.
fn arc_box(flags: Flags, p1: &Point4D, p2: &Point4D, p3: &Point4D) -> BoundingBox {
    let mut bbox = BoundingBox::from_point(flags, p1);
    bbox.expand(p2);
    bbox.expand(p3);

    let full_circle = p1.x == p3.x && p1.y == p3.y;
    let (cx, cy) = if full_circle {
        ((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0)
    } else {
        let (ax, ay) = (p1.x - p3.x, p1.y - p3.y);
        let (bx, by) = (p2.x - p3.x, p2.y - p3.y);
        let det = 2.0 * (ax * by - ay * bx);
        if det.abs() < FP_TOLERANCE {
            // collinear: the arc is a segment
            return bbox;
        }
        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;
        (
            p3.x + (by * a2 - ay * b2) / det,
            p3.y + (ax * b2 - bx * a2) / det,
        )
    };
    let r = ((p1.x - cx).powi(2) + (p1.y - cy).powi(2)).sqrt();

    // Side of chord p1-p3 the arc bulges to.
    let side = |x: f64, y: f64| (p3.x - p1.x) * (y - p1.y) - (p3.y - p1.y) * (x - p1.x);
    let bulge = side(p2.x, p2.y).signum();

    for (ex, ey) in [(cx + r, cy), (cx - r, cy), (cx, cy + r), (cx, cy - r)] {
        if full_circle || side(ex, ey).signum() == bulge {
            bbox.xmin = bbox.xmin.min(ex);
            bbox.xmax = bbox.xmax.max(ex);
            bbox.ymin = bbox.ymin.min(ey);
            bbox.ymax = bbox.ymax.max(ey);
        }
    }
    bbox
}

fn circstring_box(flags: Flags, pa: &PointArray<'_>) -> Option<BoundingBox> {
    let points: Vec<Point4D> = pa.iter().collect();
    if points.len() < 3 {
        return ptarray_box(flags, pa);
    }
    points
        .windows(3)
        .step_by(2)
        .map(|w| arc_box(flags, &w[0], &w[1], &w[2]))
        .reduce(|a, b| a.merge(&b))
}

fn merge_opt(acc: Option<BoundingBox>, next: Option<BoundingBox>) -> Option<BoundingBox> {
    match (acc, next) {
        (Some(a), Some(b)) => Some(a.merge(&b)),
        (a, b) => a.or(b),
    }
}

fn cartesian(geom: &Geometry<'_>) -> Option<BoundingBox> {
    let flags = geom.flags();
    match geom.shape() {
        Shape::Point(pa) | Shape::LineString(pa) | Shape::Triangle(pa) => ptarray_box(flags, pa),
        Shape::CircularString(pa) => circstring_box(flags, pa),
        // holes lie inside the shell
        Shape::Polygon(rings) => rings.first().and_then(|shell| ptarray_box(flags, shell)),
        Shape::Collection(_, children) => children.iter().map(cartesian).fold(None, merge_opt),
    }
}

/// Lon/lat degrees to a point on the unit sphere.
pub fn ll2cart(lon: f64, lat: f64) -> (f64, f64, f64) {
    let (x_rad, y_rad) = (lon.to_radians(), lat.to_radians());
    let cos_y = y_rad.cos();
    (cos_y * x_rad.cos(), cos_y * x_rad.sin(), y_rad.sin())
}

type Vec3 = (f64, f64, f64);

fn dot(a: Vec3, b: Vec3) -> f64 {
    a.0 * b.0 + a.1 * b.1 + a.2 * b.2
}

fn unit_normal(a: Vec3, b: Vec3) -> Vec3 {
    let n = (
        a.1 * b.2 - a.2 * b.1,
        a.2 * b.0 - a.0 * b.2,
        a.0 * b.1 - a.1 * b.0,
    );
    let len = dot(n, n).sqrt();
    if len == 0.0 {
        n
    } else {
        (n.0 / len, n.1 / len, n.2 / len)
    }
}

fn segment_side(p1: (f64, f64), p2: (f64, f64), q: (f64, f64)) -> i8 {
    let side = (q.0 - p1.0) * (p2.1 - p1.1) - (p2.0 - p1.0) * (q.1 - p1.1);
    if side > 0.0 {
        1
    } else if side < 0.0 {
        -1
    } else {
        0
    }
}

fn geocentric_box(p: Vec3) -> BoundingBox {
    BoundingBox::from_point(
        Flags::new(false, false, true),
        &Point4D::new(p.0, p.1, p.2, 0.0),
    )
}

/// Geocentric box of the great-circle edge `a1 -> a2`.
fn edge_box(a1: Vec3, a2: Vec3) -> Result<BoundingBox> {
    let mut bbox = geocentric_box(a1);
    bbox.expand(&Point4D::new(a2.0, a2.1, a2.2, 0.0));

    if fp_equals(a1.0, a2.0) && fp_equals(a1.1, a2.1) && fp_equals(a1.2, a2.2) {
        return Ok(bbox);
    }
    if fp_equals(a1.0, -a2.0) && fp_equals(a1.1, -a2.1) && fp_equals(a1.2, -a2.2) {
        return Err(GeometryError::AntipodalEdge);
    }

    // Project into the plane of the great circle: R1 = a1, A3 orthogonal.
    let an = unit_normal(a1, a2);
    let a3 = unit_normal(an, a1);
    let r1 = (1.0, 0.0);
    let r2 = (dot(a2, a1), dot(a2, a3));
    let o_side = segment_side(r1, r2, (0.0, 0.0));

    let axes = [
        (1.0, 0.0, 0.0),
        (-1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, -1.0, 0.0),
        (0.0, 0.0, 1.0),
        (0.0, 0.0, -1.0),
    ];
    for axis in axes {
        let (mut rx, mut ry) = (dot(axis, a1), dot(axis, a3));
        let len = (rx * rx + ry * ry).sqrt();
        if len > 0.0 {
            rx /= len;
            ry /= len;
        }
        if segment_side(r1, r2, (rx, ry)) != o_side {
            let xn = Point4D::new(
                rx * a1.0 + ry * a3.0,
                rx * a1.1 + ry * a3.1,
                rx * a1.2 + ry * a3.2,
                0.0,
            );
            bbox.expand(&xn);
        }
    }
    Ok(bbox)
}

fn ptarray_geodetic(pa: &PointArray<'_>) -> Result<Option<BoundingBox>> {
    let mut points = pa.iter().map(|p| ll2cart(p.x, p.y));
    let Some(mut a1) = points.next() else {
        return Ok(None);
    };
    let mut bbox = geocentric_box(a1);
    for a2 in points {
        bbox = bbox.merge(&edge_box(a1, a2)?);
        a1 = a2;
    }
    Ok(Some(bbox))
}

/// Snap extents to +/-1 where the polygon encloses an axis pole.
fn check_poles(b: &mut BoundingBox) {
    fn straddles(min: f64, max: f64) -> bool {
        min < 0.0 && max > 0.0
    }
    fn snap(min: &mut f64, max: &mut f64) {
        if *min > 0.0 && *max > 0.0 {
            *max = 1.0;
        } else if *min < 0.0 && *max < 0.0 {
            *min = -1.0;
        } else {
            *min = -1.0;
            *max = 1.0;
        }
    }
    if straddles(b.xmin, b.xmax) && straddles(b.ymin, b.ymax) {
        snap(&mut b.zmin, &mut b.zmax);
    }
    if straddles(b.xmin, b.xmax) && straddles(b.zmin, b.zmax) {
        snap(&mut b.ymin, &mut b.ymax);
    }
    if straddles(b.ymin, b.ymax) && straddles(b.zmin, b.zmax) {
        snap(&mut b.xmin, &mut b.xmax);
    }
}

fn geodetic(geom: &Geometry<'_>) -> Result<Option<BoundingBox>> {
    match geom.shape() {
        Shape::Point(pa)
        | Shape::LineString(pa)
        | Shape::CircularString(pa)
        | Shape::Triangle(pa) => ptarray_geodetic(pa),
        Shape::Polygon(rings) => {
            let mut acc = None;
            for ring in rings {
                acc = merge_opt(acc, ptarray_geodetic(ring)?);
            }
            if let Some(b) = acc.as_mut() {
                check_poles(b);
            }
            Ok(acc)
        }
        Shape::Collection(_, children) => {
            let mut acc = None;
            for child in children {
                acc = merge_opt(acc, geodetic(child)?);
            }
            Ok(acc)
        }
    }
}

/// Compute the box of `geom`; `None` for an empty geometry.
///
/// # Example
///
/// ```
/// use geoserial_core::bbox::compute;
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::ptarray::PointArray;
///
/// let arc = Geometry::circular_string(
///     PointArray::from_ordinates(false, false, vec![0.0, 0.0, 1.0, 1.0, 2.0, 0.0]).unwrap(),
/// )
/// .unwrap();
/// let b = compute(&arc).unwrap().unwrap();
/// assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (0.0, 2.0, 0.0, 1.0));
/// ```
pub fn compute(geom: &Geometry<'_>) -> Result<Option<BoundingBox>> {
    if geom.is_empty() {
        return Ok(None);
    }
    if geom.is_geodetic() {
        geodetic(geom)
    } else {
        Ok(cartesian(geom))
    }
}

/// Whether caching a box is worthwhile: a box never beats reading the
/// coordinates of a point, a two-point line, or their one-member
/// multi forms.
pub fn needs_bbox(geom: &Geometry<'_>) -> bool {
    match geom.geometry_type() {
        GeometryType::Point => false,
        GeometryType::LineString => geom.count_vertices() > 2,
        GeometryType::MultiPoint => geom.num_geometries() != 1,
        GeometryType::MultiLineString => {
            geom.num_geometries() != 1 || geom.count_vertices() > 2
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(coords: &[f64]) -> PointArray<'static> {
        PointArray::from_ordinates(false, false, coords.to_vec()).unwrap()
    }

    #[test]
    fn serialized_sizes_follow_dims() {
        let base = Flags::new(false, false, false);
        assert_eq!(serialized_size(base), 16);
        assert_eq!(serialized_size(base.with_bbox(true)), 16);
        assert_eq!(serialized_size(base.with_bbox(true).with_z(true)), 24);
        assert_eq!(serialized_size(base.with_bbox(true).with_z(true).with_m(true)), 32);
        assert_eq!(
            serialized_size(base.with_z(true).with_m(true).with_geodetic(true)),
            24
        );
    }

    #[test]
    fn float_rounding_brackets_the_double() {
        let d = 0.1_f64;
        assert!(f64::from(next_float_down(d)) <= d);
        assert!(f64::from(next_float_up(d)) >= d);
        assert!(next_float_down(d) < next_float_up(d));
        assert_eq!(next_float_down(1.0), 1.0);
        assert_eq!(next_float_up(1.0), 1.0);
    }

    #[test]
    fn line_box_and_polygon_shell() {
        let l = Geometry::line_string(xy(&[3.0, -1.0, -2.0, 4.0, 0.0, 0.0])).unwrap();
        let b = compute(&l).unwrap().unwrap();
        assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (-2.0, 3.0, -1.0, 4.0));

        let poly = Geometry::polygon(vec![
            xy(&[0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 4.0, 0.0, 0.0, 0.0]),
            xy(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0]),
        ])
        .unwrap();
        let b = compute(&poly).unwrap().unwrap();
        assert_eq!((b.xmin, b.xmax), (0.0, 4.0));
    }

    #[test]
    fn zm_extents_are_tracked() {
        let pa = PointArray::from_ordinates(true, true, vec![0.0, 0.0, 5.0, -1.0, 1.0, 1.0, 2.0, 7.0])
            .unwrap();
        let l = Geometry::line_string(pa).unwrap();
        let b = compute(&l).unwrap().unwrap();
        assert_eq!((b.zmin, b.zmax, b.mmin, b.mmax), (2.0, 5.0, -1.0, 7.0));
        assert_eq!(b.serialized_size(), 32);
        assert_eq!(b.to_f32_extents().len(), 8);
    }

    #[test]
    fn empty_geometry_has_no_box() {
        let e = Geometry::empty(GeometryType::MultiPolygon, false, false);
        assert!(compute(&e).unwrap().is_none());
    }

    #[test]
    fn arc_boxes() {
        let full = arc_box(
            Flags::default(),
            &Point4D::xy(0.0, 0.0),
            &Point4D::xy(2.0, 0.0),
            &Point4D::xy(0.0, 0.0),
        );
        assert_eq!((full.xmin, full.xmax, full.ymin, full.ymax), (0.0, 2.0, -1.0, 1.0));

        let collinear = arc_box(
            Flags::default(),
            &Point4D::xy(0.0, 0.0),
            &Point4D::xy(1.0, 1.0),
            &Point4D::xy(2.0, 2.0),
        );
        assert_eq!((collinear.xmax, collinear.ymax), (2.0, 2.0));

        // lower half-circle through (1,-1)
        let lower = arc_box(
            Flags::default(),
            &Point4D::xy(0.0, 0.0),
            &Point4D::xy(1.0, -1.0),
            &Point4D::xy(2.0, 0.0),
        );
        assert!((lower.ymin + 1.0).abs() < 1e-12);
        assert_eq!(lower.ymax, 0.0);
    }

    #[test]
    fn collection_box_merges_members() {
        let gc = Geometry::collection(
            GeometryType::GeometryCollection,
            vec![
                Geometry::point_xy(-5.0, 1.0),
                Geometry::empty(GeometryType::LineString, false, false),
                Geometry::point_xy(3.0, 9.0),
            ],
        )
        .unwrap();
        let b = compute(&gc).unwrap().unwrap();
        assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (-5.0, 3.0, 1.0, 9.0));
        assert!(b.contains_point(&Point4D::xy(0.0, 5.0)));
        assert!(!b.contains_point(&Point4D::xy(4.0, 5.0)));
    }

    #[test]
    fn geodetic_edge_reaches_axis_extreme() {
        let mut l = Geometry::line_string(xy(&[-45.0, 0.0, 45.0, 0.0])).unwrap();
        l.set_geodetic(true).unwrap();
        let b = compute(&l).unwrap().unwrap();
        assert!(b.is_geodetic());
        assert!((b.xmax - 1.0).abs() < 1e-9);
        assert!((b.xmin - 45f64.to_radians().cos()).abs() < 1e-9);
        assert!(b.zmin.abs() < 1e-9 && b.zmax.abs() < 1e-9);
        assert_eq!(b.serialized_size(), 24);
    }

    #[test]
    fn geodetic_antipodal_edge_fails() {
        let mut l = Geometry::line_string(xy(&[0.0, 0.0, 180.0, 0.0])).unwrap();
        l.set_geodetic(true).unwrap();
        assert!(matches!(compute(&l), Err(GeometryError::AntipodalEdge)));
    }

    #[test]
    fn overlap_checks_shared_axes() {
        let a = BoundingBox::from_point(Flags::default(), &Point4D::xy(0.0, 0.0))
            .merge(&BoundingBox::from_point(Flags::default(), &Point4D::xy(2.0, 2.0)));
        let b = BoundingBox::from_point(Flags::default(), &Point4D::xy(1.0, 1.0))
            .merge(&BoundingBox::from_point(Flags::default(), &Point4D::xy(3.0, 3.0)));
        let c = BoundingBox::from_point(Flags::default(), &Point4D::xy(5.0, 5.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn needs_bbox_skips_trivial_shapes() {
        assert!(!needs_bbox(&Geometry::point_xy(0.0, 0.0)));
        let two = Geometry::line_string(xy(&[0.0, 0.0, 1.0, 1.0])).unwrap();
        let three = Geometry::line_string(xy(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0])).unwrap();
        assert!(!needs_bbox(&two));
        assert!(needs_bbox(&three));
        let ml = Geometry::collection(GeometryType::MultiLineString, vec![two.clone()]).unwrap();
        assert!(!needs_bbox(&ml));
        let ml2 = Geometry::collection(GeometryType::MultiLineString, vec![two.clone(), two]).unwrap();
        assert!(needs_bbox(&ml2));
        let mp = Geometry::collection(GeometryType::MultiPoint, vec![Geometry::point_xy(1.0, 1.0)])
            .unwrap();
        assert!(!needs_bbox(&mp));
    }

    #[test]
    fn rounded_box_still_bounds() {
        let l = Geometry::line_string(xy(&[0.1, 0.2, 0.3, 0.7])).unwrap();
        let exact = compute(&l).unwrap().unwrap();
        let r = exact.rounded();
        assert!(r.xmin <= exact.xmin && r.xmax >= exact.xmax);
        assert!(r.ymin <= exact.ymin && r.ymax >= exact.ymax);
    }
}
