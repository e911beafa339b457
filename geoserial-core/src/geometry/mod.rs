//! The geometry tree.
//!
//! A [`Geometry`] is exclusively owned by its parent; dropping the root
//! releases the whole tree. Leaf coordinates may borrow from a decoded
//! buffer, hence the lifetime parameter.

mod check;
mod ops;
pub mod visit;

pub use check::CheckLevel;

use crate::bbox::BoundingBox;
use crate::error::{GeometryError, Result};
use crate::flags::Flags;
use crate::ptarray::{Point4D, PointArray};
use crate::types::GeometryType;

/// Collection-shaped types: the payload is a list of child geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    CompoundCurve,
    CurvePolygon,
    MultiCurve,
    MultiSurface,
    PolyhedralSurface,
    Tin,
}

impl CollectionKind {
    pub fn from_type(ty: GeometryType) -> Option<Self> {
        Some(match ty {
            GeometryType::MultiPoint => CollectionKind::MultiPoint,
            GeometryType::MultiLineString => CollectionKind::MultiLineString,
            GeometryType::MultiPolygon => CollectionKind::MultiPolygon,
            GeometryType::GeometryCollection => CollectionKind::GeometryCollection,
            GeometryType::CompoundCurve => CollectionKind::CompoundCurve,
            GeometryType::CurvePolygon => CollectionKind::CurvePolygon,
            GeometryType::MultiCurve => CollectionKind::MultiCurve,
            GeometryType::MultiSurface => CollectionKind::MultiSurface,
            GeometryType::PolyhedralSurface => CollectionKind::PolyhedralSurface,
            GeometryType::Tin => CollectionKind::Tin,
            GeometryType::Point
            | GeometryType::LineString
            | GeometryType::Polygon
            | GeometryType::CircularString
            | GeometryType::Triangle => return None,
        })
    }

    pub const fn geometry_type(self) -> GeometryType {
        match self {
            CollectionKind::MultiPoint => GeometryType::MultiPoint,
            CollectionKind::MultiLineString => GeometryType::MultiLineString,
            CollectionKind::MultiPolygon => GeometryType::MultiPolygon,
            CollectionKind::GeometryCollection => GeometryType::GeometryCollection,
            CollectionKind::CompoundCurve => GeometryType::CompoundCurve,
            CollectionKind::CurvePolygon => GeometryType::CurvePolygon,
            CollectionKind::MultiCurve => GeometryType::MultiCurve,
            CollectionKind::MultiSurface => GeometryType::MultiSurface,
            CollectionKind::PolyhedralSurface => GeometryType::PolyhedralSurface,
            CollectionKind::Tin => GeometryType::Tin,
        }
    }
}

/// Type-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    /// Zero (empty) or one coordinate.
    Point(PointArray<'a>),
    LineString(PointArray<'a>),
    CircularString(PointArray<'a>),
    /// A single closed four-point ring.
    Triangle(PointArray<'a>),
    /// Ring 0 is the exterior.
    Polygon(Vec<PointArray<'a>>),
    Collection(CollectionKind, Vec<Geometry<'a>>),
}

impl<'a> Shape<'a> {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Shape::Point(_) => GeometryType::Point,
            Shape::LineString(_) => GeometryType::LineString,
            Shape::CircularString(_) => GeometryType::CircularString,
            Shape::Triangle(_) => GeometryType::Triangle,
            Shape::Polygon(_) => GeometryType::Polygon,
            Shape::Collection(kind, _) => kind.geometry_type(),
        }
    }

    fn map_arrays<'b, F>(self, f: &mut F) -> Shape<'b>
    where
        F: FnMut(PointArray<'a>) -> PointArray<'b>,
    {
        match self {
            Shape::Point(pa) => Shape::Point(f(pa)),
            Shape::LineString(pa) => Shape::LineString(f(pa)),
            Shape::CircularString(pa) => Shape::CircularString(f(pa)),
            Shape::Triangle(pa) => Shape::Triangle(f(pa)),
            Shape::Polygon(rings) => Shape::Polygon(rings.into_iter().map(&mut *f).collect()),
            Shape::Collection(kind, children) => Shape::Collection(
                kind,
                children
                    .into_iter()
                    .map(|child| child.map_arrays(f))
                    .collect(),
            ),
        }
    }
}

/// A geometry node: flags, optional SRID, optional cached box, payload.
///
/// Only the root of a tree carries an SRID or a box; constructors
/// strip both from the children they adopt.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry<'a> {
    flags: Flags,
    srid: Option<i32>,
    bbox: Option<BoundingBox>,
    shape: Shape<'a>,
}

impl<'a> Geometry<'a> {
    /// Assemble a node without structural checks. Decoders use this and
    /// then validate according to the caller's [`CheckLevel`].
    pub(crate) fn from_parts(flags: Flags, srid: Option<i32>, shape: Shape<'a>) -> Self {
        Geometry {
            flags: flags.with_bbox(false).with_readonly(false),
            srid,
            bbox: None,
            shape,
        }
    }

    fn leaf(shape: Shape<'a>, pa_flags: Flags) -> Result<Self> {
        let geom = Geometry::from_parts(Flags::from_bits(pa_flags.zm()), None, shape);
        geom.check_node(CheckLevel::ALL)?;
        Ok(geom)
    }

    /// Point from a zero- or one-coordinate array.
    pub fn point(pa: PointArray<'a>) -> Result<Self> {
        let flags = pa.flags();
        Geometry::leaf(Shape::Point(pa), flags)
    }

    /// Build a non-empty point of the requested dimensionality.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    /// use geoserial_core::ptarray::Point4D;
    ///
    /// let p = Geometry::point_from(Point4D::xyz(1.0, 2.0, 3.0), true, false);
    /// assert_eq!(p.dimensionality(), 3);
    /// assert!(!p.is_empty());
    /// ```
    pub fn point_from(pt: Point4D, has_z: bool, has_m: bool) -> Geometry<'static> {
        let pa = PointArray::from_points(has_z, has_m, [pt]);
        Geometry::from_parts(Flags::new(has_z, has_m, false), None, Shape::Point(pa))
    }

    pub fn point_xy(x: f64, y: f64) -> Geometry<'static> {
        Geometry::point_from(Point4D::xy(x, y), false, false)
    }

    pub fn line_string(pa: PointArray<'a>) -> Result<Self> {
        let flags = pa.flags();
        Geometry::leaf(Shape::LineString(pa), flags)
    }

    pub fn circular_string(pa: PointArray<'a>) -> Result<Self> {
        let flags = pa.flags();
        Geometry::leaf(Shape::CircularString(pa), flags)
    }

    pub fn triangle(pa: PointArray<'a>) -> Result<Self> {
        let flags = pa.flags();
        Geometry::leaf(Shape::Triangle(pa), flags)
    }

    /// Polygon from its rings, exterior first. An empty list yields an
    /// empty XY polygon.
    pub fn polygon(rings: Vec<PointArray<'a>>) -> Result<Self> {
        let flags = rings.first().map(PointArray::flags).unwrap_or_default();
        if rings.iter().any(|r| r.flags().zm() != flags.zm()) {
            return Err(GeometryError::structure(
                "polygon rings have mixed dimensionality",
            ));
        }
        Geometry::leaf(Shape::Polygon(rings), flags)
    }

    /// Collection of `ty` holding `children`.
    ///
    /// Children must be of an allowed subtype, share one dimensionality
    /// and agree on any SRID they carry; that SRID moves to the new root.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    /// use geoserial_core::types::GeometryType;
    ///
    /// let mp = Geometry::collection(
    ///     GeometryType::MultiPoint,
    ///     vec![Geometry::point_xy(0.0, 0.0), Geometry::point_xy(1.0, 1.0)],
    /// )
    /// .unwrap();
    /// assert_eq!(mp.num_geometries(), 2);
    ///
    /// let bad = Geometry::collection(GeometryType::MultiPoint, vec![mp]);
    /// assert!(bad.is_err());
    /// ```
    pub fn collection(ty: GeometryType, mut children: Vec<Geometry<'a>>) -> Result<Self> {
        let kind = CollectionKind::from_type(ty).ok_or_else(|| {
            GeometryError::structure(format!("{ty} cannot hold child geometries"))
        })?;
        let first_flags = children.first().map(|c| c.flags).unwrap_or_default();

        let mut srid = None;
        for child in &mut children {
            if !ty.allows_subtype(child.geometry_type()) {
                return Err(GeometryError::structure(format!(
                    "{ty} cannot contain {}",
                    child.geometry_type()
                )));
            }
            if child.flags.zm() != first_flags.zm() {
                return Err(GeometryError::structure(format!(
                    "{ty} members have mixed dimensionality"
                )));
            }
            match (srid, child.srid.take()) {
                (Some(a), Some(b)) if a != b => {
                    return Err(GeometryError::structure(format!(
                        "{ty} members have mixed SRIDs {a} and {b}"
                    )));
                }
                (None, Some(b)) => srid = Some(b),
                _ => {}
            }
            child.clear_bbox();
        }

        let flags = Flags::new(
            first_flags.has_z(),
            first_flags.has_m(),
            first_flags.is_geodetic(),
        );
        let geom = Geometry::from_parts(flags, srid, Shape::Collection(kind, children));
        geom.check_node(CheckLevel::ALL)?;
        Ok(geom)
    }

    /// Empty geometry of any type.
    pub fn empty(ty: GeometryType, has_z: bool, has_m: bool) -> Geometry<'static> {
        let pa = || PointArray::new(has_z, has_m);
        let none = |kind| Shape::Collection(kind, Vec::new());
        let shape = match ty {
            GeometryType::Point => Shape::Point(pa()),
            GeometryType::LineString => Shape::LineString(pa()),
            GeometryType::CircularString => Shape::CircularString(pa()),
            GeometryType::Triangle => Shape::Triangle(pa()),
            GeometryType::Polygon => Shape::Polygon(Vec::new()),
            GeometryType::MultiPoint => none(CollectionKind::MultiPoint),
            GeometryType::MultiLineString => none(CollectionKind::MultiLineString),
            GeometryType::MultiPolygon => none(CollectionKind::MultiPolygon),
            GeometryType::GeometryCollection => none(CollectionKind::GeometryCollection),
            GeometryType::CompoundCurve => none(CollectionKind::CompoundCurve),
            GeometryType::CurvePolygon => none(CollectionKind::CurvePolygon),
            GeometryType::MultiCurve => none(CollectionKind::MultiCurve),
            GeometryType::MultiSurface => none(CollectionKind::MultiSurface),
            GeometryType::PolyhedralSurface => none(CollectionKind::PolyhedralSurface),
            GeometryType::Tin => none(CollectionKind::Tin),
        };
        Geometry::from_parts(Flags::new(has_z, has_m, false), None, shape)
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn srid(&self) -> Option<i32> {
        self.srid
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn shape(&self) -> &Shape<'a> {
        &self.shape
    }

    pub fn into_shape(self) -> Shape<'a> {
        self.shape
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.shape.geometry_type()
    }

    /// Numeric tag, as written into GSERIALIZED payloads.
    pub fn type_tag(&self) -> u32 {
        self.geometry_type().tag()
    }

    pub fn has_z(&self) -> bool {
        self.flags.has_z()
    }

    pub fn has_m(&self) -> bool {
        self.flags.has_m()
    }

    pub fn is_geodetic(&self) -> bool {
        self.flags.is_geodetic()
    }

    /// Ordinates per coordinate (2, 3 or 4).
    pub fn dimensionality(&self) -> usize {
        self.flags.ndims()
    }

    /// Coordinates of a point, line, circular string or triangle.
    pub fn points(&self) -> Option<&PointArray<'a>> {
        match &self.shape {
            Shape::Point(pa)
            | Shape::LineString(pa)
            | Shape::CircularString(pa)
            | Shape::Triangle(pa) => Some(pa),
            Shape::Polygon(_) | Shape::Collection(..) => None,
        }
    }

    pub fn rings(&self) -> Option<&[PointArray<'a>]> {
        match &self.shape {
            Shape::Polygon(rings) => Some(rings),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Geometry<'a>]> {
        match &self.shape {
            Shape::Collection(_, children) => Some(children),
            _ => None,
        }
    }

    /// Empty when there are no coordinates anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        match &self.shape {
            Shape::Point(pa)
            | Shape::LineString(pa)
            | Shape::CircularString(pa)
            | Shape::Triangle(pa) => pa.is_empty(),
            Shape::Polygon(rings) => rings.first().is_none_or(PointArray::is_empty),
            Shape::Collection(_, children) => children.iter().all(Geometry::is_empty),
        }
    }

    /// Owned copy of the whole tree.
    pub fn deep_clone(&self) -> Geometry<'static> {
        self.clone().into_owned()
    }

    pub(crate) fn set_bbox_unchecked(&mut self, bbox: Option<BoundingBox>) {
        self.flags = self.flags.with_bbox(bbox.is_some());
        self.bbox = bbox;
    }

    pub(crate) fn clear_bbox(&mut self) {
        self.set_bbox_unchecked(None);
    }

    pub(crate) fn set_srid_unchecked(&mut self, srid: Option<i32>) {
        self.srid = srid;
    }

    fn map_arrays<'b, F>(self, f: &mut F) -> Geometry<'b>
    where
        F: FnMut(PointArray<'a>) -> PointArray<'b>,
    {
        Geometry {
            flags: self.flags,
            srid: self.srid,
            bbox: self.bbox,
            shape: self.shape.map_arrays(f),
        }
    }
}
