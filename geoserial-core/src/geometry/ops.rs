//! Whole-tree accessors and rewrites.

use crate::bbox;
use crate::error::{GeometryError, Result};
use crate::flags::{clamp_srid, Flags};
use crate::ptarray::PointArray;
use crate::types::GeometryType;

use super::visit::Visitor;
use super::{CollectionKind, Geometry, Shape};

struct VertexCount(usize);

impl<'a> Visitor<'a> for VertexCount {
    fn visit_point_array(&mut self, _owner: GeometryType, points: &PointArray<'a>) {
        self.0 += points.len();
    }
}

struct Extract<'g, 'a> {
    wanted: GeometryType,
    found: Vec<&'g Geometry<'a>>,
}

impl<'g, 'a> Extract<'g, 'a> {
    fn walk(&mut self, geom: &'g Geometry<'a>) {
        if geom.geometry_type() == self.wanted {
            if !geom.is_empty() {
                self.found.push(geom);
            }
        } else if let Some(children) = geom.children() {
            for child in children {
                self.walk(child);
            }
        }
    }
}

impl<'a> Geometry<'a> {
    /// Number of coordinates anywhere in the tree.
    pub fn count_vertices(&self) -> usize {
        let mut count = VertexCount(0);
        self.accept(&mut count);
        count.0
    }

    /// Members of a collection, 1 for a non-empty single geometry, 0 for
    /// an empty one.
    pub fn num_geometries(&self) -> usize {
        match &self.shape {
            Shape::Collection(_, children) => children.len(),
            _ if self.is_empty() => 0,
            _ => 1,
        }
    }

    /// Zero-based member access. A single geometry is its own member 0.
    pub fn geometry_n(&self, n: usize) -> Result<&Geometry<'a>> {
        match &self.shape {
            Shape::Collection(_, children) => children.get(n).ok_or(GeometryError::IndexOutOfRange {
                index: n,
                len: children.len(),
            }),
            _ if n == 0 && !self.is_empty() => Ok(self),
            _ => Err(GeometryError::IndexOutOfRange {
                index: n,
                len: self.num_geometries(),
            }),
        }
    }

    /// Gather every non-empty point, line or polygon in the tree into the
    /// matching multi-geometry.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    /// use geoserial_core::types::GeometryType;
    ///
    /// let gc = Geometry::collection(
    ///     GeometryType::GeometryCollection,
    ///     vec![Geometry::point_xy(0.0, 0.0), Geometry::point_xy(1.0, 1.0)],
    /// )
    /// .unwrap();
    /// let points = gc.extract(GeometryType::Point).unwrap();
    /// assert_eq!(points.geometry_type(), GeometryType::MultiPoint);
    /// assert_eq!(points.num_geometries(), 2);
    /// ```
    pub fn extract(&self, ty: GeometryType) -> Result<Geometry<'static>> {
        let kind = match ty {
            GeometryType::Point => CollectionKind::MultiPoint,
            GeometryType::LineString => CollectionKind::MultiLineString,
            GeometryType::Polygon => CollectionKind::MultiPolygon,
            _ => {
                return Err(GeometryError::UnsupportedType(
                    "extract supports only point, linestring and polygon",
                ))
            }
        };
        let mut walker = Extract {
            wanted: ty,
            found: Vec::new(),
        };
        walker.walk(self);

        let members = walker
            .found
            .into_iter()
            .map(|g| {
                let mut member = g.deep_clone();
                member.srid = None;
                member.clear_bbox();
                member
            })
            .collect();
        let flags = Flags::new(self.has_z(), self.has_m(), self.is_geodetic());
        Ok(Geometry::from_parts(
            flags,
            self.srid,
            Shape::Collection(kind, members),
        ))
    }

    /// Copy of the tree rewritten to the given dimensionality. Dropped
    /// ordinates are discarded, added ones are zero.
    pub fn force_dims(&self, has_z: bool, has_m: bool) -> Geometry<'static> {
        let bbox = self.bbox.map(|b| b.force_dims(has_z, has_m));
        let mut out = self
            .clone()
            .map_arrays(&mut |pa: PointArray<'a>| pa.force_dims(has_z, has_m));
        out.set_zm_recursive(has_z, has_m);
        out.set_bbox_unchecked(bbox);
        out
    }

    pub fn force_2d(&self) -> Geometry<'static> {
        self.force_dims(false, false)
    }

    pub fn force_3dz(&self) -> Geometry<'static> {
        self.force_dims(true, false)
    }

    pub fn force_3dm(&self) -> Geometry<'static> {
        self.force_dims(false, true)
    }

    pub fn force_4d(&self) -> Geometry<'static> {
        self.force_dims(true, true)
    }

    fn set_zm_recursive(&mut self, has_z: bool, has_m: bool) {
        self.flags = self.flags.with_z(has_z).with_m(has_m);
        if let Shape::Collection(_, children) = &mut self.shape {
            for child in children {
                child.set_zm_recursive(has_z, has_m);
            }
        }
    }

    /// Set the SRID from a raw integer; out-of-range values become unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    ///
    /// let mut p = Geometry::point_xy(1.0, 2.0);
    /// p.set_srid(-3005);
    /// assert_eq!(p.srid(), None);
    /// p.set_srid(0);
    /// assert_eq!(p.srid(), Some(0));
    /// ```
    pub fn set_srid(&mut self, srid: i32) {
        self.srid = clamp_srid(srid);
    }

    /// Builder form of [`Geometry::set_srid`].
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.set_srid(srid);
        self
    }

    /// Compute and cache the bounding box. Empty geometries get none.
    pub fn add_bbox(&mut self) -> Result<()> {
        let computed = bbox::compute(self)?;
        self.set_bbox_unchecked(computed);
        Ok(())
    }

    pub fn drop_bbox(&mut self) {
        self.clear_bbox();
    }

    /// Recompute a cached box after coordinates changed. No-op when no
    /// box is cached.
    pub fn refresh_bbox(&mut self) -> Result<()> {
        if self.bbox.is_some() {
            self.add_bbox()?;
        }
        Ok(())
    }

    /// Mark the tree as geodetic (lon/lat degrees on the sphere) or
    /// cartesian. A cached box is recomputed in the new space.
    pub fn set_geodetic(&mut self, geodetic: bool) -> Result<()> {
        self.set_geodetic_recursive(geodetic);
        self.refresh_bbox()
    }

    fn set_geodetic_recursive(&mut self, geodetic: bool) {
        self.flags = self.flags.with_geodetic(geodetic);
        if let Shape::Collection(_, children) = &mut self.shape {
            for child in children {
                child.set_geodetic_recursive(geodetic);
            }
        }
    }

    /// Detach every coordinate array from borrowed memory.
    pub fn into_owned(self) -> Geometry<'static> {
        self.map_arrays(&mut |pa: PointArray<'a>| pa.into_owned())
    }
}
