//! Recursive dispatch over the geometry tree.
//!
//! Every method has a default that keeps walking, so a visitor only
//! overrides the node kinds it cares about.

use crate::ptarray::PointArray;
use crate::types::GeometryType;

use super::{CollectionKind, Geometry, Shape};

pub trait Visitor<'a> {
    /// Called for every node, before its payload.
    fn visit_geometry(&mut self, geom: &Geometry<'a>) {
        walk_geometry(self, geom);
    }

    /// Called for each coordinate run: leaf arrays and polygon rings.
    /// `owner` is the type of the node holding the array.
    fn visit_point_array(&mut self, _owner: GeometryType, _points: &PointArray<'a>) {}

    fn visit_ring(&mut self, index: usize, ring: &PointArray<'a>) {
        let _ = index;
        self.visit_point_array(GeometryType::Polygon, ring);
    }

    fn visit_collection(&mut self, _kind: CollectionKind, children: &[Geometry<'a>]) {
        for child in children {
            self.visit_geometry(child);
        }
    }
}

/// Default traversal of one node's payload.
pub fn walk_geometry<'a, V>(visitor: &mut V, geom: &Geometry<'a>)
where
    V: Visitor<'a> + ?Sized,
{
    match geom.shape() {
        Shape::Point(pa)
        | Shape::LineString(pa)
        | Shape::CircularString(pa)
        | Shape::Triangle(pa) => visitor.visit_point_array(geom.geometry_type(), pa),
        Shape::Polygon(rings) => {
            for (i, ring) in rings.iter().enumerate() {
                visitor.visit_ring(i, ring);
            }
        }
        Shape::Collection(kind, children) => visitor.visit_collection(*kind, children),
    }
}

impl<'a> Geometry<'a> {
    /// Run `visitor` over this tree.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::visit::Visitor;
    /// use geoserial_core::geometry::Geometry;
    /// use geoserial_core::ptarray::PointArray;
    /// use geoserial_core::types::GeometryType;
    ///
    /// #[derive(Default)]
    /// struct Leaves(Vec<GeometryType>);
    ///
    /// impl<'a> Visitor<'a> for Leaves {
    ///     fn visit_point_array(&mut self, owner: GeometryType, _: &PointArray<'a>) {
    ///         self.0.push(owner);
    ///     }
    /// }
    ///
    /// let gc = Geometry::collection(
    ///     GeometryType::GeometryCollection,
    ///     vec![Geometry::point_xy(0.0, 0.0), Geometry::point_xy(1.0, 1.0)],
    /// )
    /// .unwrap();
    /// let mut leaves = Leaves::default();
    /// gc.accept(&mut leaves);
    /// assert_eq!(leaves.0, vec![GeometryType::Point, GeometryType::Point]);
    /// ```
    pub fn accept<V: Visitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_geometry(self);
    }
}
