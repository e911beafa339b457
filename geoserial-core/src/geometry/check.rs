use std::ops::BitOr;

use crate::error::{GeometryError, Result};
use crate::ptarray::{Point4D, PointArray};

use super::{CollectionKind, Geometry, Shape};

/// Structural checks to run on decoded input.
///
/// Dimensionality and subtype rules are always enforced; these bits
/// select the optional point-count and closure checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckLevel(u8);

impl CheckLevel {
    pub const NONE: CheckLevel = CheckLevel(0);
    /// Lines need 2 points, circular strings 3, rings 4.
    pub const MIN_POINTS: CheckLevel = CheckLevel(0x01);
    /// Circular strings have an odd number of points.
    pub const ODD: CheckLevel = CheckLevel(0x02);
    /// Rings close, compound curve segments join end to start.
    pub const CLOSURE: CheckLevel = CheckLevel(0x04);
    pub const ALL: CheckLevel = CheckLevel(0x07);

    pub const fn contains(self, other: CheckLevel) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Default for CheckLevel {
    fn default() -> Self {
        CheckLevel::ALL
    }
}

impl BitOr for CheckLevel {
    type Output = CheckLevel;

    fn bitor(self, rhs: CheckLevel) -> CheckLevel {
        CheckLevel(self.0 | rhs.0)
    }
}

fn check_min_points(what: &str, pa: &PointArray<'_>, min: usize, level: CheckLevel) -> Result<()> {
    if level.contains(CheckLevel::MIN_POINTS) && !pa.is_empty() && pa.len() < min {
        return Err(GeometryError::structure(format!(
            "{what} must have at least {min} points, got {}",
            pa.len()
        )));
    }
    Ok(())
}

fn check_ring(pa: &PointArray<'_>, level: CheckLevel) -> Result<()> {
    if level.contains(CheckLevel::MIN_POINTS) && pa.len() < 4 {
        return Err(GeometryError::structure(format!(
            "polygon ring must have at least 4 points, got {}",
            pa.len()
        )));
    }
    if level.contains(CheckLevel::CLOSURE) && !pa.is_empty() && !pa.is_closed() {
        return Err(GeometryError::structure("polygon ring is not closed"));
    }
    Ok(())
}

fn first_point(geom: &Geometry<'_>) -> Option<Point4D> {
    match geom.shape() {
        Shape::Collection(_, children) => children.first().and_then(first_point),
        _ => geom.points().and_then(PointArray::first),
    }
}

fn last_point(geom: &Geometry<'_>) -> Option<Point4D> {
    match geom.shape() {
        Shape::Collection(_, children) => children.last().and_then(last_point),
        _ => geom.points().and_then(PointArray::last),
    }
}

fn same_xy(a: Option<Point4D>, b: Option<Point4D>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.x == b.x && a.y == b.y)
}

impl Geometry<'_> {
    /// Checks for this node only; children are not visited.
    pub(crate) fn check_node(&self, level: CheckLevel) -> Result<()> {
        match self.shape() {
            Shape::Point(pa) => {
                if pa.len() > 1 {
                    return Err(GeometryError::structure(format!(
                        "point holds {} coordinates",
                        pa.len()
                    )));
                }
            }
            Shape::LineString(pa) => check_min_points("linestring", pa, 2, level)?,
            Shape::CircularString(pa) => {
                check_min_points("circularstring", pa, 3, level)?;
                if level.contains(CheckLevel::ODD) && pa.len() % 2 == 0 && !pa.is_empty() {
                    return Err(GeometryError::structure(format!(
                        "circularstring must have an odd number of points, got {}",
                        pa.len()
                    )));
                }
            }
            Shape::Triangle(pa) => {
                if level.contains(CheckLevel::MIN_POINTS) && !pa.is_empty() && pa.len() != 4 {
                    return Err(GeometryError::structure(format!(
                        "triangle must have exactly 4 points, got {}",
                        pa.len()
                    )));
                }
                if level.contains(CheckLevel::CLOSURE) && !pa.is_empty() && !pa.is_closed() {
                    return Err(GeometryError::structure("triangle is not closed"));
                }
            }
            Shape::Polygon(rings) => {
                for ring in rings {
                    check_ring(ring, level)?;
                }
            }
            Shape::Collection(CollectionKind::CompoundCurve, parts) => {
                if level.contains(CheckLevel::CLOSURE) {
                    for pair in parts.windows(2) {
                        if !same_xy(last_point(&pair[0]), first_point(&pair[1])) {
                            return Err(GeometryError::structure(
                                "compound curve segments do not join",
                            ));
                        }
                    }
                }
            }
            Shape::Collection(CollectionKind::CurvePolygon, rings) => {
                if level.contains(CheckLevel::CLOSURE) {
                    for ring in rings.iter().filter(|r| !r.is_empty()) {
                        if !same_xy(first_point(ring), last_point(ring)) {
                            return Err(GeometryError::structure("curve polygon ring is not closed"));
                        }
                    }
                }
            }
            Shape::Collection(..) => {}
        }
        Ok(())
    }

    /// Validate the whole tree at `level`.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::{CheckLevel, Geometry};
    /// use geoserial_core::ptarray::PointArray;
    ///
    /// let line = Geometry::line_string(
    ///     PointArray::from_ordinates(false, false, vec![0.0, 0.0, 1.0, 1.0]).unwrap(),
    /// )
    /// .unwrap();
    /// assert!(line.validate(CheckLevel::ALL).is_ok());
    /// ```
    pub fn validate(&self, level: CheckLevel) -> Result<()> {
        self.check_node(level)?;
        if let Some(children) = self.children() {
            for child in children {
                child.validate(level)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::Flags;
    use crate::types::GeometryType;

    fn pa(coords: &[f64]) -> PointArray<'static> {
        PointArray::from_ordinates(false, false, coords.to_vec()).unwrap()
    }

    #[test]
    fn levels_combine() {
        let level = CheckLevel::MIN_POINTS | CheckLevel::ODD;
        assert!(level.contains(CheckLevel::ODD));
        assert!(!level.contains(CheckLevel::CLOSURE));
        assert!(CheckLevel::ALL.contains(level));
        assert_eq!(CheckLevel::default(), CheckLevel::ALL);
    }

    #[test]
    fn unchecked_parts_validate_per_level() {
        let even = Geometry::from_parts(
            Flags::default(),
            None,
            Shape::CircularString(pa(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 3.0, 1.0])),
        );
        assert!(even.validate(CheckLevel::NONE).is_ok());
        assert!(even.validate(CheckLevel::MIN_POINTS).is_ok());
        assert!(even.validate(CheckLevel::ODD).is_err());

        let open = Geometry::from_parts(
            Flags::default(),
            None,
            Shape::Polygon(vec![pa(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0])]),
        );
        assert!(open.validate(CheckLevel::MIN_POINTS).is_ok());
        assert!(open.validate(CheckLevel::CLOSURE).is_err());
    }

    #[test]
    fn validation_recurses_into_children() {
        let short = Geometry::from_parts(Flags::default(), None, Shape::LineString(pa(&[0.0, 0.0])));
        let ml = Geometry::from_parts(
            Flags::default(),
            None,
            Shape::Collection(CollectionKind::MultiLineString, vec![short]),
        );
        assert!(ml.validate(CheckLevel::NONE).is_ok());
        assert!(ml.validate(CheckLevel::MIN_POINTS).is_err());
    }

    #[test]
    fn curve_polygon_ring_closure_spans_segments() {
        let arc = Geometry::circular_string(pa(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0])).unwrap();
        let back = Geometry::line_string(pa(&[2.0, 0.0, 0.0, 0.0])).unwrap();
        let ring = Geometry::collection(GeometryType::CompoundCurve, vec![arc.clone(), back])
            .unwrap();
        let cp = Geometry::collection(GeometryType::CurvePolygon, vec![ring]);
        assert!(cp.is_ok());

        let open = Geometry::collection(GeometryType::CurvePolygon, vec![arc]);
        assert!(open.is_err());
    }
}
