//! Bridges to the georust ecosystem.
//!
//! `geo` only models linear XY geometries, so conversions refuse curves,
//! triangles, TINs, polyhedral surfaces and anything with Z or M. Text
//! formats (WKT, GeoJSON) go through `geozero` via the `geo` types.

use geozero::{ToGeo, ToJson, ToWkt};

use crate::error::{GeometryError, Result};
use crate::flags::{dimensions_label, Flags};
use crate::geometry::{CollectionKind, Geometry, Shape};
use crate::ptarray::{Point4D, PointArray};
use crate::types::GeometryType;

fn to_line_string(pa: &PointArray<'_>) -> geo::LineString<f64> {
    pa.iter().map(|p| geo::Coord { x: p.x, y: p.y }).collect()
}

fn to_polygon(rings: &[PointArray<'_>]) -> geo::Polygon<f64> {
    let mut rings = rings.iter().map(to_line_string);
    let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(Vec::new()));
    geo::Polygon::new(exterior, rings.collect())
}

fn members<T>(
    children: &[Geometry<'_>],
    pick: impl Fn(geo::Geometry<f64>) -> Option<T>,
) -> Result<Vec<T>> {
    children
        .iter()
        .map(|c| {
            c.to_geo()
                .map(&pick)?
                .ok_or(GeometryError::UnsupportedType("mismatched collection member"))
        })
        .collect()
}

fn from_coords<'c>(coords: impl Iterator<Item = &'c geo::Coord<f64>>) -> PointArray<'static> {
    PointArray::from_points(false, false, coords.map(|c| Point4D::xy(c.x, c.y)))
}

fn from_polygon(poly: &geo::Polygon<f64>) -> Result<Geometry<'static>> {
    if poly.exterior().0.is_empty() {
        return Ok(Geometry::empty(GeometryType::Polygon, false, false));
    }
    let rings = std::iter::once(poly.exterior())
        .chain(poly.interiors())
        .map(|ring| from_coords(ring.coords()))
        .collect();
    Geometry::polygon(rings)
}

impl Geometry<'_> {
    /// Convert to a `geo` geometry.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    ///
    /// let g = Geometry::point_xy(1.0, 2.0).to_geo().unwrap();
    /// assert_eq!(g, geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
    /// ```
    pub fn to_geo(&self) -> Result<geo::Geometry<f64>> {
        if !is_geo_compatible(self.flags()) {
            return Err(GeometryError::UnsupportedDimensions {
                dimensions: dimensions_label(self.has_z(), self.has_m()),
            });
        }
        Ok(match self.shape() {
            Shape::Point(pa) => {
                let p = pa
                    .first()
                    .ok_or(GeometryError::UnsupportedType("empty point"))?;
                geo::Geometry::Point(geo::Point::new(p.x, p.y))
            }
            Shape::LineString(pa) => geo::Geometry::LineString(to_line_string(pa)),
            Shape::Polygon(rings) => geo::Geometry::Polygon(to_polygon(rings)),
            Shape::Collection(CollectionKind::MultiPoint, children) => {
                geo::Geometry::MultiPoint(geo::MultiPoint::new(members(children, |g| match g {
                    geo::Geometry::Point(p) => Some(p),
                    _ => None,
                })?))
            }
            Shape::Collection(CollectionKind::MultiLineString, children) => {
                geo::Geometry::MultiLineString(geo::MultiLineString::new(members(
                    children,
                    |g| match g {
                        geo::Geometry::LineString(l) => Some(l),
                        _ => None,
                    },
                )?))
            }
            Shape::Collection(CollectionKind::MultiPolygon, children) => {
                geo::Geometry::MultiPolygon(geo::MultiPolygon::new(members(children, |g| match g {
                    geo::Geometry::Polygon(p) => Some(p),
                    _ => None,
                })?))
            }
            Shape::Collection(CollectionKind::GeometryCollection, children) => {
                geo::Geometry::GeometryCollection(geo::GeometryCollection(members(children, Some)?))
            }
            Shape::CircularString(_) | Shape::Collection(..) => {
                return Err(GeometryError::UnsupportedType("curved geometry"))
            }
            Shape::Triangle(_) => return Err(GeometryError::UnsupportedType("triangle")),
        })
    }

    /// WKT text of the XY geometry.
    pub fn to_wkt(&self) -> Result<String> {
        Ok(self.to_geo()?.to_wkt()?)
    }

    /// `SRID=n;WKT`, or plain WKT when the SRID is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    ///
    /// let p = Geometry::point_xy(1.0, 2.0).with_srid(4326);
    /// assert!(p.to_ewkt().unwrap().starts_with("SRID=4326;POINT"));
    /// ```
    pub fn to_ewkt(&self) -> Result<String> {
        let wkt = self.to_wkt()?;
        Ok(match self.srid() {
            Some(srid) => format!("SRID={srid};{wkt}"),
            None => wkt,
        })
    }

    pub fn to_geojson(&self) -> Result<String> {
        Ok(self.to_geo()?.to_json()?)
    }
}

impl Geometry<'static> {
    /// Build from a `geo` geometry. `Line`, `Rect` and `Triangle` become
    /// a two-point linestring and closed polygons respectively.
    pub fn from_geo(geom: &geo::Geometry<f64>) -> Result<Geometry<'static>> {
        let collect = |ty, items: Vec<Geometry<'static>>| Geometry::collection(ty, items);
        match geom {
            geo::Geometry::Point(p) => Ok(Geometry::point_xy(p.x(), p.y())),
            geo::Geometry::Line(l) => {
                Geometry::line_string(from_coords([l.start, l.end].iter()))
            }
            geo::Geometry::LineString(ls) => Geometry::line_string(from_coords(ls.coords())),
            geo::Geometry::Polygon(poly) => from_polygon(poly),
            geo::Geometry::Rect(r) => from_polygon(&r.to_polygon()),
            geo::Geometry::Triangle(t) => from_polygon(&t.to_polygon()),
            geo::Geometry::MultiPoint(mp) => collect(
                GeometryType::MultiPoint,
                mp.iter().map(|p| Geometry::point_xy(p.x(), p.y())).collect(),
            ),
            geo::Geometry::MultiLineString(ml) => collect(
                GeometryType::MultiLineString,
                ml.iter()
                    .map(|ls| Geometry::line_string(from_coords(ls.coords())))
                    .collect::<Result<_>>()?,
            ),
            geo::Geometry::MultiPolygon(mp) => collect(
                GeometryType::MultiPolygon,
                mp.iter().map(from_polygon).collect::<Result<_>>()?,
            ),
            geo::Geometry::GeometryCollection(gc) => collect(
                GeometryType::GeometryCollection,
                gc.iter().map(Geometry::from_geo).collect::<Result<_>>()?,
            ),
        }
    }

    /// Parse WKT through `geozero`, optionally tagging an SRID.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::geometry::Geometry;
    ///
    /// let g = Geometry::from_wkt("LINESTRING(0 0, 1 1)", Some(4326)).unwrap();
    /// assert_eq!(g.count_vertices(), 2);
    /// assert_eq!(g.srid(), Some(4326));
    /// ```
    pub fn from_wkt(wkt: &str, srid: Option<i32>) -> Result<Geometry<'static>> {
        let geom: geo::Geometry<f64> = geozero::wkt::Wkt(wkt.as_bytes()).to_geo()?;
        let mut out = Geometry::from_geo(&geom)?;
        if let Some(srid) = srid {
            out.set_srid(srid);
        }
        Ok(out)
    }

    /// Parse GeoJSON. The SRID defaults to 4326 as GeoJSON mandates.
    pub fn from_geojson(json: &str, srid: Option<i32>) -> Result<Geometry<'static>> {
        let geom: geo::Geometry<f64> = geozero::geojson::GeoJson(json).to_geo()?;
        Ok(Geometry::from_geo(&geom)?.with_srid(srid.unwrap_or(4326)))
    }
}

impl TryFrom<&Geometry<'_>> for geo::Geometry<f64> {
    type Error = GeometryError;

    fn try_from(geom: &Geometry<'_>) -> Result<Self> {
        geom.to_geo()
    }
}

impl TryFrom<&geo::Geometry<f64>> for Geometry<'static> {
    type Error = GeometryError;

    fn try_from(geom: &geo::Geometry<f64>) -> Result<Self> {
        Geometry::from_geo(geom)
    }
}

/// Whether `flags` describe coordinates `geo` can represent.
pub fn is_geo_compatible(flags: Flags) -> bool {
    !flags.has_z() && !flags.has_m()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ByteOrder, WkbVariant};
    use geozero::wkb::Ewkb;

    #[test]
    fn wkt_round_trip() {
        let wkt = "POLYGON((0 0,4 0,4 4,0 4,0 0),(1 1,2 1,2 2,1 1))";
        let g = Geometry::from_wkt(wkt, None).unwrap();
        assert_eq!(g.geometry_type(), GeometryType::Polygon);
        assert_eq!(g.rings().unwrap().len(), 2);
        let again = Geometry::from_wkt(&g.to_wkt().unwrap(), None).unwrap();
        assert_eq!(again, g);
    }

    #[test]
    fn collections_convert_both_ways() {
        let g = Geometry::from_wkt(
            "GEOMETRYCOLLECTION(POINT(1 2),MULTILINESTRING((0 0,1 1),(2 2,3 3)))",
            Some(3857),
        )
        .unwrap();
        let back = Geometry::from_geo(&g.to_geo().unwrap()).unwrap();
        assert_eq!(back.count_vertices(), 5);
        assert_eq!(back.srid(), None);
        assert_eq!(back.with_srid(3857), g);
    }

    #[test]
    fn refuses_what_geo_cannot_hold() {
        let z = Geometry::point_from(Point4D::xyz(1.0, 2.0, 3.0), true, false);
        assert!(matches!(
            z.to_geo(),
            Err(GeometryError::UnsupportedDimensions { dimensions: "Z" })
        ));
        let arc = Geometry::circular_string(
            PointArray::from_ordinates(false, false, vec![0.0, 0.0, 1.0, 1.0, 2.0, 0.0]).unwrap(),
        )
        .unwrap();
        assert!(matches!(arc.to_geo(), Err(GeometryError::UnsupportedType(_))));
        assert!(!is_geo_compatible(z.flags()));
    }

    #[test]
    fn geojson_is_structurally_sound() {
        let g = Geometry::from_wkt("LINESTRING(0 0,1 2)", None).unwrap();
        let json: serde_json::Value = serde_json::from_str(&g.to_geojson().unwrap()).unwrap();
        assert_eq!(json["type"], "LineString");
        assert_eq!(json["coordinates"][1][1], 2.0);

        let parsed = Geometry::from_geojson(r#"{"type":"Point","coordinates":[1,2]}"#, None).unwrap();
        assert_eq!(parsed.srid(), Some(4326));
    }

    #[test]
    fn geozero_reads_our_wkb() {
        let g = Geometry::from_wkt("MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((5 5,6 5,6 6,5 5)))", Some(4326))
            .unwrap();
        for order in [ByteOrder::Ndr, ByteOrder::Xdr] {
            let bytes = crate::wkb::to_wkb(&g, WkbVariant::Extended, order);
            let theirs: geo::Geometry<f64> = Ewkb(bytes.as_slice()).to_geo().unwrap();
            assert_eq!(theirs, g.to_geo().unwrap());
        }
    }
}
