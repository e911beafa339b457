use crate::cursor::ByteSink;
use crate::flags::Flags;
use crate::geometry::{Geometry, Shape};
use crate::ptarray::PointArray;
use crate::types::{wkb_type_code, ByteOrder, WkbVariant, WKB_SRID_FLAG};

/// Output dimensionality: SFSQL is always XY.
fn output_flags(geom: &Geometry<'_>, variant: WkbVariant) -> Flags {
    match variant {
        WkbVariant::Sfsql => Flags::new(false, false, false),
        WkbVariant::Iso | WkbVariant::Extended => Flags::new(geom.has_z(), geom.has_m(), false),
    }
}

fn writes_srid(geom: &Geometry<'_>, variant: WkbVariant) -> bool {
    variant == WkbVariant::Extended && geom.srid().is_some()
}

fn node_size(geom: &Geometry<'_>, ndims: usize) -> usize {
    let tuples = |pa: &PointArray<'_>| pa.len() * ndims * 8;
    let payload = match geom.shape() {
        Shape::Point(_) => ndims * 8,
        Shape::LineString(pa) | Shape::CircularString(pa) => 4 + tuples(pa),
        Shape::Triangle(pa) if pa.is_empty() => 4,
        Shape::Triangle(pa) => 4 + 4 + tuples(pa),
        Shape::Polygon(rings) => 4 + rings.iter().map(|r| 4 + tuples(r)).sum::<usize>(),
        Shape::Collection(_, children) => {
            4 + children.iter().map(|c| node_size(c, ndims)).sum::<usize>()
        }
    };
    1 + 4 + payload
}

/// Exact length of [`to_wkb`]'s output for `geom` in `variant`. Byte
/// order does not affect it.
pub fn required_wkb_size(geom: &Geometry<'_>, variant: WkbVariant) -> usize {
    let srid = if writes_srid(geom, variant) { 4 } else { 0 };
    srid + node_size(geom, output_flags(geom, variant).ndims())
}

struct Writer {
    sink: ByteSink,
    order: ByteOrder,
    variant: WkbVariant,
    flags: Flags,
}

impl Writer {
    fn put_tuples(&mut self, pa: &PointArray<'_>) {
        let out = self.flags.ndims();
        if pa.ndims() == out {
            self.sink.put_f64s(pa.as_slice());
            return;
        }
        // only SFSQL drops ordinates; x and y lead every tuple
        for tuple in pa.as_slice().chunks_exact(pa.ndims()) {
            self.sink.put_f64s(&tuple[..out]);
        }
    }

    fn put_counted(&mut self, pa: &PointArray<'_>) {
        self.sink.put_count(pa.len());
        self.put_tuples(pa);
    }

    fn write_node(&mut self, geom: &Geometry<'_>, srid: Option<i32>) {
        tracing::trace!(geometry_type = %geom.geometry_type(), "wkb node");
        self.sink.put_u8(self.order.marker());
        let mut code = wkb_type_code(geom.geometry_type(), self.flags, self.variant);
        if srid.is_some() {
            code |= WKB_SRID_FLAG;
        }
        self.sink.put_u32(code);
        if let Some(srid) = srid {
            self.sink.put_i32(srid);
        }

        match geom.shape() {
            Shape::Point(pa) if pa.is_empty() => {
                for _ in 0..self.flags.ndims() {
                    self.sink.put_f64(f64::NAN);
                }
            }
            Shape::Point(pa) => self.put_tuples(pa),
            Shape::LineString(pa) | Shape::CircularString(pa) => self.put_counted(pa),
            Shape::Triangle(pa) => {
                if pa.is_empty() {
                    self.sink.put_count(0);
                } else {
                    self.sink.put_count(1);
                    self.put_counted(pa);
                }
            }
            Shape::Polygon(rings) => {
                self.sink.put_count(rings.len());
                for ring in rings {
                    self.put_counted(ring);
                }
            }
            Shape::Collection(_, children) => {
                self.sink.put_count(children.len());
                for child in children {
                    self.write_node(child, None);
                }
            }
        }
    }
}

/// Encode `geom` as WKB.
///
/// Only the Extended variant writes an SRID, and only on the root node.
///
/// # Example
///
/// ```
/// use geoserial_core::geometry::Geometry;
/// use geoserial_core::types::{ByteOrder, WkbVariant};
/// use geoserial_core::wkb::{required_wkb_size, to_wkb};
///
/// let p = Geometry::point_xy(1.0, 2.0).with_srid(4326);
/// let ewkb = to_wkb(&p, WkbVariant::Extended, ByteOrder::Xdr);
/// assert_eq!(&ewkb[..5], &[0x00, 0x20, 0x00, 0x00, 0x01]);
/// assert_eq!(ewkb.len(), required_wkb_size(&p, WkbVariant::Extended));
/// assert_eq!(to_wkb(&p, WkbVariant::Iso, ByteOrder::Ndr).len(), 21);
/// ```
pub fn to_wkb(geom: &Geometry<'_>, variant: WkbVariant, order: ByteOrder) -> Vec<u8> {
    let expected = required_wkb_size(geom, variant);
    let mut writer = Writer {
        sink: ByteSink::with_capacity(expected, order),
        order,
        variant,
        flags: output_flags(geom, variant),
    };
    let srid = if writes_srid(geom, variant) {
        geom.srid()
    } else {
        None
    };
    writer.write_node(geom, srid);

    assert_eq!(
        writer.sink.len(),
        expected,
        "WKB writer disagrees with its size computation"
    );
    tracing::debug!(
        size = expected,
        geometry_type = %geom.geometry_type(),
        ?variant,
        ?order,
        "encoded wkb"
    );
    writer.sink.into_inner()
}
