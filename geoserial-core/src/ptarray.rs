//! Coordinate storage shared by every leaf geometry.
//!
//! A [`PointArray`] is a flat `f64` buffer with a fixed tuple width
//! (`2 + hasZ + hasM`). It either owns its buffer or borrows a read-only
//! view into a decoded byte buffer; the first mutation of a borrowed
//! array copies it.

use std::borrow::Cow;

use crate::error::{GeometryError, Result};
use crate::flags::Flags;

/// One coordinate with every ordinate spelled out.
///
/// Ordinates absent from the owning array read as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl Point4D {
    pub const fn new(x: f64, y: f64, z: f64, m: f64) -> Self {
        Point4D { x, y, z, m }
    }

    pub const fn xy(x: f64, y: f64) -> Self {
        Point4D::new(x, y, 0.0, 0.0)
    }

    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Point4D::new(x, y, z, 0.0)
    }

    pub const fn xym(x: f64, y: f64, m: f64) -> Self {
        Point4D::new(x, y, 0.0, m)
    }

    fn from_tuple(tuple: &[f64], has_z: bool, has_m: bool) -> Self {
        let z = if has_z { tuple[2] } else { 0.0 };
        let m = if has_m { tuple[tuple.len() - 1] } else { 0.0 };
        Point4D::new(tuple[0], tuple[1], z, m)
    }

    fn write_tuple(&self, out: &mut Vec<f64>, has_z: bool, has_m: bool) {
        out.push(self.x);
        out.push(self.y);
        if has_z {
            out.push(self.z);
        }
        if has_m {
            out.push(self.m);
        }
    }
}

/// Dimensionality-tagged coordinate buffer.
#[derive(Debug, Clone)]
pub struct PointArray<'a> {
    flags: Flags,
    data: Cow<'a, [f64]>,
}

impl PartialEq for PointArray<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.flags.zm() == other.flags.zm() && self.data == other.data
    }
}

impl<'a> PointArray<'a> {
    pub fn new(has_z: bool, has_m: bool) -> PointArray<'static> {
        PointArray::with_capacity(has_z, has_m, 0)
    }

    pub fn with_capacity(has_z: bool, has_m: bool, npoints: usize) -> PointArray<'static> {
        let flags = Flags::new(has_z, has_m, false);
        PointArray {
            flags,
            data: Cow::Owned(Vec::with_capacity(npoints * flags.ndims())),
        }
    }

    /// Build an owned array from interleaved ordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::ptarray::PointArray;
    ///
    /// let pa = PointArray::from_ordinates(true, false, vec![0.0, 0.0, 1.0, 2.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(pa.len(), 2);
    /// assert_eq!(pa.get(1).unwrap().z, 3.0);
    /// assert!(PointArray::from_ordinates(false, false, vec![1.0, 2.0, 3.0]).is_err());
    /// ```
    pub fn from_ordinates(has_z: bool, has_m: bool, ordinates: Vec<f64>) -> Result<PointArray<'static>> {
        let flags = Flags::new(has_z, has_m, false);
        if ordinates.len() % flags.ndims() != 0 {
            return Err(GeometryError::structure(format!(
                "{} ordinates do not form whole {}-D tuples",
                ordinates.len(),
                flags.ndims()
            )));
        }
        Ok(PointArray {
            flags,
            data: Cow::Owned(ordinates),
        })
    }

    /// Build an owned array from whole points, keeping only the ordinates
    /// the dimensionality calls for.
    pub fn from_points<I>(has_z: bool, has_m: bool, points: I) -> PointArray<'static>
    where
        I: IntoIterator<Item = Point4D>,
    {
        let mut pa = PointArray::new(has_z, has_m);
        let data = pa.data.to_mut();
        for p in points {
            p.write_tuple(data, has_z, has_m);
        }
        pa
    }

    /// Read-only view over ordinates owned elsewhere.
    pub fn borrowed(has_z: bool, has_m: bool, ordinates: &'a [f64]) -> Result<Self> {
        let flags = Flags::new(has_z, has_m, false).with_readonly(true);
        if ordinates.len() % flags.ndims() != 0 {
            return Err(GeometryError::structure("borrowed ordinates are not whole tuples"));
        }
        Ok(PointArray {
            flags,
            data: Cow::Borrowed(ordinates),
        })
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn has_z(&self) -> bool {
        self.flags.has_z()
    }

    pub fn has_m(&self) -> bool {
        self.flags.has_m()
    }

    pub fn ndims(&self) -> usize {
        self.flags.ndims()
    }

    /// True while the array is still a view over borrowed memory.
    pub fn is_readonly(&self) -> bool {
        self.flags.is_readonly()
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.ndims()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Interleaved ordinates.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Raw tuple `i`, `ndims` values wide.
    pub fn tuple(&self, i: usize) -> Result<&[f64]> {
        let len = self.len();
        if i >= len {
            return Err(GeometryError::IndexOutOfRange { index: i, len });
        }
        let n = self.ndims();
        Ok(&self.data[i * n..(i + 1) * n])
    }

    pub fn get(&self, i: usize) -> Result<Point4D> {
        let (z, m) = (self.has_z(), self.has_m());
        self.tuple(i).map(|t| Point4D::from_tuple(t, z, m))
    }

    pub fn first(&self) -> Option<Point4D> {
        self.get(0).ok()
    }

    pub fn last(&self) -> Option<Point4D> {
        self.len().checked_sub(1).and_then(|i| self.get(i).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = Point4D> + '_ {
        let (z, m) = (self.has_z(), self.has_m());
        self.data
            .chunks_exact(self.ndims())
            .map(move |t| Point4D::from_tuple(t, z, m))
    }

    /// Mutable access to the buffer, copying a borrowed view first.
    fn make_mut(&mut self) -> &mut Vec<f64> {
        if self.is_readonly() {
            tracing::trace!(npoints = self.len(), "promoting borrowed point array to owned");
            self.flags = self.flags.with_readonly(false);
        }
        self.data.to_mut()
    }

    pub fn set(&mut self, i: usize, pt: Point4D) -> Result<()> {
        let len = self.len();
        if i >= len {
            return Err(GeometryError::IndexOutOfRange { index: i, len });
        }
        let (n, z, m) = (self.ndims(), self.has_z(), self.has_m());
        let slot = &mut self.make_mut()[i * n..(i + 1) * n];
        slot[0] = pt.x;
        slot[1] = pt.y;
        if z {
            slot[2] = pt.z;
        }
        if m {
            slot[n - 1] = pt.m;
        }
        Ok(())
    }

    /// Append a point. With `allow_duplicate == false` a point equal to
    /// the current last point is skipped and `false` is returned.
    pub fn append_point(&mut self, pt: Point4D, allow_duplicate: bool) -> bool {
        if !allow_duplicate && self.last().is_some_and(|last| self.same_point(&last, &pt)) {
            return false;
        }
        let (z, m) = (self.has_z(), self.has_m());
        pt.write_tuple(self.make_mut(), z, m);
        true
    }

    fn same_point(&self, a: &Point4D, b: &Point4D) -> bool {
        a.x == b.x
            && a.y == b.y
            && (!self.has_z() || a.z == b.z)
            && (!self.has_m() || a.m == b.m)
    }

    /// Concatenate `other` onto a copy of `self`.
    ///
    /// When the end of `self` equals the start of `other` the shared
    /// joint is written once. With `require_join`, differing joint
    /// points are an error.
    ///
    /// # Example
    ///
    /// ```
    /// use geoserial_core::ptarray::PointArray;
    ///
    /// let a = PointArray::from_ordinates(false, false, vec![0.0, 0.0, 1.0, 1.0]).unwrap();
    /// let b = PointArray::from_ordinates(false, false, vec![1.0, 1.0, 2.0, 0.0]).unwrap();
    /// let joined = a.merge(&b, true).unwrap();
    /// assert_eq!(joined.len(), 3);
    /// ```
    pub fn merge(&self, other: &PointArray<'_>, require_join: bool) -> Result<PointArray<'static>> {
        if self.flags.zm() != other.flags.zm() {
            return Err(GeometryError::structure(
                "cannot merge point arrays of different dimensionality",
            ));
        }
        let mut skip = 0;
        if let (Some(end), Some(start)) = (self.last(), other.first()) {
            if self.same_point(&end, &start) {
                skip = 1;
            } else if require_join {
                return Err(GeometryError::structure(format!(
                    "segments do not join: ({} {}) vs ({} {})",
                    end.x, end.y, start.x, start.y
                )));
            }
        }
        let n = self.ndims();
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data[skip * n..]);
        Ok(PointArray {
            flags: self.flags.with_readonly(false),
            data: Cow::Owned(data),
        })
    }

    pub fn reverse(&mut self) {
        let n = self.ndims();
        let data = self.make_mut();
        let npoints = data.len() / n;
        for i in 0..npoints / 2 {
            let j = npoints - 1 - i;
            for k in 0..n {
                data.swap(i * n + k, j * n + k);
            }
        }
    }

    /// Rewrite every tuple for a new dimensionality. New ordinates are 0.
    pub fn force_dims(&self, has_z: bool, has_m: bool) -> PointArray<'static> {
        let mut out = PointArray::with_capacity(has_z, has_m, self.len());
        let data = out.data.to_mut();
        for p in self.iter() {
            p.write_tuple(data, has_z, has_m);
        }
        out
    }

    pub fn is_closed_2d(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(a), Some(b)) => a.x == b.x && a.y == b.y,
            _ => false,
        }
    }

    pub fn is_closed_3d(&self) -> bool {
        if !self.has_z() {
            return self.is_closed_2d();
        }
        match (self.first(), self.last()) {
            (Some(a), Some(b)) => a.x == b.x && a.y == b.y && a.z == b.z,
            _ => false,
        }
    }

    /// Closure test matching the array's own dimensionality.
    pub fn is_closed(&self) -> bool {
        self.is_closed_3d()
    }

    pub fn into_owned(self) -> PointArray<'static> {
        PointArray {
            flags: self.flags.with_readonly(false),
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}
