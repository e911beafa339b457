//! Bounds-checked byte reader and endian-aware writer shared by the codecs.

use crate::error::{GeometryError, Result};
use crate::types::ByteOrder;

/// Forward-only reader over a byte slice. Every read checks the
/// remaining length first and fails with [`GeometryError::TruncatedWkb`].
#[derive(Debug, Clone)]
pub(crate) struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        ByteCursor { buf, pos: 0, order }
    }

    pub(crate) fn at(buf: &'a [u8], pos: usize, order: ByteOrder) -> Self {
        ByteCursor { buf, pos, order }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub(crate) fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(GeometryError::TruncatedWkb {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Bytes for `count` items of `width` bytes, with overflow treated as
    /// truncation.
    pub(crate) fn take_array(&mut self, count: usize, width: usize) -> Result<&'a [u8]> {
        let n = count.checked_mul(width).ok_or(GeometryError::TruncatedWkb {
            offset: self.pos,
            needed: usize::MAX,
            available: self.remaining(),
        })?;
        self.take(n)
    }

    fn take_n<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_n::<1>()?[0])
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let b = self.take_n::<4>()?;
        Ok(match self.order {
            ByteOrder::Ndr => u32::from_le_bytes(b),
            ByteOrder::Xdr => u32::from_be_bytes(b),
        })
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        let b = self.take_n::<4>()?;
        Ok(match self.order {
            ByteOrder::Ndr => i32::from_le_bytes(b),
            ByteOrder::Xdr => i32::from_be_bytes(b),
        })
    }

    /// A count field, as `usize`.
    pub(crate) fn read_count(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        let b = self.take_n::<4>()?;
        Ok(match self.order {
            ByteOrder::Ndr => f32::from_le_bytes(b),
            ByteOrder::Xdr => f32::from_be_bytes(b),
        })
    }
}

fn decode_f64(b: [u8; 8], order: ByteOrder) -> f64 {
    match order {
        ByteOrder::Ndr => f64::from_le_bytes(b),
        ByteOrder::Xdr => f64::from_be_bytes(b),
    }
}

/// Decode packed doubles into an owned vector.
pub(crate) fn decode_f64s(bytes: &[u8], order: ByteOrder) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|c| {
            let mut b = [0u8; 8];
            b.copy_from_slice(c);
            decode_f64(b, order)
        })
        .collect()
}

/// Reinterpret little-endian packed doubles in place when the host is
/// little-endian and the slice is 8-byte aligned.
pub(crate) fn view_f64s(bytes: &[u8]) -> Option<&[f64]> {
    if cfg!(target_endian = "big") {
        return None;
    }
    // SAFETY: every bit pattern is a valid f64, and the slice is used only
    // when align_to leaves no unaligned prefix or suffix.
    let (prefix, body, suffix) = unsafe { bytes.align_to::<f64>() };
    if prefix.is_empty() && suffix.is_empty() {
        Some(body)
    } else {
        None
    }
}

/// Append-only writer in a fixed byte order.
#[derive(Debug)]
pub(crate) struct ByteSink {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteSink {
    pub(crate) fn with_capacity(capacity: usize, order: ByteOrder) -> Self {
        ByteSink {
            buf: Vec::with_capacity(capacity),
            order,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        match self.order {
            ByteOrder::Ndr => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Xdr => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub(crate) fn put_i32(&mut self, v: i32) {
        match self.order {
            ByteOrder::Ndr => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Xdr => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub(crate) fn put_count(&mut self, n: usize) {
        self.put_u32(n as u32);
    }

    pub(crate) fn put_f32(&mut self, v: f32) {
        match self.order {
            ByteOrder::Ndr => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Xdr => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub(crate) fn put_f64(&mut self, v: f64) {
        match self.order {
            ByteOrder::Ndr => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Xdr => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub(crate) fn put_f64s(&mut self, values: &[f64]) {
        for v in values {
            self.put_f64(*v);
        }
    }
}
