#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geoserial-core`.

pub mod bbox;
pub mod context;
mod cursor;
pub mod error;
pub mod flags;
pub mod geometry;
pub mod gserialized;
pub mod interop;
pub mod ptarray;
pub mod types;
pub mod wkb;

pub use bbox::BoundingBox;
pub use context::{Context, SridPolicy};
pub use error::{GeometryError, Result};
pub use flags::Flags;
pub use geometry::{CheckLevel, Geometry, Shape};
pub use ptarray::{Point4D, PointArray};
pub use types::{ByteOrder, GeometryType, WkbVariant};

/// Deepest collection nesting either decoder accepts.
pub(crate) const MAX_NESTING: usize = 200;
