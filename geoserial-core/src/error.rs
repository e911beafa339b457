use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid geometry structure: {0}")]
    InvalidGeometryStructure(String),

    #[error("unknown geometry type name: {0:?}")]
    UnknownTypeName(String),

    #[error("unknown WKB type code: {0}")]
    UnknownWkbTypeCode(u32),

    #[error("unsupported WKB type code: {0}")]
    UnsupportedWkbType(u32),

    #[error("truncated WKB: need {needed} bytes at offset {offset}, {available} available")]
    TruncatedWkb {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid byte order marker: {0}")]
    InvalidByteOrder(u8),

    #[error("serialized size mismatch: header declares {declared} bytes, buffer holds {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("invalid GSERIALIZED: {0}")]
    InvalidSerialized(&'static str),

    #[error("index out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid SRID: {0}")]
    InvalidSrid(i32),

    #[error("unsupported coordinate dimensions: {dimensions}")]
    UnsupportedDimensions { dimensions: &'static str },

    #[error("unsupported geometry type: {0}")]
    UnsupportedType(&'static str),

    #[error("antipodal edge detected")]
    AntipodalEdge,

    #[error("geozero error: {0}")]
    Geozero(#[from] geozero::error::GeozeroError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl GeometryError {
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        GeometryError::InvalidGeometryStructure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_expected_and_available() {
        let err = GeometryError::TruncatedWkb {
            offset: 9,
            needed: 8,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "truncated WKB: need 8 bytes at offset 9, 3 available"
        );

        let err = GeometryError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "index out of range: 4 (len 2)");
    }
}
