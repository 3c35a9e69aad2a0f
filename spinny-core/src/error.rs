/// Error types for the linear algebra core, colours and shapes
use std::fmt;

/// Contract violations raised by vector and matrix operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// Elementwise operation on vectors or matrices of different sizes.
    DimensionMismatch { left: usize, right: usize },
    /// Operation only defined for certain dimensions (cross product, det).
    UnsupportedDimension {
        operation: &'static str,
        dimension: usize,
    },
    /// Matrix product with mismatched inner dimensions.
    IncompatibleSize {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// Normalising a zero-length vector, or projecting a point that sits
    /// exactly on the camera.
    DivideByZero,
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { left, right } => {
                write!(f, "dimension mismatch: {left} vs {right}")
            }
            Self::UnsupportedDimension {
                operation,
                dimension,
            } => write!(f, "{operation} is not supported in dimension {dimension}"),
            Self::IncompatibleSize { left, right } => write!(
                f,
                "incompatible sizes for multiplication: {}x{} times {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Self::DivideByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for LinalgError {}

/// Errors from parsing colour strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColourError {
    /// Not of the form `#RRGGBB`.
    InvalidHex(String),
    /// Not in the named palette.
    UnknownName(String),
}

impl fmt::Display for ColourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex(s) => write!(f, "invalid hex colour {s:?} (expected #RRGGBB)"),
            Self::UnknownName(s) => write!(f, "unknown colour name {s:?}"),
        }
    }
}

impl std::error::Error for ColourError {}

/// Errors from building faces and shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    Linalg(LinalgError),
    /// A face refers to a point the shape does not have.
    IndexOutOfRange { index: usize, len: usize },
    /// A face needs at least three vertices.
    TooFewVertices { count: usize },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linalg(e) => write!(f, "{e}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "vertex index {index} out of range for {len} points")
            }
            Self::TooFewVertices { count } => {
                write!(f, "face has only {count} vertices (need >= 3)")
            }
        }
    }
}

impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Linalg(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LinalgError> for ShapeError {
    fn from(e: LinalgError) -> Self {
        Self::Linalg(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = LinalgError::DimensionMismatch { left: 2, right: 3 };
        assert_eq!(e.to_string(), "dimension mismatch: 2 vs 3");

        let e = LinalgError::IncompatibleSize {
            left: (2, 3),
            right: (2, 3),
        };
        assert!(e.to_string().contains("2x3 times 2x3"));
    }

    #[test]
    fn test_shape_error_source() {
        use std::error::Error;

        let e = ShapeError::from(LinalgError::DivideByZero);
        assert!(e.source().is_some());
        assert!(ShapeError::TooFewVertices { count: 2 }.source().is_none());
    }
}
