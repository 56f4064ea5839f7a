//! Geometry error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("unknown gate label {label:?}")]
    UnknownGate { label: String },
    #[error("symbol {index} is outside the gate set ({len} gates)")]
    UnknownSymbol { index: usize, len: usize },
    #[error("gate visibility must be in (0, 1], got {value}")]
    InvalidVisibility { value: f64 },
    #[error("expected {expected}-dimensional points, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("point set is empty")]
    EmptyPointSet,
}
