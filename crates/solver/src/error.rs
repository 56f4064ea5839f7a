//! Solver error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("candidate set is empty")]
    EmptyCandidates,
    #[error("need at least {required} candidates, got {actual}")]
    TooFewCandidates { required: usize, actual: usize },
    #[error("candidates are {candidates}-dimensional but the target is {target}-dimensional")]
    DimensionMismatch { candidates: usize, target: usize },
    #[error("malformed problem: {detail}")]
    Malformed { detail: String },
    #[error("problem is infeasible ({backend})")]
    Infeasible { backend: String },
    #[error("problem is unbounded ({backend})")]
    Unbounded { backend: String },
    #[error("{backend} stopped with status {status}")]
    Numerical { backend: String, status: String },
}
