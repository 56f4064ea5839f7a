//! Approximation engine.
//!
//! # Key Components
//!
//! - [`candidates::CandidateBank`]: target-independent candidate points, one level per length
//! - [`evaluation::Evaluator`]: per-target length loop (reduce, solve, merge)
//! - [`merge`]: running-best policies that keep reported series monotone
//! - [`dispatcher::Dispatcher`]: parallel evaluation of independent targets
//! - [`report::RunReport`]: JSON persistence of a whole run

pub mod candidates;
pub mod dispatcher;
pub mod evaluation;
pub mod merge;
pub mod record;
pub mod report;

pub use candidates::*;
pub use dispatcher::*;
pub use evaluation::*;
pub use merge::*;
pub use record::*;
pub use report::*;
