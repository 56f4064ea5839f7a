//! wordhull: how well can bounded-length gate words approximate a target?
//!
//! Re-exports the workspace crates under one roof.

pub use wordhull_cli as cli;
pub use wordhull_engine as engine;
pub use wordhull_geometry as geometry;
pub use wordhull_solver as solver;
pub use wordhull_words as words;

pub use wordhull_cli::{ApproximationSession, RunConfig};
pub use wordhull_engine::{ApproximationRecord, CandidateBank, Dispatcher, Evaluator, RunMode, RunReport};
pub use wordhull_words::{Alphabet, Word, WordGenerator};
