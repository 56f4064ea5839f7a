//! Word enumeration over a finite alphabet of generators.
//!
//! A word is an ordered sequence of alphabet symbols. The generator
//! enumerates every word of a given length (`|A|^L` of them) and, in its
//! cumulative mode, the union of all lengths up to `L` with the degenerate
//! single-letter repetitions removed for lengths above one.

pub mod alphabet;
pub mod error;
pub mod generator;

pub use alphabet::*;
pub use error::*;
pub use generator::*;
