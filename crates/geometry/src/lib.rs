//! Geometric collaborators of the approximation engine.
//!
//! - [`gates`]: single-qubit gates as 3×3 Bloch-sphere maps
//! - [`transform`]: word → point transforms (states and channels)
//! - [`reducer`]: bounded nearest-point subsets for tractable solves
//! - [`hull`]: convex-hull volume of 3-D point sets
//! - [`targets`]: seeded random targets
//! - [`density`]: Bloch vectors ↔ 2×2 density matrices

pub mod density;
pub mod error;
pub mod gates;
pub mod hull;
pub mod points;
pub mod reducer;
pub mod targets;
pub mod transform;

pub use density::*;
pub use error::*;
pub use gates::*;
pub use hull::*;
pub use points::*;
pub use reducer::*;
pub use targets::*;
pub use transform::*;
