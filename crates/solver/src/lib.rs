//! Problem formulation for the approximation engine.
//!
//! # Key Components
//!
//! - [`problem::ConicProblem`]: backend-neutral linear/second-order-cone model
//! - [`backend::ConicSolver`]: trait for numerical backends, with [`backend::ClarabelSolver`]
//! - [`lp`]: exact-membership (LP1), relaxed-mixture (LP2) and nearest-point fits
//! - [`sdp`]: maximal-visibility qubit state over a set of density matrices
//!
//! Formulators only build problems and post-process solutions; solving is
//! always delegated to a [`backend::ConicSolver`].

pub mod backend;
pub mod error;
pub mod lp;
pub mod problem;
pub mod sdp;

pub use backend::*;
pub use error::*;
pub use lp::*;
pub use problem::*;
pub use sdp::*;
