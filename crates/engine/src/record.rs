//! Per-length result records.
//!
//! Points are stored as plain coordinate lists so reports stay readable.

use serde::{Deserialize, Serialize};
use wordhull_solver::{MembershipFit, MixtureFit, NearestFit};

/// Exact-membership fit (LP1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipTrack {
    pub t: f64,
    pub d: f64,
    pub point: Vec<f64>,
}

/// Relaxed-mixture fit (LP2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureTrack {
    pub t: f64,
    pub d: f64,
    pub point: Vec<f64>,
    pub noise: Vec<f64>,
}

/// Closest single candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestTrack {
    pub d: f64,
    pub point: Vec<f64>,
}

impl From<MembershipFit> for MembershipTrack {
    fn from(fit: MembershipFit) -> Self {
        Self {
            t: fit.visibility,
            d: fit.distance,
            point: fit.point.to_vec(),
        }
    }
}

impl From<MixtureFit> for MixtureTrack {
    fn from(fit: MixtureFit) -> Self {
        Self {
            t: fit.visibility,
            d: fit.distance,
            point: fit.point.to_vec(),
            noise: fit.noise.to_vec(),
        }
    }
}

impl From<NearestFit> for NearestTrack {
    fn from(fit: NearestFit) -> Self {
        Self {
            d: fit.distance,
            point: fit.point.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproximationRecord {
    pub length: usize,
    pub target: Vec<f64>,
    pub membership: MembershipTrack,
    pub mixture: MixtureTrack,
    pub nearest: NearestTrack,
    /// Hull volume of the unreduced candidate set (states only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hull_volume: Option<f64>,
}


/// Maximal-visibility state for one length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRecord {
    pub length: usize,
    pub candidates: usize,
    pub visibility: f64,
    /// Bloch vector of `ρ / tr ρ`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<Vec<f64>>,
}
