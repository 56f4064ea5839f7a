//! Random targets.
//!
//! The random source is always injected so runs can be replayed from a seed.

use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// What kind of point a target is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Unit Bloch vectors (3-D).
    State,
    /// Bloch matrices of unitary channels, flattened (9-D).
    Channel,
}

impl TargetKind {
    pub fn dimension(self) -> usize {
        match self {
            TargetKind::State => 3,
            TargetKind::Channel => 9,
        }
    }
}

pub struct TargetGenerator {
    rng: StdRng,
}

impl TargetGenerator {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    fn normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Normalized Gaussian vector, uniform on the sphere.
    fn unit_vector<const N: usize>(&mut self) -> [f64; N] {
        loop {
            let mut v = [0.0; N];
            for x in v.iter_mut() {
                *x = self.normal();
            }
            let len = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            if len > 1e-12 {
                return v.map(|x| x / len);
            }
        }
    }

    /// Uniformly distributed points on the unit sphere.
    pub fn states(&mut self, amount: usize) -> Vec<Array1<f64>> {
        (0..amount)
            .map(|_| {
                let [x, y, z] = self.unit_vector::<3>();
                array![x, y, z]
            })
            .collect()
    }

    /// Haar-random unitary channels as flattened 3×3 rotations.
    pub fn channels(&mut self, amount: usize) -> Vec<Array1<f64>> {
        (0..amount)
            .map(|_| {
                let [w, x, y, z] = self.unit_vector::<4>();
                array![
                    1.0 - 2.0 * (y * y + z * z),
                    2.0 * (x * y - w * z),
                    2.0 * (x * z + w * y),
                    2.0 * (x * y + w * z),
                    1.0 - 2.0 * (x * x + z * z),
                    2.0 * (y * z - w * x),
                    2.0 * (x * z - w * y),
                    2.0 * (y * z + w * x),
                    1.0 - 2.0 * (x * x + y * y)
                ]
            })
            .collect()
    }

    pub fn generate(&mut self, kind: TargetKind, amount: usize) -> Vec<Array1<f64>> {
        match kind {
            TargetKind::State => self.states(amount),
            TargetKind::Channel => self.channels(amount),
        }
    }
}
