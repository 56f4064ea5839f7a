//! Per-target evaluation over the length loop.

use crate::candidates::CandidateBank;
use crate::merge::{MergePolicy, PerTrackPolicy, WholesalePolicy, DEFAULT_EPSILON};
use crate::record::{ApproximationRecord, VisibilityRecord};
use anyhow::{bail, ensure, Context, Result};
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wordhull_geometry::{
    bloch_from_density, density_from_bloch, DynHullVolume, DynPointReducer,
};
use wordhull_solver::{nearest_point, solve_membership, solve_mixture, solve_visibility, DynConicSolver};

/// Knobs of one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Candidates kept by the reducer before each solve.
    pub max_points: usize,
    /// Merge tolerance.
    pub epsilon: f64,
}

impl EvaluationSettings {
    pub fn states() -> Self {
        Self {
            max_points: 100,
            epsilon: DEFAULT_EPSILON,
        }
    }

    pub fn channels() -> Self {
        Self {
            max_points: 200,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self::states()
    }
}

/// Runs the length loop for one target. Holds no per-target state, so one
/// evaluator can be shared by every worker.
#[derive(Clone)]
pub struct Evaluator {
    solver: DynConicSolver,
    reducer: DynPointReducer,
    hull: Option<DynHullVolume>,
    settings: EvaluationSettings,
}

impl Evaluator {
    pub fn new(solver: DynConicSolver, reducer: DynPointReducer, settings: EvaluationSettings) -> Self {
        Self {
            solver,
            reducer,
            hull: None,
            settings,
        }
    }

    /// Report hull volumes in states mode.
    pub fn with_hull(mut self, hull: DynHullVolume) -> Self {
        self.hull = Some(hull);
        self
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Unmerged record for one cumulative candidate set.
    pub fn approximate(
        &self,
        length: usize,
        candidates: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
        with_hull: bool,
    ) -> Result<ApproximationRecord> {
        let hull_volume = match (&self.hull, with_hull) {
            (Some(hull), true) => Some(hull.volume(candidates)?),
            _ => None,
        };

        let reduced = self
            .reducer
            .reduce(candidates, target, self.settings.max_points)?;
        ensure!(
            reduced.nrows() > 0,
            "no candidates left for length {length} after reduction"
        );
        debug!(
            length,
            candidates = candidates.nrows(),
            kept = reduced.nrows(),
            reducer = self.reducer.name(),
            "reduced candidate set"
        );

        let solver = self.solver.as_ref();
        let membership = solve_membership(solver, reduced.view(), target)
            .with_context(|| format!("LP1 at length {length}"))?;
        let mixture = solve_mixture(solver, reduced.view(), target)
            .with_context(|| format!("LP2 at length {length}"))?;
        let nearest = nearest_point(reduced.view(), target)?;

        info!(
            length,
            t1 = membership.visibility,
            t2 = mixture.visibility,
            d1 = membership.distance,
            d2 = mixture.distance,
            d3 = nearest.distance,
            "length solved"
        );

        Ok(ApproximationRecord {
            length,
            target: target.to_vec(),
            membership: membership.into(),
            mixture: mixture.into(),
            nearest: nearest.into(),
            hull_volume,
        })
    }

    fn evaluate_with(
        &self,
        bank: &CandidateBank,
        target: ArrayView1<'_, f64>,
        policy: &mut dyn MergePolicy,
        with_hull: bool,
    ) -> Result<Vec<ApproximationRecord>> {
        ensure!(
            target.len() == bank.dimension(),
            "target has {} coordinates but candidates have {}",
            target.len(),
            bank.dimension()
        );
        let mut records = Vec::with_capacity(bank.len());
        for (index, level) in bank.levels().iter().enumerate() {
            let candidates = bank.cumulative(index)?;
            let fresh = self.approximate(level.length, candidates.view(), target, with_hull)?;
            records.push(policy.admit(fresh));
        }
        Ok(records)
    }

    /// States mode: per-track merge, hull volumes when a hull is attached.
    pub fn evaluate_states(
        &self,
        bank: &CandidateBank,
        target: ArrayView1<'_, f64>,
    ) -> Result<Vec<ApproximationRecord>> {
        let mut policy = PerTrackPolicy::new(self.settings.epsilon);
        self.evaluate_with(bank, target, &mut policy, true)
    }

    /// Channels mode: whole-record merge, no hull.
    pub fn evaluate_channels(
        &self,
        bank: &CandidateBank,
        target: ArrayView1<'_, f64>,
    ) -> Result<Vec<ApproximationRecord>> {
        let mut policy = WholesalePolicy::new();
        self.evaluate_with(bank, target, &mut policy, false)
    }

    /// Maximal-visibility state per length over Bloch-vector candidates.
    /// Independent of any target.
    pub fn evaluate_visibility(&self, bank: &CandidateBank) -> Result<Vec<VisibilityRecord>> {
        if bank.dimension() != 3 {
            bail!(
                "visibility needs 3-D Bloch vectors, candidates are {}-dimensional",
                bank.dimension()
            );
        }
        let mut records = Vec::with_capacity(bank.len());
        for (index, level) in bank.levels().iter().enumerate() {
            let candidates = bank.cumulative(index)?;
            let states = candidates
                .axis_iter(Axis(0))
                .map(density_from_bloch)
                .collect::<Result<Vec<_>, _>>()?;
            let fit = solve_visibility(self.solver.as_ref(), &states)
                .with_context(|| format!("visibility SDP at length {}", level.length))?;
            let state = fit
                .state
                .as_ref()
                .map(|rho| bloch_from_density(rho.view()).map(|r| r.to_vec()))
                .transpose()?;
            info!(
                length = level.length,
                candidates = states.len(),
                visibility = fit.visibility,
                "visibility solved"
            );
            records.push(VisibilityRecord {
                length: level.length,
                candidates: states.len(),
                visibility: fit.visibility,
                state,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wordhull_geometry::{BlochChannels, BlochStates, ConvexHull3, GateSet, NearestReducer};
    use wordhull_solver::ClarabelSolver;
    use wordhull_words::Alphabet;

    fn evaluator(settings: EvaluationSettings) -> Evaluator {
        Evaluator::new(
            Arc::new(ClarabelSolver::default()),
            Arc::new(NearestReducer),
            settings,
        )
        .with_hull(Arc::new(ConvexHull3::default()))
    }

    #[test]
    fn test_states_series() -> Result<()> {
        let alphabet = Alphabet::parse("H,T,X")?;
        let transform = BlochStates::new(GateSet::new(&alphabet, 0.99)?);
        let bank = CandidateBank::build(&alphabet, &transform, 1, 4)?;
        let target = ndarray::array![0.0, 0.6, 0.8];

        let records = evaluator(EvaluationSettings::states()).evaluate_states(&bank, target.view())?;
        assert_eq!(records.iter().map(|r| r.length).collect::<Vec<_>>(), vec![1, 2, 3]);
        for record in &records {
            assert!(record.hull_volume.is_some());
            // X keeps the origin inside every candidate hull.
            assert!(record.mixture.t >= record.membership.t - 1e-6);
        }
        for (i, earlier) in records.iter().enumerate() {
            for later in &records[i + 1..] {
                assert!(later.membership.d <= earlier.membership.d + DEFAULT_EPSILON);
                assert!(later.membership.t >= earlier.membership.t - DEFAULT_EPSILON);
            }
        }
        Ok(())
    }

    #[test]
    fn test_channels_skip_hull() -> Result<()> {
        let alphabet = Alphabet::parse("I,H,S")?;
        let transform = BlochChannels::new(GateSet::new(&alphabet, 1.0)?);
        let bank = CandidateBank::build(&alphabet, &transform, 1, 3)?;
        let identity = ndarray::array![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let records = evaluator(EvaluationSettings::channels()).evaluate_channels(&bank, identity.view())?;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.hull_volume.is_none()));
        assert!((records[0].membership.t - 1.0).abs() < 1e-6);
        assert!(records[1].membership.t >= records[0].membership.t);
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch_fails() -> Result<()> {
        let alphabet = Alphabet::parse("H,T")?;
        let transform = BlochStates::new(GateSet::new(&alphabet, 1.0)?);
        let bank = CandidateBank::build(&alphabet, &transform, 1, 2)?;
        let target = ndarray::array![1.0, 0.0];
        assert!(evaluator(EvaluationSettings::states())
            .evaluate_states(&bank, target.view())
            .is_err());
        Ok(())
    }

    #[test]
    fn test_visibility_series() -> Result<()> {
        let alphabet = Alphabet::parse("H,X")?;
        let transform = BlochStates::new(GateSet::new(&alphabet, 1.0)?);
        let bank = CandidateBank::build(&alphabet, &transform, 1, 3)?;
        let records = evaluator(EvaluationSettings::states()).evaluate_visibility(&bank)?;
        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.visibility > 0.0 && record.visibility <= 1.0 + 1e-6);
            assert!(record.state.is_some());
        }
        Ok(())
    }
}
