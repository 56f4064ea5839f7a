//! Running-best merge policies.
//!
//! The cumulative candidate set only grows with length, but each length is
//! reduced and solved independently, so a longer length can come out worse.
//! These policies decide per length whether the fresh result replaces the
//! best one seen so far or the best one is reported again.

use crate::record::{ApproximationRecord, MembershipTrack, MixtureTrack};
use tracing::debug;

pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Best LP1 and LP2 tracks seen so far in one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningBest {
    pub membership: MembershipTrack,
    pub mixture: MixtureTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    pub membership_accepted: bool,
    pub mixture_accepted: bool,
}

impl RunningBest {
    /// The first length is taken as is.
    pub fn seed(first: &ApproximationRecord) -> Self {
        Self {
            membership: first.membership.clone(),
            mixture: first.mixture.clone(),
        }
    }

    /// `fresh` with both LP tracks replaced by the running best.
    pub fn stamp(&self, fresh: ApproximationRecord) -> ApproximationRecord {
        ApproximationRecord {
            membership: self.membership.clone(),
            mixture: self.mixture.clone(),
            ..fresh
        }
    }
}

/// Distance must drop by at least `epsilon` and visibility must not drop.
///
/// Accepted steps never lower `t`, so the reported visibility is
/// non-decreasing over the whole series, not only between neighbours.
pub fn improves(best_t: f64, best_d: f64, t: f64, d: f64, epsilon: f64) -> bool {
    best_d - d >= epsilon && t >= best_t
}

/// Per-track merge. The two tracks are decided independently.
pub fn merge(
    best: &RunningBest,
    fresh: &ApproximationRecord,
    epsilon: f64,
) -> (RunningBest, MergeOutcome) {
    let membership_accepted = improves(
        best.membership.t,
        best.membership.d,
        fresh.membership.t,
        fresh.membership.d,
        epsilon,
    );
    let mixture_accepted = improves(
        best.mixture.t,
        best.mixture.d,
        fresh.mixture.t,
        fresh.mixture.d,
        epsilon,
    );

    let updated = RunningBest {
        membership: if membership_accepted {
            fresh.membership.clone()
        } else {
            best.membership.clone()
        },
        mixture: if mixture_accepted {
            fresh.mixture.clone()
        } else {
            best.mixture.clone()
        },
    };
    (
        updated,
        MergeOutcome {
            membership_accepted,
            mixture_accepted,
        },
    )
}

/// Whole-record merge: keep `fresh` only if neither visibility dropped,
/// otherwise repeat `previous` one length further.
pub fn merge_wholesale(
    previous: &ApproximationRecord,
    fresh: ApproximationRecord,
) -> (ApproximationRecord, bool) {
    if fresh.membership.t >= previous.membership.t && fresh.mixture.t >= previous.mixture.t {
        (fresh, true)
    } else {
        let mut held = previous.clone();
        held.length += 1;
        (held, false)
    }
}

/// Turns a sequence of fresh per-length records into the reported series.
pub trait MergePolicy {
    fn admit(&mut self, fresh: ApproximationRecord) -> ApproximationRecord;
}

#[derive(Debug, Clone)]
pub struct PerTrackPolicy {
    epsilon: f64,
    best: Option<RunningBest>,
}

impl PerTrackPolicy {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            best: None,
        }
    }

    pub fn best(&self) -> Option<&RunningBest> {
        self.best.as_ref()
    }
}

impl Default for PerTrackPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl MergePolicy for PerTrackPolicy {
    fn admit(&mut self, fresh: ApproximationRecord) -> ApproximationRecord {
        let Some(best) = &self.best else {
            self.best = Some(RunningBest::seed(&fresh));
            return fresh;
        };
        let (updated, outcome) = merge(best, &fresh, self.epsilon);
        debug!(
            length = fresh.length,
            lp1_accepted = outcome.membership_accepted,
            lp2_accepted = outcome.mixture_accepted,
            "merged length"
        );
        let output = updated.stamp(fresh);
        self.best = Some(updated);
        output
    }
}

#[derive(Debug, Clone, Default)]
pub struct WholesalePolicy {
    previous: Option<ApproximationRecord>,
}

impl WholesalePolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MergePolicy for WholesalePolicy {
    fn admit(&mut self, fresh: ApproximationRecord) -> ApproximationRecord {
        let output = match self.previous.take() {
            None => fresh,
            Some(previous) => {
                let length = fresh.length;
                let (output, accepted) = merge_wholesale(&previous, fresh);
                debug!(length, accepted, "merged length wholesale");
                output
            }
        };
        self.previous = Some(output.clone());
        output
    }
}
