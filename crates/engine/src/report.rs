//! Run reports.

use crate::dispatcher::{DispatchReport, TargetFailure};
use crate::record::{ApproximationRecord, VisibilityRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wordhull_geometry::TargetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// LP fits of random Bloch vectors, per-track merge.
    States,
    /// LP fits of random unitary channels, whole-record merge.
    Channels,
    /// Maximal-visibility state over the candidate states; no targets.
    Visibility,
}

impl RunMode {
    /// Kind of targets and candidate points the mode works with.
    pub fn target_kind(self) -> TargetKind {
        match self {
            RunMode::States | RunMode::Visibility => TargetKind::State,
            RunMode::Channels => TargetKind::Channel,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::States => "states",
            RunMode::Channels => "channels",
            RunMode::Visibility => "visibility",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub alphabet: Vec<String>,
    pub min_length: usize,
    pub max_length: usize,
    pub gate_visibility: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
    pub generated_at_unix_ms: u128,
    pub targets: Vec<Vec<f64>>,
    /// One entry per target; `None` where the evaluation failed.
    pub results: Vec<Option<Vec<ApproximationRecord>>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub visibility: Vec<VisibilityRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failures: Vec<TargetFailure>,
}

impl RunReport {
    pub fn new(
        mode: RunMode,
        alphabet: Vec<String>,
        (min_length, max_length): (usize, usize),
        gate_visibility: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            mode,
            alphabet,
            min_length,
            max_length,
            gate_visibility,
            seed,
            generated_at_unix_ms: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            targets: Vec::new(),
            results: Vec::new(),
            visibility: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Attach dispatched per-target series.
    pub fn with_dispatch(
        mut self,
        targets: Vec<Vec<f64>>,
        dispatch: DispatchReport<Vec<ApproximationRecord>>,
    ) -> Self {
        self.targets = targets;
        self.results = dispatch.slots;
        self.failures = dispatch.failures;
        self
    }

    pub fn with_visibility(mut self, records: Vec<VisibilityRecord>) -> Self {
        self.visibility = records;
        self
    }

    /// Last reported record of every successful target.
    pub fn final_records(&self) -> impl Iterator<Item = (usize, &ApproximationRecord)> + '_ {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, series)| series.as_ref()?.last().map(|r| (i, r)))
    }

    /// Save report to JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load report from JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MembershipTrack, MixtureTrack, NearestTrack};

    fn record(length: usize) -> ApproximationRecord {
        ApproximationRecord {
            length,
            target: vec![0.0, 0.0, 1.0],
            membership: MembershipTrack {
                t: 0.9,
                d: 0.1,
                point: vec![0.0, 0.0, 0.9],
            },
            mixture: MixtureTrack {
                t: 0.95,
                d: 0.05,
                point: vec![0.0, 0.0, 0.95],
                noise: vec![0.0, 0.0, 0.0],
            },
            nearest: NearestTrack {
                d: 0.2,
                point: vec![0.0, 0.0, 0.8],
            },
            hull_volume: Some(0.5),
        }
    }

    #[test]
    fn test_save_and_load() -> anyhow::Result<()> {
        let dispatch = DispatchReport {
            slots: vec![Some(vec![record(1), record(2)]), None],
            failures: vec![TargetFailure {
                index: 1,
                message: "problem is infeasible (clarabel)".into(),
            }],
        };
        let report = RunReport::new(
            RunMode::States,
            vec!["H".into(), "T".into()],
            (1, 3),
            0.99,
            Some(7),
        )
        .with_dispatch(vec![vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 0.0]], dispatch);

        let path = std::env::temp_dir().join(format!("wordhull-report-{}.json", std::process::id()));
        report.save(&path)?;
        let loaded = RunReport::load(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(loaded.mode, RunMode::States);
        assert_eq!(loaded.results, report.results);
        assert_eq!(loaded.failures, report.failures);
        let finals: Vec<_> = loaded.final_records().map(|(i, r)| (i, r.length)).collect();
        assert_eq!(finals, vec![(0, 2)]);
        Ok(())
    }

    #[test]
    fn test_mode_names() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&RunMode::Channels)?, "\"channels\"");
        assert_eq!(RunMode::Visibility.target_kind(), TargetKind::State);
        Ok(())
    }
}
