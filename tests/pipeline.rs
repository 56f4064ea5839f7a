use anyhow::Result;
use ndarray::array;
use wordhull::engine::DEFAULT_EPSILON;
use wordhull::{ApproximationSession, RunConfig, RunMode, RunReport};

fn config(mode: RunMode) -> RunConfig {
    RunConfig {
        alphabet: ["H", "T", "X", "I"].into_iter().map(String::from).collect(),
        min_length: 1,
        max_length: 4,
        gate_visibility: 0.98,
        mode,
        targets: 3,
        seed: Some(2024),
        workers: Some(3),
        ..RunConfig::default()
    }
}

#[test]
fn states_run_end_to_end() -> Result<()> {
    let session = ApproximationSession::new(config(RunMode::States))?;
    let report = session.run()?;

    assert_eq!(report.mode, RunMode::States);
    assert_eq!(report.seed, Some(2024));
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.results.len(), 3);

    for (target, series) in report.targets.iter().zip(&report.results) {
        let series = series.as_ref().expect("target evaluated");
        assert_eq!(series.iter().map(|r| r.length).collect::<Vec<_>>(), vec![1, 2, 3]);
        for record in series {
            assert_eq!(&record.target, target);
            assert!(record.hull_volume.is_some());
            assert!(record.membership.t <= 1.0 + 1e-6);
        }
        for (i, a) in series.iter().enumerate() {
            for b in &series[i + 1..] {
                assert!(b.membership.d <= a.membership.d + DEFAULT_EPSILON);
                assert!(b.membership.t >= a.membership.t - DEFAULT_EPSILON);
                assert!(b.mixture.d <= a.mixture.d + DEFAULT_EPSILON);
                assert!(b.mixture.t >= a.mixture.t - DEFAULT_EPSILON);
                // The candidate set only grows, so the hull cannot shrink.
                assert!(b.hull_volume.unwrap_or(0.0) >= a.hull_volume.unwrap_or(0.0) - 1e-9);
            }
        }
    }
    Ok(())
}

#[test]
fn channels_run_keeps_visibility_non_decreasing() -> Result<()> {
    // X, Y, Z and I average to the zero matrix, so every target line meets
    // the candidate hull.
    let session = ApproximationSession::new(RunConfig {
        alphabet: ["H", "T", "X", "Y", "Z", "I"].into_iter().map(String::from).collect(),
        max_length: 3,
        ..config(RunMode::Channels)
    })?;
    let report = session.run()?;
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    for series in report.results.iter().flatten() {
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].length, 2);
        assert!(series[1].membership.t >= series[0].membership.t);
        assert!(series[1].mixture.t >= series[0].mixture.t);
        assert!(series.iter().all(|r| r.target.len() == 9));
    }
    Ok(())
}

#[test]
fn report_survives_disk() -> Result<()> {
    let report = ApproximationSession::new(RunConfig {
        targets: 1,
        max_length: 3,
        ..config(RunMode::States)
    })?
    .run()?;

    let path = std::env::temp_dir().join(format!("wordhull-pipeline-{}.json", std::process::id()));
    report.save(&path)?;
    let loaded = RunReport::load(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(loaded.results, report.results);
    assert_eq!(loaded.targets, report.targets);
    let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&report)?)?;
    assert_eq!(json["mode"], "states");
    assert!(json["targets"][0].is_array());
    Ok(())
}

#[test]
fn explicit_target_reaches_pure_state() -> Result<()> {
    // X|0> = |1> is a candidate, up to gate noise.
    let session = ApproximationSession::new(RunConfig {
        gate_visibility: 1.0,
        max_length: 2,
        ..config(RunMode::States)
    })?;
    let report = session.run_with_targets(vec![array![0.0, 0.0, -1.0]])?;
    let series = report.results[0].as_ref().expect("target evaluated");
    assert!((series[0].membership.t - 1.0).abs() < 1e-6);
    assert!(series[0].membership.d < 1e-5);
    assert!(series[0].nearest.d < 1e-12);
    Ok(())
}
