//! Parallel evaluation of independent targets.
//!
//! Every target becomes one task on a dedicated rayon pool. Tasks share
//! nothing mutable; each result travels back tagged with its target index,
//! so the collected slots line up with the targets whatever order the tasks
//! finish in.

use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub index: usize,
    pub message: String,
}

/// One slot per target; failed targets leave their slot empty.
#[derive(Debug, Clone)]
pub struct DispatchReport<T> {
    pub slots: Vec<Option<T>>,
    pub failures: Vec<TargetFailure>,
}

impl<T> DispatchReport<T> {
    fn with_targets(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| None).collect(),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, index: usize, outcome: Result<T>) {
        match outcome {
            Ok(value) => self.slots[index] = Some(value),
            Err(err) => {
                let message = format!("{err:#}");
                error!(target_index = index, error = %message, "target evaluation failed");
                self.failures.push(TargetFailure { index, message });
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    workers: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(rayon::current_num_threads())
    }
}

impl Dispatcher {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job(index, target)` for every target on the worker pool.
    ///
    /// Errors from a job are logged and collected; the other targets keep
    /// running. Only a pool that cannot be built fails the whole call.
    pub fn run<T, F>(&self, targets: &[Array1<f64>], job: F) -> Result<DispatchReport<T>>
    where
        T: Send,
        F: Fn(usize, ArrayView1<'_, f64>) -> Result<T> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("wordhull-worker-{i}"))
            .build()
            .context("building worker pool")?;
        info!(
            workers = self.workers,
            targets = targets.len(),
            "dispatching targets"
        );

        let mut report = DispatchReport::with_targets(targets.len());
        let (tx, rx) = mpsc::channel::<(usize, Result<T>)>();
        let job = &job;
        pool.in_place_scope(|scope| {
            for (index, target) in targets.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = job(index, target.view());
                    // The collector outlives every task.
                    let _ = tx.send((index, outcome));
                });
            }
            drop(tx);
            for (index, outcome) in rx {
                report.record(index, outcome);
            }
        });

        info!(
            completed = report.completed(),
            failed = report.failures.len(),
            "dispatch finished"
        );
        Ok(report)
    }

    /// Single-threaded reference path with the same reporting.
    pub fn run_sequential<T, F>(targets: &[Array1<f64>], job: F) -> DispatchReport<T>
    where
        F: Fn(usize, ArrayView1<'_, f64>) -> Result<T>,
    {
        let mut report = DispatchReport::with_targets(targets.len());
        for (index, target) in targets.iter().enumerate() {
            report.record(index, job(index, target.view()));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use ndarray::array;
    use std::time::Duration;

    fn targets(count: usize) -> Vec<Array1<f64>> {
        (0..count).map(|i| array![i as f64, 0.0, 0.0]).collect()
    }

    #[test]
    fn test_slots_follow_targets_not_completion() -> Result<()> {
        let targets = targets(6);
        // Earlier targets sleep longer, so they finish last.
        let report = Dispatcher::new(3).run(&targets, |index, target| {
            std::thread::sleep(Duration::from_millis(10 * (6 - index as u64)));
            Ok(target[0] * 10.0)
        })?;
        let values: Vec<f64> = report.slots.iter().map(|s| s.unwrap()).collect();
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        assert!(report.is_complete());
        Ok(())
    }

    #[test]
    fn test_failure_does_not_stop_siblings() -> Result<()> {
        let targets = targets(4);
        let report = Dispatcher::new(2).run(&targets, |index, _| {
            if index == 2 {
                bail!("problem is infeasible");
            }
            Ok(index)
        })?;
        assert_eq!(report.slots, vec![Some(0), Some(1), None, Some(3)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert!(report.failures[0].message.contains("infeasible"));
        assert_eq!(report.completed(), 3);
        Ok(())
    }

    #[test]
    fn test_sequential_matches_parallel() -> Result<()> {
        let targets = targets(5);
        fn job(index: usize, target: ArrayView1<'_, f64>) -> Result<f64> {
            Ok(target.sum() + index as f64)
        }
        let parallel = Dispatcher::new(4).run(&targets, job)?;
        let sequential = Dispatcher::run_sequential(&targets, job);
        assert_eq!(parallel.slots, sequential.slots);
        Ok(())
    }

    #[test]
    fn test_no_targets() -> Result<()> {
        let report = Dispatcher::default().run(&[], |_, _| Ok(()))?;
        assert!(report.slots.is_empty());
        Ok(())
    }
}
