//! Session orchestration: one configured run from words to report.

use crate::config::RunConfig;
use anyhow::Result;
use ndarray::{Array1, ArrayView1};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use wordhull_engine::{
    ApproximationRecord, CandidateBank, DispatchReport, Dispatcher, Evaluator, RunMode, RunReport,
};
use wordhull_geometry::{
    BlochChannels, BlochStates, ConvexHull3, DynWordTransform, GateSet, NearestReducer,
    TargetGenerator,
};
use wordhull_solver::{ClarabelSolver, DynConicSolver};
use wordhull_words::Alphabet;

pub struct ApproximationSession {
    config: RunConfig,
    alphabet: Alphabet,
    seed: u64,
    solver: DynConicSolver,
}

impl ApproximationSession {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let alphabet = config.alphabet()?;
        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        Ok(Self {
            config,
            alphabet,
            seed,
            solver: Arc::new(ClarabelSolver::default()),
        })
    }

    pub fn with_solver(mut self, solver: DynConicSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Seed used for target generation; random unless configured.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn transform(&self) -> Result<DynWordTransform> {
        let gates = GateSet::new(&self.alphabet, self.config.gate_visibility)?;
        Ok(match self.config.mode {
            RunMode::States | RunMode::Visibility => Arc::new(BlochStates::new(gates)),
            RunMode::Channels => Arc::new(BlochChannels::new(gates)),
        })
    }

    pub fn evaluator(&self) -> Evaluator {
        let evaluator = Evaluator::new(
            self.solver.clone(),
            Arc::new(NearestReducer),
            self.config.evaluation_settings(),
        );
        match self.config.mode {
            RunMode::States => evaluator.with_hull(Arc::new(ConvexHull3::default())),
            RunMode::Channels | RunMode::Visibility => evaluator,
        }
    }

    pub fn build_bank(&self) -> Result<CandidateBank> {
        let transform = self.transform()?;
        CandidateBank::build(
            &self.alphabet,
            transform.as_ref(),
            self.config.min_length,
            self.config.max_length,
        )
    }

    pub fn generate_targets(&self) -> Vec<Array1<f64>> {
        TargetGenerator::seeded(self.seed).generate(self.config.mode.target_kind(), self.config.targets)
    }

    fn empty_report(&self) -> RunReport {
        RunReport::new(
            self.config.mode,
            self.alphabet.labels().to_vec(),
            (self.config.min_length, self.config.max_length),
            self.config.gate_visibility,
            Some(self.seed),
        )
    }

    fn evaluate_target(
        &self,
        evaluator: &Evaluator,
        bank: &CandidateBank,
        target: ArrayView1<'_, f64>,
    ) -> Result<Vec<ApproximationRecord>> {
        match self.config.mode {
            RunMode::Channels => evaluator.evaluate_channels(bank, target),
            RunMode::States | RunMode::Visibility => evaluator.evaluate_states(bank, target),
        }
    }

    /// Full run with targets drawn from the session seed.
    pub fn run(&self) -> Result<RunReport> {
        let targets = match self.config.mode {
            RunMode::Visibility => Vec::new(),
            RunMode::States | RunMode::Channels => self.generate_targets(),
        };
        self.run_with_targets(targets)
    }

    pub fn run_with_targets(&self, targets: Vec<Array1<f64>>) -> Result<RunReport> {
        let dispatcher = self.config.workers.map(Dispatcher::new).unwrap_or_default();
        self.execute(targets, |bank, evaluator, targets| {
            dispatcher.run(targets, |_, target| self.evaluate_target(evaluator, bank, target))
        })
    }

    /// Same as [`run_with_targets`](Self::run_with_targets) on the calling thread.
    pub fn run_sequential_with_targets(&self, targets: Vec<Array1<f64>>) -> Result<RunReport> {
        self.execute(targets, |bank, evaluator, targets| {
            Ok(Dispatcher::run_sequential(targets, |_, target| {
                self.evaluate_target(evaluator, bank, target)
            }))
        })
    }

    fn execute(
        &self,
        targets: Vec<Array1<f64>>,
        dispatch: impl FnOnce(
            &CandidateBank,
            &Evaluator,
            &[Array1<f64>],
        ) -> Result<DispatchReport<Vec<ApproximationRecord>>>,
    ) -> Result<RunReport> {
        let start = Instant::now();
        info!(
            mode = %self.config.mode,
            alphabet = %self.alphabet,
            min_length = self.config.min_length,
            max_length = self.config.max_length,
            gate_visibility = self.config.gate_visibility,
            seed = self.seed,
            targets = targets.len(),
            "session started"
        );

        let bank = self.build_bank()?;
        let evaluator = self.evaluator();
        let report = self.empty_report();

        let report = match self.config.mode {
            RunMode::Visibility => report.with_visibility(evaluator.evaluate_visibility(&bank)?),
            RunMode::States | RunMode::Channels => {
                let dispatch = dispatch(&bank, &evaluator, &targets)?;
                let targets = targets.iter().map(|t| t.to_vec()).collect();
                report.with_dispatch(targets, dispatch)
            }
        };

        info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            failures = report.failures.len(),
            "session finished"
        );
        Ok(report)
    }
}
