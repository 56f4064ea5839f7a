//! CLI wiring for wordhull.

use crate::config::RunConfig;
use crate::session::ApproximationSession;
use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use wordhull_engine::{RunMode, RunReport};
use wordhull_words::{Alphabet, WordGenerator};

#[derive(Parser, Debug)]
#[command(
    name = "wordhull",
    about = "Approximate targets by convex combinations of gate-word images"
)]
pub struct Cli {
    /// JSON run configuration; flags override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    States,
    Channels,
    Visibility,
}

impl From<ModeArg> for RunMode {
    fn from(value: ModeArg) -> RunMode {
        match value {
            ModeArg::States => RunMode::States,
            ModeArg::Channels => RunMode::Channels,
            ModeArg::Visibility => RunMode::Visibility,
        }
    }
}

/// Flags shared by `run` and `sweep`; unset flags keep the configured value.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Comma separated gate labels, e.g. `H,T,X`.
    #[arg(long)]
    pub alphabet: Option<String>,
    #[arg(long)]
    pub min_length: Option<usize>,
    /// Exclusive upper bound of the length loop.
    #[arg(long)]
    pub max_length: Option<usize>,
    #[arg(long)]
    pub targets: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub workers: Option<usize>,
    /// Gate visibility in (0, 1].
    #[arg(long)]
    pub visibility: Option<f64>,
}

impl RunArgs {
    pub fn apply(&self, config: &mut RunConfig) -> Result<()> {
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(alphabet) = &self.alphabet {
            config.alphabet = Alphabet::parse(alphabet)?.labels().to_vec();
        }
        if let Some(min_length) = self.min_length {
            config.min_length = min_length;
        }
        if let Some(max_length) = self.max_length {
            config.max_length = max_length;
        }
        if let Some(targets) = self.targets {
            config.targets = targets;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(visibility) = self.visibility {
            config.gate_visibility = visibility;
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every word of a length over an alphabet.
    Words {
        #[arg(long, default_value = "H,T,X")]
        alphabet: String,
        #[arg(long, default_value_t = 2)]
        length: usize,
        /// All lengths up to `length`, degenerate repetitions removed.
        #[arg(long, default_value_t = false)]
        up_to: bool,
    },
    /// Evaluate random targets over the configured length range.
    Run {
        #[command(flatten)]
        args: RunArgs,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Repeat `run` for decreasing gate visibilities.
    Sweep {
        #[command(flatten)]
        args: RunArgs,
        #[arg(long, default_value_t = 0.99)]
        from: f64,
        #[arg(long, default_value_t = 1)]
        steps: usize,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let Cli { config, command } = cli;

    match command {
        Command::Words {
            alphabet,
            length,
            up_to,
        } => {
            let alphabet = Alphabet::parse(&alphabet)?;
            let generator = WordGenerator::new(&alphabet, length)?;
            let words = if up_to {
                generator.generate_words_up_to()?
            } else {
                generator.generate_words()
            };
            for word in &words {
                println!("{}", alphabet.spell(word));
            }
            info!(count = words.len(), "words generated");
        }
        Command::Run { args, output } => {
            let mut config = RunConfig::load(config.as_deref())?;
            args.apply(&mut config)?;
            if output.is_some() {
                config.output = output;
            }

            let session = ApproximationSession::new(config)?;
            let report = session.run()?;
            print_summary(&report);

            if let Some(path) = &session.config().output {
                report.save(path)?;
                info!(path = %path.display(), "report saved");
            }
        }
        Command::Sweep {
            args,
            from,
            steps,
            output_dir,
        } => {
            ensure!(steps > 0, "sweep needs at least one step");
            let mut base = RunConfig::load(config.as_deref())?;
            args.apply(&mut base)?;
            if let Some(dir) = &output_dir {
                std::fs::create_dir_all(dir)?;
            }

            for step in 0..steps {
                let visibility = sweep_visibility(from, step);
                let config = RunConfig {
                    gate_visibility: visibility,
                    ..base.clone()
                };
                let session = ApproximationSession::new(config)?;
                let report = session.run()?;
                println!("visibility={visibility:.2}");
                print_summary(&report);

                if let Some(dir) = &output_dir {
                    let path = dir.join(format!("{}_{visibility:.2}.json", report.mode));
                    report.save(&path)?;
                    info!(path = %path.display(), "report saved");
                }
            }
        }
    }

    Ok(())
}

/// `from − 0.01·step`, rounded to two decimals.
fn sweep_visibility(from: f64, step: usize) -> f64 {
    ((from - 0.01 * step as f64) * 100.0).round() / 100.0
}

fn print_summary(report: &RunReport) {
    println!(
        "mode={}, lengths={}..{}, targets={}, failures={}",
        report.mode,
        report.min_length,
        report.max_length,
        report.targets.len(),
        report.failures.len()
    );
    for (index, record) in report.final_records() {
        println!(
            "- target {index} @ L={}: t1={:.4} d1={:.4} t2={:.4} d2={:.4} d3={:.4}",
            record.length,
            record.membership.t,
            record.membership.d,
            record.mixture.t,
            record.mixture.d,
            record.nearest.d
        );
    }
    for failure in &report.failures {
        println!("- target {} failed: {}", failure.index, failure.message);
    }
    for record in &report.visibility {
        println!(
            "- L={} candidates={} visibility={:.4}",
            record.length, record.candidates, record.visibility
        );
    }
}
