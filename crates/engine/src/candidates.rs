//! Candidate points shared by every target of a run.

use anyhow::{ensure, Context, Result};
use ndarray::Array2;
use tracing::debug;
use wordhull_geometry::{concat_clouds, WordTransform};
use wordhull_words::{Alphabet, Word, WordGenerator};

/// Words and their points for one step of the length loop.
#[derive(Debug, Clone)]
pub struct CandidateLevel {
    pub length: usize,
    /// First level: every pruned word of length `1..=length`.
    /// Later levels: words of exactly `length`.
    pub words: Vec<Word>,
    /// One row per word.
    pub points: Array2<f64>,
}

/// Candidate levels for lengths `min_length..max_length`.
///
/// The first level already covers every length up to `min_length`, so
/// `cumulative(i)` is the candidate set for length `min_length + i`.
#[derive(Debug, Clone)]
pub struct CandidateBank {
    dimension: usize,
    levels: Vec<CandidateLevel>,
}

impl CandidateBank {
    pub fn build(
        alphabet: &Alphabet,
        transform: &dyn WordTransform,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self> {
        ensure!(min_length >= 1, "minimum word length must be at least 1");
        ensure!(
            max_length > min_length,
            "maximum length {max_length} must exceed minimum length {min_length}"
        );

        let mut levels = Vec::with_capacity(max_length - min_length);
        for length in min_length..max_length {
            let generator = WordGenerator::new(alphabet, length)?;
            let words = if length == min_length {
                generator.generate_words_up_to()?
            } else {
                generator.generate_pruned()?
            };
            let points = transform
                .points(&words)
                .with_context(|| format!("mapping words of length {length}"))?;
            debug!(
                length,
                words = words.len(),
                transform = transform.name(),
                "candidate level ready"
            );
            levels.push(CandidateLevel {
                length,
                words,
                points,
            });
        }

        Ok(Self {
            dimension: transform.dimension(),
            levels,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn levels(&self) -> &[CandidateLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.levels.iter().map(|level| level.length)
    }

    /// All points of levels `0..=index`, in level order.
    pub fn cumulative(&self, index: usize) -> Result<Array2<f64>> {
        ensure!(
            index < self.levels.len(),
            "level {index} out of range ({} levels)",
            self.levels.len()
        );
        let clouds: Vec<&Array2<f64>> = self.levels[..=index].iter().map(|l| &l.points).collect();
        Ok(concat_clouds(&clouds, self.dimension)?)
    }
}
