//! Word → point transforms.

use crate::error::GeometryError;
use crate::gates::GateSet;
use crate::points::stack_rows;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::sync::Arc;
use wordhull_words::Word;

/// Deterministic map from a word to a point of fixed dimension.
pub trait WordTransform: Send + Sync {
    fn name(&self) -> &'static str;
    fn dimension(&self) -> usize;
    fn point(&self, word: &Word) -> Result<Array1<f64>, GeometryError>;

    /// Points for every word, one row per word in the same order.
    fn points(&self, words: &[Word]) -> Result<Array2<f64>, GeometryError> {
        let rows = words
            .par_iter()
            .map(|word| self.point(word))
            .collect::<Result<Vec<_>, _>>()?;
        stack_rows(&rows, self.dimension())
    }
}

pub type DynWordTransform = Arc<dyn WordTransform>;

/// Bloch vector reached from |0⟩ by applying the word's gates.
#[derive(Debug, Clone)]
pub struct BlochStates {
    gates: GateSet,
}

impl BlochStates {
    pub fn new(gates: GateSet) -> Self {
        Self { gates }
    }
}

impl WordTransform for BlochStates {
    fn name(&self) -> &'static str {
        "bloch-states"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn point(&self, word: &Word) -> Result<Array1<f64>, GeometryError> {
        self.gates.word_state(word)
    }
}

/// Bloch matrix of the word's channel, flattened row-major.
#[derive(Debug, Clone)]
pub struct BlochChannels {
    gates: GateSet,
}

impl BlochChannels {
    pub fn new(gates: GateSet) -> Self {
        Self { gates }
    }
}

impl WordTransform for BlochChannels {
    fn name(&self) -> &'static str {
        "bloch-channels"
    }

    fn dimension(&self) -> usize {
        9
    }

    fn point(&self, word: &Word) -> Result<Array1<f64>, GeometryError> {
        let matrix = self.gates.word_matrix(word)?;
        Ok(matrix.iter().copied().collect())
    }
}
