//! Errors raised while building alphabets and enumerating words.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WordError {
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,
    #[error("alphabet label {label:?} appears more than once")]
    DuplicateSymbol { label: String },
    #[error("alphabet labels must not be empty")]
    EmptyLabel,
    #[error("word length must be at least 1")]
    ZeroLength,
    #[error("{symbols}^{length} words do not fit in usize")]
    TooManyWords { symbols: usize, length: usize },
    #[error("degenerate word {word:?} of length {length} was never generated")]
    MissingDegenerateWord { word: String, length: usize },
}
