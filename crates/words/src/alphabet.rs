//! Alphabets, symbols and words.

use crate::error::WordError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Position of a generator inside its [`Alphabet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub usize);

impl Symbol {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered, duplicate-free set of generator labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Alphabet {
    labels: Vec<String>,
}

impl Alphabet {
    pub fn new<I, S>(labels: I) -> Result<Self, WordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(WordError::EmptyAlphabet);
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.is_empty() {
                return Err(WordError::EmptyLabel);
            }
            if !seen.insert(label.as_str()) {
                return Err(WordError::DuplicateSymbol {
                    label: label.clone(),
                });
            }
        }

        Ok(Self { labels })
    }

    /// Parse a comma separated label list such as `"H,T,X"`.
    pub fn parse(spec: &str) -> Result<Self, WordError> {
        Self::new(
            spec.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty()),
        )
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.labels.len()).map(Symbol)
    }

    pub fn label(&self, symbol: Symbol) -> Option<&str> {
        self.labels.get(symbol.0).map(String::as_str)
    }

    pub fn symbol(&self, label: &str) -> Option<Symbol> {
        self.labels.iter().position(|l| l == label).map(Symbol)
    }

    /// Concatenate the labels of `word`.
    pub fn spell(&self, word: &Word) -> String {
        word.symbols()
            .iter()
            .filter_map(|s| self.label(*s))
            .collect()
    }

    /// The word made of `symbol` repeated `length` times.
    pub fn repeated(&self, symbol: Symbol, length: usize) -> Word {
        Word::new(vec![symbol; length])
    }
}

impl TryFrom<Vec<String>> for Alphabet {
    type Error = WordError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<Alphabet> for Vec<String> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.labels
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.labels.join(", "))
    }
}

/// Immutable sequence of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Word {
    symbols: Vec<Symbol>,
}

impl Word {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// True when every letter is the same symbol.
    pub fn is_repetition(&self) -> bool {
        match self.symbols.split_first() {
            Some((first, rest)) => rest.iter().all(|s| s == first),
            None => false,
        }
    }
}
