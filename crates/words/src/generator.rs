//! Exhaustive word enumeration.
//!
//! Words are produced in lexicographic alphabet order with the first letter
//! varying slowest, which is the order a depth-first recursion appending one
//! letter per level would visit them. The enumeration itself is an odometer
//! over base-`|A|` digits, so its depth does not grow the call stack.

use crate::alphabet::{Alphabet, Symbol, Word};
use crate::error::WordError;

/// Enumerates words of a fixed length over an alphabet.
#[derive(Debug, Clone)]
pub struct WordGenerator<'a> {
    alphabet: &'a Alphabet,
    length: usize,
}

impl<'a> WordGenerator<'a> {
    pub fn new(alphabet: &'a Alphabet, length: usize) -> Result<Self, WordError> {
        if length == 0 {
            return Err(WordError::ZeroLength);
        }
        word_count(alphabet.len(), length)?;
        Ok(Self { alphabet, length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.alphabet
    }

    /// Number of words of exactly `length` letters, before pruning.
    pub fn word_count(&self) -> usize {
        // Checked in `new`.
        self.alphabet.len().pow(self.length as u32)
    }

    /// The `index`-th word in enumeration order.
    pub fn word_at(&self, index: usize) -> Option<Word> {
        if index >= self.word_count() {
            return None;
        }
        let base = self.alphabet.len();
        let mut symbols = vec![Symbol(0); self.length];
        let mut rest = index;
        for slot in symbols.iter_mut().rev() {
            *slot = Symbol(rest % base);
            rest /= base;
        }
        Some(Word::new(symbols))
    }

    /// Lazy iterator over every word of exactly `length` letters.
    pub fn iter(&self) -> Words {
        Words {
            base: self.alphabet.len(),
            digits: vec![0; self.length],
            remaining: self.word_count(),
        }
    }

    /// All words of exactly `length` letters.
    pub fn generate_words(&self) -> Vec<Word> {
        self.iter().collect()
    }

    /// Union of all words of length `1..=length`, with the degenerate
    /// repetitions removed for every length above one.
    pub fn generate_words_up_to(&self) -> Result<Vec<Word>, WordError> {
        let mut output = Vec::new();
        for length in 1..=self.length {
            output.extend(WordGenerator::new(self.alphabet, length)?.iter());
            prune_degenerate(&mut output, self.alphabet, length)?;
        }
        Ok(output)
    }

    /// Words of exactly `length` letters with the degenerate repetitions removed.
    pub fn generate_pruned(&self) -> Result<Vec<Word>, WordError> {
        let mut output = self.generate_words();
        prune_degenerate(&mut output, self.alphabet, self.length)?;
        Ok(output)
    }
}

/// Odometer over base-`|A|` digits; the last digit turns fastest.
#[derive(Debug, Clone)]
pub struct Words {
    base: usize,
    digits: Vec<usize>,
    remaining: usize,
}

impl Iterator for Words {
    type Item = Word;

    fn next(&mut self) -> Option<Word> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let word = Word::new(self.digits.iter().copied().map(Symbol).collect());

        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.base {
                break;
            }
            *digit = 0;
        }
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Words {}

/// `symbols^length`, or an error when it overflows.
pub fn word_count(symbols: usize, length: usize) -> Result<usize, WordError> {
    u32::try_from(length)
        .ok()
        .and_then(|exp| symbols.checked_pow(exp))
        .ok_or(WordError::TooManyWords { symbols, length })
}

/// Remove every `symbol^length` word from `words`.
///
/// Lengths of one are left untouched. Each repetition must be present
/// exactly where the generator put it; a missing one means the words and the
/// alphabet or length disagree.
pub fn prune_degenerate(
    words: &mut Vec<Word>,
    alphabet: &Alphabet,
    length: usize,
) -> Result<(), WordError> {
    if length <= 1 {
        return Ok(());
    }
    for symbol in alphabet.symbols() {
        let degenerate = alphabet.repeated(symbol, length);
        let position = words
            .iter()
            .position(|word| *word == degenerate)
            .ok_or_else(|| WordError::MissingDegenerateWord {
                word: alphabet.spell(&degenerate),
                length,
            })?;
        words.remove(position);
    }
    Ok(())
}
