//! Single-qubit gate library in the Bloch-sphere picture.
//!
//! A unitary gate acts on Bloch vectors as a rotation; a noisy gate is the
//! rotation followed by depolarizing noise, which contracts the sphere
//! uniformly by the gate visibility.

use crate::error::GeometryError;
use ndarray::{array, Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use wordhull_words::{Alphabet, Symbol, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    T,
    /// π/4 rotation about the x axis.
    R,
}

impl Gate {
    pub fn from_label(label: &str) -> Result<Self, GeometryError> {
        let gate = match label {
            "I" => Gate::I,
            "X" => Gate::X,
            "Y" => Gate::Y,
            "Z" => Gate::Z,
            "H" => Gate::H,
            "S" => Gate::S,
            "T" => Gate::T,
            "R" => Gate::R,
            other => {
                return Err(GeometryError::UnknownGate {
                    label: other.to_string(),
                })
            }
        };
        Ok(gate)
    }

    /// Rotation matrix acting on Bloch vectors.
    pub fn rotation(self) -> Array2<f64> {
        let c = FRAC_1_SQRT_2;
        match self {
            Gate::I => Array2::eye(3),
            Gate::X => array![[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
            Gate::Y => array![[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
            Gate::Z => array![[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
            Gate::H => array![[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]],
            Gate::S => array![[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            Gate::T => array![[c, -c, 0.0], [c, c, 0.0], [0.0, 0.0, 1.0]],
            Gate::R => array![[1.0, 0.0, 0.0], [0.0, c, -c], [0.0, c, c]],
        }
    }
}

/// Noisy Bloch matrices for every symbol of an alphabet.
#[derive(Debug, Clone)]
pub struct GateSet {
    matrices: Vec<Array2<f64>>,
    visibility: f64,
}

impl GateSet {
    pub fn new(alphabet: &Alphabet, visibility: f64) -> Result<Self, GeometryError> {
        if !(visibility > 0.0 && visibility <= 1.0) {
            return Err(GeometryError::InvalidVisibility { value: visibility });
        }
        let matrices = alphabet
            .labels()
            .iter()
            .map(|label| Ok(Gate::from_label(label)?.rotation() * visibility))
            .collect::<Result<Vec<_>, GeometryError>>()?;
        Ok(Self {
            matrices,
            visibility,
        })
    }

    pub fn visibility(&self) -> f64 {
        self.visibility
    }

    pub fn matrix(&self, symbol: Symbol) -> Result<&Array2<f64>, GeometryError> {
        self.matrices
            .get(symbol.index())
            .ok_or(GeometryError::UnknownSymbol {
                index: symbol.index(),
                len: self.matrices.len(),
            })
    }

    /// Bloch matrix of the composed channel; the first letter acts first.
    pub fn word_matrix(&self, word: &Word) -> Result<Array2<f64>, GeometryError> {
        let mut acc = Array2::<f64>::eye(3);
        for symbol in word.symbols() {
            acc = self.matrix(*symbol)?.dot(&acc);
        }
        Ok(acc)
    }

    /// Image of the |0⟩ Bloch vector under the word's channel.
    pub fn word_state(&self, word: &Word) -> Result<Array1<f64>, GeometryError> {
        let ground = array![0.0, 0.0, 1.0];
        Ok(self.word_matrix(word)?.dot(&ground))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Array1<f64>, b: &Array1<f64>) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn test_rotations_are_orthogonal() {
        for gate in [
            Gate::I,
            Gate::X,
            Gate::Y,
            Gate::Z,
            Gate::H,
            Gate::S,
            Gate::T,
            Gate::R,
        ] {
            let m = gate.rotation();
            let product = m.t().dot(&m);
            let eye = Array2::<f64>::eye(3);
            assert!(product
                .iter()
                .zip(eye.iter())
                .all(|(a, b)| (a - b).abs() < 1e-12));
        }
    }

    #[test]
    fn test_hadamard_maps_zero_to_plus() {
        let alphabet = Alphabet::new(["H", "T"]).unwrap();
        let gates = GateSet::new(&alphabet, 1.0).unwrap();
        let h = Word::new(vec![Symbol(0)]);
        assert!(close(&gates.word_state(&h).unwrap(), &array![1.0, 0.0, 0.0]));

        // H then T rotates |+⟩ by π/4 about z.
        let ht = Word::new(vec![Symbol(0), Symbol(1)]);
        let c = FRAC_1_SQRT_2;
        assert!(close(&gates.word_state(&ht).unwrap(), &array![c, c, 0.0]));
    }

    #[test]
    fn test_visibility_contracts_per_letter() {
        let alphabet = Alphabet::new(["I"]).unwrap();
        let gates = GateSet::new(&alphabet, 0.9).unwrap();
        let word = Word::new(vec![Symbol(0); 3]);
        let state = gates.word_state(&word).unwrap();
        assert!((state[2] - 0.9f64.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let alphabet = Alphabet::new(["H", "Q"]).unwrap();
        assert_eq!(
            GateSet::new(&alphabet, 1.0).unwrap_err(),
            GeometryError::UnknownGate { label: "Q".into() }
        );
        let alphabet = Alphabet::new(["H"]).unwrap();
        assert!(GateSet::new(&alphabet, 0.0).is_err());
        assert!(GateSet::new(&alphabet, 1.5).is_err());
    }
}
