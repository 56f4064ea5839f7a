//! Maximal-visibility qubit state over a set of density matrices.
//!
//! Finds a PSD `ρ` and simplex weights `p₀..p_{n−2}` with
//! `ρ + (1 − tr ρ)·I/2 = Σ pᵢ Sᵢ`, maximizing `tr ρ ≤ 1`. The last state
//! only fixes `n`; it never enters the mixture.
//!
//! For `ρ = [[a, b − ic], [b + ic, d]]` positivity is exactly the cone
//! `a + d ≥ ‖(a − d, 2b, 2c)‖`, so a second-order backend suffices.

use crate::backend::ConicSolver;
use crate::error::SolveError;
use crate::problem::{ConicProblem, LinearExpr};
use ndarray::{array, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

const HERMITIAN_TOL: f64 = 1e-9;
const ZERO_VISIBILITY: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityFit {
    /// `tr ρ`
    pub visibility: f64,
    pub weights: Vec<f64>,
    /// `ρ / tr ρ`, absent when the visibility is numerically zero.
    pub state: Option<Array2<Complex64>>,
}

fn check_state(index: usize, state: &Array2<Complex64>) -> Result<(), SolveError> {
    if state.dim() != (2, 2) {
        return Err(SolveError::Malformed {
            detail: format!("state #{index} has shape {:?}, expected (2, 2)", state.dim()),
        });
    }
    let hermitian = (state[[0, 1]] - state[[1, 0]].conj()).norm() <= HERMITIAN_TOL
        && state[[0, 0]].im.abs() <= HERMITIAN_TOL
        && state[[1, 1]].im.abs() <= HERMITIAN_TOL;
    if !hermitian {
        return Err(SolveError::Malformed {
            detail: format!("state #{index} is not Hermitian"),
        });
    }
    let trace = state[[0, 0]].re + state[[1, 1]].re;
    if (trace - 1.0).abs() > 1e-6 {
        return Err(SolveError::Malformed {
            detail: format!("state #{index} has trace {trace}"),
        });
    }
    Ok(())
}

pub fn solve_visibility(
    solver: &dyn ConicSolver,
    states: &[Array2<Complex64>],
) -> Result<VisibilityFit, SolveError> {
    if states.is_empty() {
        return Err(SolveError::EmptyCandidates);
    }
    if states.len() < 2 {
        return Err(SolveError::TooFewCandidates {
            required: 2,
            actual: states.len(),
        });
    }
    for (index, state) in states.iter().enumerate() {
        check_state(index, state)?;
    }
    let mixed = &states[..states.len() - 1];

    let mut problem = ConicProblem::new();
    let a = problem.add_variable("rho_00");
    let b = problem.add_variable("rho_re");
    let c = problem.add_variable("rho_im");
    let d = problem.add_variable("rho_11");
    let p = problem.add_variables("p", mixed.len());

    let trace = LinearExpr::from(a) + LinearExpr::from(d);
    problem.second_order_cone(vec![
        trace.clone(),
        LinearExpr::from(a) - LinearExpr::from(d),
        LinearExpr::term(b, 2.0),
        LinearExpr::term(c, 2.0),
    ]);
    problem.at_least(LinearExpr::constant(1.0), trace.clone());
    problem.nonnegative(&p);
    problem.equal(LinearExpr::sum(&p), LinearExpr::constant(1.0));

    // The noise term (1 − tr ρ)·I/2 only touches the diagonal sum, which the
    // simplex already fixes; the remaining real degrees of freedom are the
    // diagonal difference and the off-diagonal entry.
    problem.equal(
        LinearExpr::from(a) - LinearExpr::from(d),
        LinearExpr::weighted(&p, mixed.iter().map(|s| s[[0, 0]].re - s[[1, 1]].re)),
    );
    problem.equal(b, LinearExpr::weighted(&p, mixed.iter().map(|s| s[[1, 0]].re)));
    problem.equal(c, LinearExpr::weighted(&p, mixed.iter().map(|s| s[[1, 0]].im)));
    problem.maximize(trace);

    let solution = solver.solve(&problem)?;
    let visibility = solution.objective;
    let weights = solution
        .values_of(&p)
        .into_iter()
        .map(|w| w.max(0.0))
        .collect();

    let state = (visibility > ZERO_VISIBILITY).then(|| {
        let [a, b, c, d] = [a, b, c, d].map(|v| solution.value(v) / visibility);
        array![
            [Complex64::new(a, 0.0), Complex64::new(b, -c)],
            [Complex64::new(b, c), Complex64::new(d, 0.0)]
        ]
    });

    Ok(VisibilityFit {
        visibility,
        weights,
        state,
    })
}
