//! Numerical backends.

use crate::error::SolveError;
use crate::problem::{ConicProblem, Constraint, LinearExpr, Sense, Solution};
use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A synchronous optimizer. Solves either return an optimum or fail; there is
/// no cancellation and no retry.
pub trait ConicSolver: Send + Sync {
    fn name(&self) -> &'static str;
    fn solve(&self, problem: &ConicProblem) -> Result<Solution, SolveError>;
}

pub type DynConicSolver = Arc<dyn ConicSolver>;

#[derive(Debug, Clone)]
pub struct ClarabelOptions {
    pub max_iter: u32,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    /// Treat `AlmostSolved` as success (with a warning).
    pub accept_almost_solved: bool,
}

impl Default for ClarabelOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol_gap_abs: 1e-9,
            tol_gap_rel: 1e-9,
            tol_feas: 1e-9,
            accept_almost_solved: true,
        }
    }
}

/// Interior-point backend built on Clarabel.
///
/// Clarabel solves `min qᵀx  s.t.  Ax + s = b, s ∈ K`. Equalities become a
/// zero cone, `expr >= 0` rows a nonnegative cone and each second-order
/// constraint its own cone, in that order.
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    options: ClarabelOptions,
}

/// Rows in Clarabel form, before they are packed into a CSC matrix.
#[derive(Debug, Default)]
struct RowBlock {
    entries: BTreeMap<(usize, usize), f64>,
    rhs: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl RowBlock {
    /// Append the row `sign·coefs` with right-hand side `rhs`.
    fn push(&mut self, expr: &LinearExpr, sign: f64, rhs: f64) {
        let row = self.rhs.len();
        for (var, coef) in expr.terms() {
            *self.entries.entry((var.index(), row)).or_insert(0.0) += sign * coef;
        }
        self.rhs.push(rhs);
    }

    fn into_csc(self, cols: usize) -> (CscMatrix<f64>, Vec<f64>, Vec<SupportedConeT<f64>>) {
        let rows = self.rhs.len();
        let mut colptr = vec![0usize; cols + 1];
        let mut rowval = Vec::with_capacity(self.entries.len());
        let mut nzval = Vec::with_capacity(self.entries.len());

        // BTreeMap iterates column-major with sorted rows.
        for ((col, row), value) in self.entries {
            if value == 0.0 {
                continue;
            }
            colptr[col + 1] += 1;
            rowval.push(row);
            nzval.push(value);
        }
        for col in 0..cols {
            colptr[col + 1] += colptr[col];
        }

        (
            CscMatrix::new(rows, cols, colptr, rowval, nzval),
            self.rhs,
            self.cones,
        )
    }
}

impl ClarabelSolver {
    pub fn new(options: ClarabelOptions) -> Self {
        Self { options }
    }

    fn settings(&self) -> DefaultSettings<f64> {
        DefaultSettings {
            verbose: false,
            max_iter: self.options.max_iter,
            tol_gap_abs: self.options.tol_gap_abs,
            tol_gap_rel: self.options.tol_gap_rel,
            tol_feas: self.options.tol_feas,
            ..DefaultSettings::default()
        }
    }

    fn infeasible(&self) -> SolveError {
        SolveError::Infeasible {
            backend: self.name().into(),
        }
    }

    /// Lay out every constraint as Clarabel rows and cones.
    ///
    /// Rows without variables are decided here: a satisfied one is dropped,
    /// a violated one makes the whole problem infeasible.
    fn assemble(&self, problem: &ConicProblem) -> Result<RowBlock, SolveError> {
        const EMPTY_ROW_TOL: f64 = 1e-12;
        let mut block = RowBlock::default();

        let mut zeros = 0;
        for constraint in problem.constraints() {
            if let Constraint::Equal(expr) = constraint {
                if expr.terms().is_empty() {
                    if expr.constant_part().abs() > EMPTY_ROW_TOL {
                        return Err(self.infeasible());
                    }
                    continue;
                }
                block.push(expr, 1.0, -expr.constant_part());
                zeros += 1;
            }
        }
        if zeros > 0 {
            block.cones.push(SupportedConeT::ZeroConeT(zeros));
        }

        let mut nonneg = 0;
        for constraint in problem.constraints() {
            if let Constraint::NonNegative(expr) = constraint {
                if expr.terms().is_empty() {
                    if expr.constant_part() < -EMPTY_ROW_TOL {
                        return Err(self.infeasible());
                    }
                    continue;
                }
                block.push(expr, -1.0, expr.constant_part());
                nonneg += 1;
            }
        }
        if nonneg > 0 {
            block.cones.push(SupportedConeT::NonnegativeConeT(nonneg));
        }

        for constraint in problem.constraints() {
            if let Constraint::SecondOrderCone(exprs) = constraint {
                for expr in exprs {
                    block.push(expr, -1.0, expr.constant_part());
                }
                block.cones.push(SupportedConeT::SecondOrderConeT(exprs.len()));
            }
        }

        Ok(block)
    }
}

impl ConicSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, problem: &ConicProblem) -> Result<Solution, SolveError> {
        problem.validate()?;
        let n = problem.num_variables();

        let sign = match problem.sense() {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let mut q = vec![0.0; n];
        for (var, coef) in problem.objective().terms() {
            q[var.index()] += sign * coef;
        }

        let (a, b, cones) = self.assemble(problem)?.into_csc(n);
        let p = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, self.settings());
        solver.solve();

        let status = solver.solution.status;
        debug!(
            backend = self.name(),
            variables = n,
            rows = b.len(),
            status = ?status,
            iterations = solver.solution.iterations,
            "conic solve finished"
        );

        match status {
            SolverStatus::Solved => {}
            SolverStatus::AlmostSolved if self.options.accept_almost_solved => {
                warn!(
                    backend = self.name(),
                    variables = n,
                    "solver reached reduced accuracy only"
                );
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                return Err(self.infeasible());
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                return Err(SolveError::Unbounded {
                    backend: self.name().into(),
                });
            }
            other => {
                return Err(SolveError::Numerical {
                    backend: self.name().into(),
                    status: format!("{other:?}"),
                });
            }
        }

        let values = solver.solution.x.clone();
        let objective = problem.objective().evaluate(&values);
        Ok(Solution { values, objective })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_lp() {
        // max x + y  s.t.  x + 2y <= 4, 3x + y <= 6, x, y >= 0  → (1.6, 1.2)
        let mut problem = ConicProblem::new();
        let x = problem.add_variable("x");
        let y = problem.add_variable("y");
        problem.nonnegative(&[x, y]);
        problem.at_least(
            LinearExpr::constant(4.0),
            LinearExpr::from(x) + LinearExpr::term(y, 2.0),
        );
        problem.at_least(
            LinearExpr::constant(6.0),
            LinearExpr::term(x, 3.0) + LinearExpr::from(y),
        );
        problem.maximize(LinearExpr::from(x) + LinearExpr::from(y));

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!((solution.value(x) - 1.6).abs() < 1e-6);
        assert!((solution.value(y) - 1.2).abs() < 1e-6);
        assert!((solution.objective - 2.8).abs() < 1e-6);
    }

    #[test]
    fn test_equality_and_cone() {
        // min t  s.t.  t >= ‖(x, y)‖, x + y = 2  → x = y = 1, t = √2
        let mut problem = ConicProblem::new();
        let t = problem.add_variable("t");
        let x = problem.add_variable("x");
        let y = problem.add_variable("y");
        problem.equal(
            LinearExpr::from(x) + LinearExpr::from(y),
            LinearExpr::constant(2.0),
        );
        problem.second_order_cone(vec![t.into(), x.into(), y.into()]);
        problem.minimize(t);

        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!((solution.objective - 2f64.sqrt()).abs() < 1e-6);
        assert!((solution.value(x) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_infeasible() {
        let mut problem = ConicProblem::new();
        let x = problem.add_variable("x");
        problem.nonnegative(&[x]);
        problem.equal(x, LinearExpr::constant(-1.0));
        problem.minimize(x);
        assert!(matches!(
            ClarabelSolver::default().solve(&problem),
            Err(SolveError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_unbounded() {
        let mut problem = ConicProblem::new();
        let x = problem.add_variable("x");
        problem.nonnegative(&[x]);
        problem.maximize(x);
        assert!(matches!(
            ClarabelSolver::default().solve(&problem),
            Err(SolveError::Unbounded { .. })
        ));
    }

    #[test]
    fn test_constant_rows_decided_up_front() {
        let mut problem = ConicProblem::new();
        let x = problem.add_variable("x");
        problem.nonnegative(&[x]);
        problem.equal(LinearExpr::constant(1.0), LinearExpr::constant(1.0));
        problem.at_least(LinearExpr::constant(1.0), x);
        problem.maximize(x);
        let solution = ClarabelSolver::default().solve(&problem).unwrap();
        assert!((solution.value(x) - 1.0).abs() < 1e-6);

        problem.equal(LinearExpr::constant(1.0), LinearExpr::constant(2.0));
        assert!(matches!(
            ClarabelSolver::default().solve(&problem),
            Err(SolveError::Infeasible { .. })
        ));
    }
}
