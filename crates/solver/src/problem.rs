//! Backend-neutral conic problem model.
//!
//! Problems are built from named scalar variables, sparse affine
//! expressions and three constraint kinds: `expr == 0`, `expr >= 0` and
//! second-order-cone membership `exprs[0] >= ‖exprs[1..]‖₂`.

use crate::error::SolveError;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

impl Variable {
    pub fn index(self) -> usize {
        self.0
    }
}

/// `Σ coef·var + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Variable, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(var: Variable, coef: f64) -> Self {
        Self {
            terms: vec![(var, coef)],
            constant: 0.0,
        }
    }

    /// `Σ vars`.
    pub fn sum(vars: &[Variable]) -> Self {
        Self {
            terms: vars.iter().map(|&v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// `Σ coefs[i]·vars[i]`.
    pub fn weighted(vars: &[Variable], coefs: impl IntoIterator<Item = f64>) -> Self {
        Self {
            terms: vars.iter().copied().zip(coefs).collect(),
            constant: 0.0,
        }
    }

    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

impl From<Variable> for LinearExpr {
    fn from(var: Variable) -> Self {
        Self::term(var, 1.0)
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Add<f64> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: f64) -> LinearExpr {
        self.constant += rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + (-rhs)
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> LinearExpr {
        for (_, coef) in &mut self.terms {
            *coef *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `expr == 0`
    Equal(LinearExpr),
    /// `expr >= 0`
    NonNegative(LinearExpr),
    /// `exprs[0] >= ‖exprs[1..]‖₂`
    SecondOrderCone(Vec<LinearExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone)]
pub struct ConicProblem {
    names: Vec<String>,
    sense: Sense,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
}

impl Default for ConicProblem {
    fn default() -> Self {
        Self::new()
    }
}

impl ConicProblem {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            sense: Sense::Minimize,
            objective: LinearExpr::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_variable(&mut self, name: impl Into<String>) -> Variable {
        self.names.push(name.into());
        Variable(self.names.len() - 1)
    }

    /// `count` variables named `prefix[0]`, `prefix[1]`, …
    pub fn add_variables(&mut self, prefix: &str, count: usize) -> Vec<Variable> {
        (0..count)
            .map(|i| self.add_variable(format!("{prefix}[{i}]")))
            .collect()
    }

    pub fn maximize(&mut self, objective: impl Into<LinearExpr>) {
        self.sense = Sense::Maximize;
        self.objective = objective.into();
    }

    pub fn minimize(&mut self, objective: impl Into<LinearExpr>) {
        self.sense = Sense::Minimize;
        self.objective = objective.into();
    }

    /// `lhs == rhs`
    pub fn equal(&mut self, lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) {
        self.constraints
            .push(Constraint::Equal(lhs.into() - rhs.into()));
    }

    /// `lhs >= rhs`
    pub fn at_least(&mut self, lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) {
        self.constraints
            .push(Constraint::NonNegative(lhs.into() - rhs.into()));
    }

    pub fn nonnegative(&mut self, vars: &[Variable]) {
        self.constraints.extend(
            vars.iter()
                .map(|&v| Constraint::NonNegative(LinearExpr::from(v))),
        );
    }

    pub fn second_order_cone(&mut self, exprs: Vec<LinearExpr>) {
        self.constraints.push(Constraint::SecondOrderCone(exprs));
    }

    pub fn num_variables(&self) -> usize {
        self.names.len()
    }

    pub fn variable_name(&self, var: Variable) -> Option<&str> {
        self.names.get(var.0).map(String::as_str)
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Check that every expression refers to declared variables.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.names.is_empty() {
            return Err(SolveError::Malformed {
                detail: "problem has no variables".into(),
            });
        }
        let check = |expr: &LinearExpr| -> Result<(), SolveError> {
            for (var, coef) in expr.terms() {
                if var.0 >= self.names.len() {
                    return Err(SolveError::Malformed {
                        detail: format!("variable #{} is not declared", var.0),
                    });
                }
                if !coef.is_finite() {
                    return Err(SolveError::Malformed {
                        detail: format!(
                            "coefficient of {} is not finite",
                            self.names[var.0]
                        ),
                    });
                }
            }
            if !expr.constant_part().is_finite() {
                return Err(SolveError::Malformed {
                    detail: "constant term is not finite".into(),
                });
            }
            Ok(())
        };

        check(&self.objective)?;
        for constraint in &self.constraints {
            match constraint {
                Constraint::Equal(expr) | Constraint::NonNegative(expr) => check(expr)?,
                Constraint::SecondOrderCone(exprs) => {
                    if exprs.len() < 2 {
                        return Err(SolveError::Malformed {
                            detail: "second-order cone needs at least two entries".into(),
                        });
                    }
                    exprs.iter().try_for_each(&check)?;
                }
            }
        }
        Ok(())
    }
}

/// Optimal assignment returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: Vec<f64>,
    pub objective: f64,
}

impl Solution {
    pub fn value(&self, var: Variable) -> f64 {
        self.values.get(var.0).copied().unwrap_or(f64::NAN)
    }

    pub fn values_of(&self, vars: &[Variable]) -> Vec<f64> {
        vars.iter().map(|&v| self.value(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_arithmetic() {
        let mut problem = ConicProblem::new();
        let x = problem.add_variable("x");
        let y = problem.add_variable("y");
        let expr = (LinearExpr::term(x, 2.0) + 1.0) - LinearExpr::term(y, 3.0) * 2.0;
        assert_eq!(expr.evaluate(&[1.0, 1.0]), -3.0);
        assert_eq!(problem.variable_name(y), Some("y"));
    }

    #[test]
    fn test_named_variable_blocks() {
        let mut problem = ConicProblem::new();
        let p = problem.add_variables("p", 3);
        assert_eq!(problem.num_variables(), 3);
        assert_eq!(problem.variable_name(p[2]), Some("p[2]"));
    }

    #[test]
    fn test_validate_rejects_foreign_variables() {
        let mut other = ConicProblem::new();
        other.add_variable("a");
        let stray = other.add_variable("b");

        let mut problem = ConicProblem::new();
        problem.add_variable("only");
        problem.equal(stray, LinearExpr::constant(0.0));
        assert!(matches!(
            problem.validate(),
            Err(SolveError::Malformed { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_short_cone() {
        let mut problem = ConicProblem::new();
        let x = problem.add_variable("x");
        problem.second_order_cone(vec![LinearExpr::from(x)]);
        assert!(problem.validate().is_err());
    }
}
