//! Convex-combination fits of a target over a candidate point cloud.
//!
//! Candidates are the rows of an `n × d` matrix. Every fit checks that the
//! cloud is non-empty and `d`-dimensional like the target before anything is
//! built, so an empty cloud never reaches a backend.

use crate::backend::ConicSolver;
use crate::error::SolveError;
use crate::problem::{ConicProblem, LinearExpr, Variable};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use wordhull_geometry::{distances, euclidean};

/// LP1: largest `t` with `t·T` inside the convex hull of the candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipFit {
    pub visibility: f64,
    pub weights: Vec<f64>,
    /// `Σ pᵢ vᵢ`
    pub point: Array1<f64>,
    pub distance: f64,
}

/// LP2: `t·T + Σ qᵢ vᵢ = Σ rᵢ vᵢ` with `Σ r = 1`, `Σ q = 1 − t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureFit {
    pub visibility: f64,
    pub weights: Vec<f64>,
    pub noise_weights: Vec<f64>,
    /// `Σ rᵢ vᵢ`
    pub point: Array1<f64>,
    /// `Σ qᵢ vᵢ`
    pub noise: Array1<f64>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestFit {
    pub index: usize,
    pub point: Array1<f64>,
    pub distance: f64,
}

fn check_candidates(
    candidates: ArrayView2<'_, f64>,
    target: ArrayView1<'_, f64>,
) -> Result<(), SolveError> {
    if candidates.nrows() == 0 {
        return Err(SolveError::EmptyCandidates);
    }
    if candidates.ncols() != target.len() {
        return Err(SolveError::DimensionMismatch {
            candidates: candidates.ncols(),
            target: target.len(),
        });
    }
    Ok(())
}

/// Add one equality per coordinate, `expr(k) == 0` for `k in 0..dimension`.
pub fn coordinate_equalities(
    problem: &mut ConicProblem,
    dimension: usize,
    mut expr: impl FnMut(usize) -> LinearExpr,
) {
    for k in 0..dimension {
        problem.equal(expr(k), LinearExpr::constant(0.0));
    }
}

/// `Σ weights[i] · candidates[i, k]` as an expression.
fn coordinate(weights: &[Variable], candidates: ArrayView2<'_, f64>, k: usize) -> LinearExpr {
    LinearExpr::weighted(weights, candidates.column(k).iter().copied())
}

/// Non-negative simplex weights summing to `total`.
fn simplex(problem: &mut ConicProblem, prefix: &str, n: usize, total: LinearExpr) -> Vec<Variable> {
    let weights = problem.add_variables(prefix, n);
    problem.nonnegative(&weights);
    problem.equal(LinearExpr::sum(&weights), total);
    weights
}

/// Solver output is only feasible up to tolerance; clamp tiny negatives.
fn clean(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|w| w.max(0.0)).collect()
}

fn combine(candidates: ArrayView2<'_, f64>, weights: &[f64]) -> Array1<f64> {
    candidates.t().dot(&ArrayView1::from(weights))
}

pub fn solve_membership(
    solver: &dyn ConicSolver,
    candidates: ArrayView2<'_, f64>,
    target: ArrayView1<'_, f64>,
) -> Result<MembershipFit, SolveError> {
    check_candidates(candidates, target)?;
    let n = candidates.nrows();

    let mut problem = ConicProblem::new();
    let p = simplex(&mut problem, "p", n, LinearExpr::constant(1.0));
    let t = problem.add_variable("t");
    coordinate_equalities(&mut problem, target.len(), |k| {
        LinearExpr::term(t, target[k]) - coordinate(&p, candidates, k)
    });
    problem.maximize(t);

    let solution = solver.solve(&problem)?;
    let weights = clean(solution.values_of(&p));
    let point = combine(candidates, &weights);
    let distance = euclidean(point.view(), target);
    Ok(MembershipFit {
        visibility: solution.value(t),
        weights,
        point,
        distance,
    })
}

pub fn solve_mixture(
    solver: &dyn ConicSolver,
    candidates: ArrayView2<'_, f64>,
    target: ArrayView1<'_, f64>,
) -> Result<MixtureFit, SolveError> {
    check_candidates(candidates, target)?;
    let n = candidates.nrows();

    let mut problem = ConicProblem::new();
    let t = problem.add_variable("t");
    let r = simplex(&mut problem, "r", n, LinearExpr::constant(1.0));
    let q = simplex(&mut problem, "q", n, LinearExpr::constant(1.0) - t.into());
    coordinate_equalities(&mut problem, target.len(), |k| {
        LinearExpr::term(t, target[k]) + coordinate(&q, candidates, k)
            - coordinate(&r, candidates, k)
    });
    problem.maximize(t);

    let solution = solver.solve(&problem)?;
    let weights = clean(solution.values_of(&r));
    let noise_weights = clean(solution.values_of(&q));
    let point = combine(candidates, &weights);
    let noise = combine(candidates, &noise_weights);
    let distance = euclidean(point.view(), target);
    Ok(MixtureFit {
        visibility: solution.value(t),
        weights,
        noise_weights,
        point,
        noise,
        distance,
    })
}

/// The single candidate closest to the target; the first one wins ties.
pub fn nearest_point(
    candidates: ArrayView2<'_, f64>,
    target: ArrayView1<'_, f64>,
) -> Result<NearestFit, SolveError> {
    check_candidates(candidates, target)?;
    let (index, distance) = distances(candidates, target)
        .into_iter()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best });
    Ok(NearestFit {
        index,
        point: candidates.index_axis(Axis(0), index).to_owned(),
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ClarabelSolver;
    use ndarray::{array, Array2};
    use proptest::prelude::*;

    #[test]
    fn test_membership_picks_matching_point() -> anyhow::Result<()> {
        let candidates = array![[1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]];
        let target = array![1.0, 0.0, 0.0];
        let fit = solve_membership(&ClarabelSolver::default(), candidates.view(), target.view())?;
        assert!((fit.visibility - 1.0).abs() < 1e-6, "t1 = {}", fit.visibility);
        assert!((fit.weights[0] - 1.0).abs() < 1e-5);
        assert!(fit.weights[1].abs() < 1e-5);
        assert!(fit.distance < 1e-5);
        Ok(())
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let candidates = Array2::<f64>::zeros((0, 3));
        let target = array![1.0, 0.0, 0.0];
        let solver = ClarabelSolver::default();
        assert_eq!(
            solve_membership(&solver, candidates.view(), target.view()),
            Err(SolveError::EmptyCandidates)
        );
        assert_eq!(
            solve_mixture(&solver, candidates.view(), target.view()),
            Err(SolveError::EmptyCandidates)
        );
        assert_eq!(
            nearest_point(candidates.view(), target.view()),
            Err(SolveError::EmptyCandidates)
        );
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let candidates = array![[1.0, 0.0], [0.0, 1.0]];
        let target = array![1.0, 0.0, 0.0];
        assert_eq!(
            nearest_point(candidates.view(), target.view()),
            Err(SolveError::DimensionMismatch {
                candidates: 2,
                target: 3
            })
        );
    }

    fn octahedron() -> Array2<f64> {
        array![
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0]
        ]
    }

    #[test]
    fn test_octahedron_fits() -> anyhow::Result<()> {
        let s = 1.0 / 3f64.sqrt();
        let target = array![s, s, s];
        let candidates = octahedron();
        let solver = ClarabelSolver::default();

        let lp1 = solve_membership(&solver, candidates.view(), target.view())?;
        assert!((lp1.visibility - s).abs() < 1e-6, "t1 = {}", lp1.visibility);
        assert!((lp1.weights.iter().sum::<f64>() - 1.0).abs() < 1e-6);

        let lp2 = solve_mixture(&solver, candidates.view(), target.view())?;
        assert!(lp2.visibility >= lp1.visibility - 1e-6);
        let residual = &lp2.point - &lp2.noise - &target * lp2.visibility;
        assert!(residual.iter().all(|x| x.abs() < 1e-5));

        let nearest = nearest_point(candidates.view(), target.view())?;
        assert!([0, 2, 4].contains(&nearest.index));
        assert!(nearest.distance >= lp1.distance);
        Ok(())
    }

    #[test]
    fn test_nearest_prefers_first_on_ties() -> anyhow::Result<()> {
        let candidates = array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        let target = array![0.0, 1.0];
        let fit = nearest_point(candidates.view(), target.view())?;
        assert_eq!(fit.index, 0);
        assert_eq!(fit.distance, 0.0);
        Ok(())
    }

    #[test]
    fn test_channel_dimension() -> anyhow::Result<()> {
        let identity = Array1::from(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let flip = Array1::from(vec![1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0]);
        let candidates = ndarray::stack(Axis(0), &[identity.view(), flip.view()])?;
        let fit = solve_membership(&ClarabelSolver::default(), candidates.view(), identity.view())?;
        assert!((fit.visibility - 1.0).abs() < 1e-6);
        assert!(fit.distance < 1e-5);
        Ok(())
    }

    fn unit(v: [f64; 3]) -> Option<Array1<f64>> {
        let len = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        (len > 1e-3).then(|| Array1::from(v.to_vec()) / len)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 24,
            .. ProptestConfig::default()
        })]

        // Symmetric clouds contain the origin, so LP2 is a relaxation of LP1.
        #[test]
        fn proptest_mixture_dominates_membership(
            raw in prop::collection::vec(prop::array::uniform3(-1.0f64..1.0), 2..6),
            dir in prop::array::uniform3(-1.0f64..1.0),
        ) {
            let Some(target) = unit(dir) else { return Ok(()); };
            let mut rows = Vec::new();
            for v in &raw {
                rows.extend_from_slice(v);
                rows.extend(v.iter().map(|x| -x));
            }
            let candidates = Array2::from_shape_vec((raw.len() * 2, 3), rows).unwrap();
            let solver = ClarabelSolver::default();
            let lp1 = solve_membership(&solver, candidates.view(), target.view()).unwrap();
            let lp2 = solve_mixture(&solver, candidates.view(), target.view()).unwrap();
            prop_assert!(lp2.visibility >= lp1.visibility - 1e-6,
                "t1 = {}, t2 = {}", lp1.visibility, lp2.visibility);
        }
    }
}
