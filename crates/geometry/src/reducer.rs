//! Bounded candidate subsets.
//!
//! The solvers scale with the number of candidate points, so each solve
//! works on at most `max_count` points chosen near the target.

use crate::error::GeometryError;
use crate::points::{distances, ensure_dimension};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use std::sync::Arc;

pub trait PointReducer: Send + Sync {
    fn name(&self) -> &'static str;

    /// At most `max_count` rows of `points`, never none.
    /// Fails with [`GeometryError::EmptyPointSet`] when `points` is empty.
    fn reduce(
        &self,
        points: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
        max_count: usize,
    ) -> Result<Array2<f64>, GeometryError>;
}

pub type DynPointReducer = Arc<dyn PointReducer>;

/// Keeps the `max_count` points nearest the target; ties keep input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestReducer;

impl PointReducer for NearestReducer {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn reduce(
        &self,
        points: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
        max_count: usize,
    ) -> Result<Array2<f64>, GeometryError> {
        ensure_dimension(target.len(), points.ncols())?;
        if points.nrows() == 0 {
            return Err(GeometryError::EmptyPointSet);
        }
        let keep = max_count.max(1);
        if points.nrows() <= keep {
            return Ok(points.to_owned());
        }

        let dist = distances(points, target);
        let mut order: Vec<usize> = (0..points.nrows()).collect();
        order.sort_by(|&a, &b| dist[a].total_cmp(&dist[b]));
        order.truncate(keep);
        Ok(points.select(Axis(0), &order))
    }
}
