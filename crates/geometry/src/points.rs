//! Point-cloud helpers shared by the transforms, reducer and solver.
//!
//! A point cloud is an `Array2<f64>` with one point per row.

use crate::error::GeometryError;
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Euclidean distance between two points of equal dimension.
pub fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

pub fn ensure_dimension(expected: usize, actual: usize) -> Result<(), GeometryError> {
    if expected != actual {
        return Err(GeometryError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Stack equally sized rows into a point cloud of width `dimension`.
pub fn stack_rows(rows: &[Array1<f64>], dimension: usize) -> Result<Array2<f64>, GeometryError> {
    let mut cloud = Array2::zeros((rows.len(), dimension));
    for (mut dst, row) in cloud.axis_iter_mut(Axis(0)).zip(rows) {
        ensure_dimension(dimension, row.len())?;
        dst.assign(row);
    }
    Ok(cloud)
}

/// Concatenate point clouds of the same width, in order.
pub fn concat_clouds(clouds: &[&Array2<f64>], dimension: usize) -> Result<Array2<f64>, GeometryError> {
    for cloud in clouds {
        ensure_dimension(dimension, cloud.ncols())?;
    }
    let views: Vec<ArrayView2<'_, f64>> = clouds.iter().map(|c| c.view()).collect();
    if views.is_empty() {
        return Ok(Array2::zeros((0, dimension)));
    }
    concatenate(Axis(0), &views).map_err(|_| GeometryError::DimensionMismatch {
        expected: dimension,
        actual: clouds.first().map(|c| c.ncols()).unwrap_or(0),
    })
}

/// Distances from every row of `points` to `target`.
pub fn distances(points: ArrayView2<'_, f64>, target: ArrayView1<'_, f64>) -> Vec<f64> {
    points
        .axis_iter(Axis(0))
        .map(|row| euclidean(row, target))
        .collect()
}
