//! Qubit density matrices.

use crate::error::GeometryError;
use crate::points::ensure_dimension;
use ndarray::{array, Array1, Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;

/// `(I + r·σ) / 2` for a Bloch vector `r`.
pub fn density_from_bloch(r: ArrayView1<'_, f64>) -> Result<Array2<Complex64>, GeometryError> {
    ensure_dimension(3, r.len())?;
    let (x, y, z) = (r[0], r[1], r[2]);
    Ok(array![
        [Complex64::new((1.0 + z) / 2.0, 0.0), Complex64::new(x / 2.0, -y / 2.0)],
        [Complex64::new(x / 2.0, y / 2.0), Complex64::new((1.0 - z) / 2.0, 0.0)]
    ])
}

/// Bloch vector of a 2×2 Hermitian matrix, ignoring its trace.
pub fn bloch_from_density(rho: ArrayView2<'_, Complex64>) -> Result<Array1<f64>, GeometryError> {
    ensure_dimension(2, rho.nrows())?;
    ensure_dimension(2, rho.ncols())?;
    let lower = rho[[1, 0]];
    Ok(array![
        2.0 * lower.re,
        2.0 * lower.im,
        rho[[0, 0]].re - rho[[1, 1]].re
    ])
}
