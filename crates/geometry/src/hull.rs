//! Convex-hull volume of 3-D point sets.
//!
//! Incremental hull: start from a non-degenerate tetrahedron, then for each
//! remaining point delete the faces it can see and stitch the horizon to it.
//! Faces are kept counter-clockwise when viewed from outside.

use crate::error::GeometryError;
use crate::points::ensure_dimension;
use ndarray::{ArrayView2, Axis};
use std::collections::HashSet;
use std::sync::Arc;

pub trait HullVolume: Send + Sync {
    fn volume(&self, points: ArrayView2<'_, f64>) -> Result<f64, GeometryError>;
}

pub type DynHullVolume = Arc<dyn HullVolume>;

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[derive(Debug, Clone)]
struct Face {
    vertices: [usize; 3],
    normal: Vec3,
    offset: f64,
    alive: bool,
}

impl Face {
    fn new(points: &[Vec3], vertices: [usize; 3]) -> Self {
        let [a, b, c] = vertices.map(|v| points[v]);
        let n = cross(sub(b, a), sub(c, a));
        let len = norm(n);
        // Zero-area faces can never be seen.
        let normal = if len > 0.0 {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0; 3]
        };
        Self {
            vertices,
            normal,
            offset: dot(normal, a),
            alive: true,
        }
    }

    fn height(&self, p: Vec3) -> f64 {
        dot(self.normal, p) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Incremental 3-D convex hull.
#[derive(Debug, Clone, Copy)]
pub struct ConvexHull3 {
    /// Relative tolerance, scaled by the extent of the point set.
    pub tolerance: f64,
}

impl Default for ConvexHull3 {
    fn default() -> Self {
        Self { tolerance: 1e-10 }
    }
}

impl ConvexHull3 {
    fn initial_simplex(&self, points: &[Vec3], eps: f64) -> Option<[usize; 4]> {
        let p0 = 0;
        let p1 = farthest(points, |p| norm(sub(p, points[p0])))?;
        if norm(sub(points[p1], points[p0])) <= eps {
            return None;
        }
        let axis = sub(points[p1], points[p0]);
        let p2 = farthest(points, |p| norm(cross(axis, sub(p, points[p0]))))?;
        let plane = cross(axis, sub(points[p2], points[p0]));
        if norm(plane) <= eps * norm(axis) {
            return None;
        }
        let p3 = farthest(points, |p| dot(plane, sub(p, points[p0])).abs())?;
        if dot(plane, sub(points[p3], points[p0])).abs() <= eps * norm(plane) {
            return None;
        }
        Some([p0, p1, p2, p3])
    }

    fn hull_volume(&self, points: &[Vec3]) -> f64 {
        if points.len() < 4 {
            return 0.0;
        }
        let extent = points
            .iter()
            .flat_map(|p| p.iter())
            .fold(0.0f64, |acc, x| acc.max(x.abs()));
        let eps = self.tolerance * extent.max(1.0);

        let Some(simplex) = self.initial_simplex(points, eps) else {
            return 0.0;
        };
        let interior = simplex.iter().fold([0.0; 3], |acc, &v| {
            let p = points[v];
            [
                acc[0] + p[0] / 4.0,
                acc[1] + p[1] / 4.0,
                acc[2] + p[2] / 4.0,
            ]
        });

        let [a, b, c, d] = simplex;
        let mut faces: Vec<Face> = [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
            .into_iter()
            .map(|[x, y, z]| {
                let face = Face::new(points, [x, y, z]);
                if face.height(interior) > 0.0 {
                    Face::new(points, [x, z, y])
                } else {
                    face
                }
            })
            .collect();

        for (index, &p) in points.iter().enumerate() {
            if simplex.contains(&index) {
                continue;
            }
            let visible: Vec<usize> = faces
                .iter()
                .enumerate()
                .filter(|(_, f)| f.alive && f.height(p) > eps)
                .map(|(i, _)| i)
                .collect();
            if visible.is_empty() {
                continue;
            }

            let edges: HashSet<(usize, usize)> = visible
                .iter()
                .flat_map(|&i| faces[i].edges())
                .collect();
            let horizon: Vec<(usize, usize)> = edges
                .iter()
                .copied()
                .filter(|&(u, v)| !edges.contains(&(v, u)))
                .collect();

            for &i in &visible {
                faces[i].alive = false;
            }
            for (u, v) in horizon {
                faces.push(Face::new(points, [u, v, index]));
            }
        }

        let volume: f64 = faces
            .iter()
            .filter(|f| f.alive)
            .map(|f| {
                let [x, y, z] = f.vertices.map(|v| sub(points[v], interior));
                dot(x, cross(y, z)) / 6.0
            })
            .sum();
        volume.abs()
    }
}

fn farthest(points: &[Vec3], score: impl Fn(Vec3) -> f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, score(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

impl HullVolume for ConvexHull3 {
    fn volume(&self, points: ArrayView2<'_, f64>) -> Result<f64, GeometryError> {
        ensure_dimension(3, points.ncols())?;
        let coords: Vec<Vec3> = points
            .axis_iter(Axis(0))
            .map(|row| [row[0], row[1], row[2]])
            .collect();
        Ok(self.hull_volume(&coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn cube() -> Array2<f64> {
        let mut rows = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    rows.extend([x, y, z]);
                }
            }
        }
        Array2::from_shape_vec((8, 3), rows).unwrap()
    }

    #[test]
    fn test_unit_cube() {
        let volume = ConvexHull3::default().volume(cube().view()).unwrap();
        assert!((volume - 1.0).abs() < 1e-9, "volume = {volume}");
    }

    #[test]
    fn test_interior_points_ignored() {
        let mut points = cube().into_raw_vec();
        points.extend([0.5, 0.5, 0.5, 0.2, 0.7, 0.1, 1.0, 0.5, 0.5]);
        let cloud = Array2::from_shape_vec((11, 3), points).unwrap();
        let volume = ConvexHull3::default().volume(cloud.view()).unwrap();
        assert!((volume - 1.0).abs() < 1e-9, "volume = {volume}");
    }

    #[test]
    fn test_tetrahedron() {
        let points = array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0]
        ];
        let volume = ConvexHull3::default().volume(points.view()).unwrap();
        assert!((volume - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_octahedron() {
        let points = array![
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0]
        ];
        let volume = ConvexHull3::default().volume(points.view()).unwrap();
        assert!((volume - 4.0 / 3.0).abs() < 1e-9, "volume = {volume}");
    }

    #[test]
    fn test_degenerate_sets_are_flat() {
        let planar = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        assert_eq!(ConvexHull3::default().volume(planar.view()).unwrap(), 0.0);
        let few = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert_eq!(ConvexHull3::default().volume(few.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_requires_three_columns() {
        let points = array![[0.0, 0.0], [1.0, 0.0]];
        assert!(ConvexHull3::default().volume(points.view()).is_err());
    }
}
