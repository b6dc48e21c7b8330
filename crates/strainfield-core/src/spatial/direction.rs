//! Direction type for grid orientation.
//!
//! Direction matrices relate integer grid axes to physical axes.

use super::Vector;
use crate::linalg;
use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

/// Direction matrix representing the orientation of grid axes.
///
/// Column i is the direction of the i-th grid axis in physical space. A valid
/// direction matrix is orthonormal (determinant ±1); the strain filter
/// rejects anything else before generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction<const D: usize>(pub SMatrix<f64, D, D>);

impl<const D: usize> Direction<D> {
    /// Create an identity direction matrix (grid axes aligned with physical axes).
    pub fn identity() -> Self {
        Self(SMatrix::identity())
    }

    /// Create a zero matrix.
    pub fn zeros() -> Self {
        Self(SMatrix::zeros())
    }

    /// Check whether the matrix is orthonormal, i.e. its product with its
    /// transpose is the identity within 1e-6.
    pub fn is_orthonormal(&self) -> bool {
        let product = self.0 * self.0.transpose();
        (0..D).all(|i| {
            (0..D).all(|j| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (product[(i, j)] - expected).abs() < 1e-6
            })
        })
    }

    /// Compute the determinant of the direction matrix.
    pub fn determinant(&self) -> f64 {
        linalg::determinant(&self.0)
    }

    /// Try to compute the inverse of the direction matrix.
    pub fn try_inverse(&self) -> Option<Self> {
        linalg::try_invert(&self.0, 1e-12).map(Self)
    }

    /// Get the direction of one grid axis as a physical-space vector.
    pub fn axis_direction(&self, axis: usize) -> Vector<D> {
        let mut v = Vector::zeros();
        for j in 0..D {
            v[j] = self.0[(j, axis)];
        }
        v
    }

    /// Get the inner nalgebra matrix.
    pub fn inner(&self) -> &SMatrix<f64, D, D> {
        &self.0
    }

    /// Get mutable reference to the inner nalgebra matrix.
    pub fn inner_mut(&mut self) -> &mut SMatrix<f64, D, D> {
        &mut self.0
    }
}

impl<const D: usize> std::ops::Index<(usize, usize)> for Direction<D> {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> std::ops::IndexMut<(usize, usize)> for Direction<D> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<const D: usize> std::ops::Mul for Direction<D> {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Self(self.0 * other.0)
    }
}

impl<const D: usize> std::ops::Mul<Vector<D>> for Direction<D> {
    type Output = Vector<D>;

    fn mul(self, vector: Vector<D>) -> Self::Output {
        Vector(self.0 * vector.0)
    }
}
