//! Affine transform implementation.

use super::trait_::{Jacobian, Transform};
use crate::error::Result;
use crate::spatial::{Point, Vector};
use nalgebra::SMatrix;

/// Affine transform (linear transformation + translation) with a fixed
/// center:
///
/// `T(x) = A(x - c) + c + t`
///
/// where A is a D×D matrix (rotation, scale, shear), t a translation vector
/// and c the fixed center. The spatial Jacobian is the constant matrix A.
#[derive(Debug, Clone)]
pub struct AffineTransform<const D: usize> {
    matrix: SMatrix<f64, D, D>,
    translation: Vector<D>,
    center: Point<D>,
}

impl<const D: usize> AffineTransform<D> {
    /// Create a new affine transform.
    pub fn new(matrix: SMatrix<f64, D, D>, translation: Vector<D>, center: Point<D>) -> Self {
        Self {
            matrix,
            translation,
            center,
        }
    }

    /// Create an identity affine transform.
    pub fn identity() -> Self {
        Self::new(SMatrix::identity(), Vector::zeros(), Point::origin())
    }

    /// Get the linear part.
    pub fn matrix(&self) -> &SMatrix<f64, D, D> {
        &self.matrix
    }

    /// Get the translation vector.
    pub fn translation(&self) -> &Vector<D> {
        &self.translation
    }

    /// Get the fixed center.
    pub fn center(&self) -> &Point<D> {
        &self.center
    }
}

impl<const D: usize> Transform<D> for AffineTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        let centered = *point - self.center;
        Point(self.center.0 + self.matrix * centered.0 + self.translation.0)
    }

    fn jacobian(&self, _point: &Point<D>) -> Result<Jacobian<D>> {
        Ok(self.matrix)
    }
}
