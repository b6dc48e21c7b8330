//! Translation transform implementation.

use super::trait_::{Jacobian, Transform};
use crate::error::Result;
use crate::spatial::{Point, Vector};
use nalgebra::SMatrix;

/// Pure translation: `T(x) = x + offset`.
///
/// The displacement field is constant, so the spatial Jacobian is the
/// identity and every strain formulation vanishes.
#[derive(Debug, Clone)]
pub struct TranslationTransform<const D: usize> {
    offset: Vector<D>,
}

impl<const D: usize> TranslationTransform<D> {
    /// Create a new translation transform.
    pub fn new(offset: Vector<D>) -> Self {
        Self { offset }
    }

    /// Get the offset vector.
    pub fn offset(&self) -> &Vector<D> {
        &self.offset
    }
}

impl<const D: usize> Transform<D> for TranslationTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        *point + self.offset
    }

    fn jacobian(&self, _point: &Point<D>) -> Result<Jacobian<D>> {
        Ok(SMatrix::identity())
    }
}
