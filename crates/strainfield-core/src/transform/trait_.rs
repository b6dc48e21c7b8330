//! Transform trait for spatial coordinate transformations.
//!
//! This module defines the capability set the strain filter requires of any
//! transform family.

use crate::error::Result;
use crate::spatial::Point;
use nalgebra::SMatrix;

/// Spatial Jacobian of a transform at a physical point:
/// `J[(i, j)] = dT_i / dx_j`.
pub type Jacobian<const D: usize> = SMatrix<f64, D, D>;

/// A geometric transform mapping physical coordinates to physical
/// coordinates.
///
/// The strain filter consumes transforms only through [`Transform::jacobian`];
/// implementations must be pure and safe for concurrent evaluation at
/// distinct points (hence the `Sync` bound).
///
/// # Type Parameters
/// * `D` - The spatial dimensionality
pub trait Transform<const D: usize>: Sync {
    /// Map a physical point through the transform.
    fn transform_point(&self, point: &Point<D>) -> Point<D>;

    /// Evaluate the spatial Jacobian at a physical point.
    ///
    /// Closed-form families (affine, rigid, translation) return a constant
    /// matrix regardless of the point; spline families differentiate their
    /// local basis functions.
    fn jacobian(&self, point: &Point<D>) -> Result<Jacobian<D>>;
}
