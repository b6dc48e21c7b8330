//! Spacing type for physical distances between grid samples.

use super::Vector;

/// Physical distance between adjacent grid samples along each axis.
///
/// This is a type alias to [`Vector`] for semantic clarity; valid spacing has
/// strictly positive components, which the strain filter checks before
/// generation.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Create uniform spacing (same value for all axes).
    pub fn uniform(value: f64) -> Self {
        let mut spacing = Vector::zeros();
        for i in 0..D {
            spacing[i] = value;
        }
        spacing
    }

    /// Whether every component is strictly positive and finite.
    pub fn is_strictly_positive(&self) -> bool {
        (0..D).all(|i| self[i] > 0.0 && self[i].is_finite())
    }

    /// Check if spacing is uniform (all components equal).
    pub fn is_uniform(&self) -> bool {
        if D == 0 {
            return true;
        }
        let first = self[0];
        (1..D).all(|i| (self[i] - first).abs() < 1e-9)
    }

    /// Smallest component.
    pub fn min_component(&self) -> f64 {
        (0..D).map(|i| self[i]).fold(f64::INFINITY, f64::min)
    }

    /// Largest component.
    pub fn max_component(&self) -> f64 {
        (0..D).map(|i| self[i]).fold(f64::NEG_INFINITY, f64::max)
    }
}
