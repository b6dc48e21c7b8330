//! Image type with physical metadata.
//!
//! An image couples a dense sample buffer with the metadata that maps
//! integer grid indices to physical coordinates (origin, spacing,
//! direction). The sample type is generic; the strain filter instantiates it
//! with a packed symmetric tensor.

use crate::spatial::{Direction, Point, Spacing, Vector};

/// Dense N-dimensional image with physical-space metadata.
///
/// Samples are stored row-major with axis 0 slowest. Index space is the
/// integer grid `[0, shape[d])`; physical space is reached through
/// `point = origin + direction · (spacing ⊙ index)`.
///
/// # Type Parameters
/// * `P` - The sample type
/// * `D` - The dimensionality of the grid
#[derive(Debug, Clone)]
pub struct Image<P, const D: usize> {
    data: Vec<P>,
    shape: [usize; D],
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
}

impl<P: Clone + Default, const D: usize> Image<P, D> {
    /// Create a new image with every sample default-initialized.
    pub fn new(
        shape: [usize; D],
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
    ) -> Self {
        let len = shape.iter().product();
        Self {
            data: vec![P::default(); len],
            shape,
            origin,
            spacing,
            direction,
        }
    }
}

impl<P, const D: usize> Image<P, D> {
    /// Get the per-axis sample counts.
    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the origin (physical coordinate of the sample at index 0,...,0).
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing (physical step between adjacent samples).
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction (orientation of the grid axes).
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Row-major linear offset of an index tuple, axis 0 slowest.
    pub fn linear_index(&self, index: &[usize; D]) -> usize {
        let mut offset = 0;
        for d in 0..D {
            debug_assert!(index[d] < self.shape[d], "image index out of range");
            offset = offset * self.shape[d] + index[d];
        }
        offset
    }

    /// Get the sample at an index tuple.
    pub fn get(&self, index: &[usize; D]) -> &P {
        &self.data[self.linear_index(index)]
    }

    /// Get the sample at an index tuple, mutably.
    pub fn get_mut(&mut self, index: &[usize; D]) -> &mut P {
        let offset = self.linear_index(index);
        &mut self.data[offset]
    }

    /// Map an integer grid index to its physical coordinate:
    /// `point = origin + direction · (spacing ⊙ index)`.
    pub fn index_to_physical_point(&self, index: &[usize; D]) -> Point<D> {
        let mut scaled = Vector::<D>::zeros();
        for d in 0..D {
            scaled[d] = index[d] as f64 * self.spacing[d];
        }
        self.origin + self.direction * scaled
    }

    /// All samples in traversal order.
    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    /// All samples in traversal order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.data
    }
}
