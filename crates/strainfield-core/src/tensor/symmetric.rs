//! Symmetric second-rank tensor with packed storage.
//!
//! A symmetric D×D tensor has D*(D+1)/2 distinct components; only those are
//! stored, in row-major upper-triangular order. Element access by (row, col)
//! resolves both triangles to the same slot, so symmetry is exact by
//! construction rather than maintained by discipline.

use nalgebra::SMatrix;

/// A symmetric D×D tensor stored as its packed upper triangle.
///
/// `L` must equal `D*(D+1)/2`; this is enforced when the type is
/// instantiated (stable Rust cannot derive the array length from `D`
/// directly, so the packed length is carried as a second parameter). Use
/// [`SymmetricTensor2`] / [`SymmetricTensor3`] for the common dimensions.
///
/// For D = 3 the packed order is `xx, xy, xz, yy, yz, zz`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricTensor<const D: usize, const L: usize> {
    components: [f64; L],
}

/// Symmetric 2×2 tensor (3 distinct components).
pub type SymmetricTensor2 = SymmetricTensor<2, 3>;
/// Symmetric 3×3 tensor (6 distinct components).
pub type SymmetricTensor3 = SymmetricTensor<3, 6>;

impl<const D: usize, const L: usize> SymmetricTensor<D, L> {
    const VALID_PACKED_LEN: () = assert!(
        L == D * (D + 1) / 2,
        "packed length L must equal D*(D+1)/2"
    );

    /// Create a zero tensor.
    pub fn new() -> Self {
        let () = Self::VALID_PACKED_LEN;
        Self {
            components: [0.0; L],
        }
    }

    /// Packed slot of element (row, col); both triangles map to the
    /// canonical upper-triangular slot.
    #[inline]
    fn slot(row: usize, col: usize) -> usize {
        debug_assert!(row < D && col < D, "tensor index out of range");
        let (i, j) = if row <= col { (row, col) } else { (col, row) };
        i * D - i * (i + 1) / 2 + j
    }

    /// Get element (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.components[Self::slot(row, col)]
    }

    /// Set element (row, col); the mirrored element changes with it.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.components[Self::slot(row, col)] = value;
    }

    /// Reset every component to zero.
    pub fn set_zero(&mut self) {
        self.components = [0.0; L];
    }

    /// The distinct components in canonical (row-major upper-triangular)
    /// order, as used by serialization sinks.
    pub fn as_slice(&self) -> &[f64] {
        &self.components
    }

    /// Build from a dense matrix, symmetrizing across the diagonal.
    pub fn from_matrix(m: &SMatrix<f64, D, D>) -> Self {
        let mut tensor = Self::new();
        for i in 0..D {
            for j in i..D {
                tensor.components[Self::slot(i, j)] = 0.5 * (m[(i, j)] + m[(j, i)]);
            }
        }
        tensor
    }

    /// Expand to a dense matrix.
    pub fn to_matrix(&self) -> SMatrix<f64, D, D> {
        SMatrix::from_fn(|i, j| self.get(i, j))
    }
}

impl<const D: usize, const L: usize> Default for SymmetricTensor<D, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize, const L: usize> std::ops::Index<(usize, usize)> for SymmetricTensor<D, L> {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.components[Self::slot(row, col)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::SMatrix;

    #[test]
    fn test_zero_initialized() {
        let t = SymmetricTensor3::new();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(t.get(i, j), 0.0);
            }
        }
    }

    #[test]
    fn test_packed_order_2d() {
        let mut t = SymmetricTensor2::new();
        t.set(0, 0, 1.0);
        t.set(0, 1, 2.0);
        t.set(1, 1, 3.0);
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_packed_order_3d() {
        let mut t = SymmetricTensor3::new();
        t.set(0, 0, 1.0);
        t.set(0, 1, 2.0);
        t.set(0, 2, 3.0);
        t.set(1, 1, 4.0);
        t.set(1, 2, 5.0);
        t.set(2, 2, 6.0);
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_symmetric_aliasing() {
        let mut t = SymmetricTensor3::new();
        t.set(2, 0, 7.5);
        assert_eq!(t.get(0, 2), 7.5);
        assert_eq!(t[(2, 0)], t[(0, 2)]);

        t.set(0, 2, -1.0);
        assert_eq!(t.get(2, 0), -1.0);
    }

    #[test]
    fn test_from_matrix_symmetrizes() {
        let m = SMatrix::<f64, 2, 2>::new(1.0, 0.3, 0.1, 2.0);
        let t = SymmetricTensor2::from_matrix(&m);
        assert!((t.get(0, 1) - 0.2).abs() < 1e-15);
        assert_eq!(t.get(1, 0), t.get(0, 1));
        assert_eq!(t.get(0, 0), 1.0);
        assert_eq!(t.get(1, 1), 2.0);
    }

    #[test]
    fn test_matrix_roundtrip() {
        let mut t = SymmetricTensor3::new();
        t.set(0, 1, 0.5);
        t.set(1, 2, -0.25);
        t.set(2, 2, 4.0);
        let back = SymmetricTensor3::from_matrix(&t.to_matrix());
        assert_eq!(back, t);
    }

    #[test]
    fn test_set_zero() {
        let mut t = SymmetricTensor2::new();
        t.set(0, 0, 9.0);
        t.set_zero();
        assert_eq!(t, SymmetricTensor2::new());
    }
}
