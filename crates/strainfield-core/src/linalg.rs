//! Small dense linear algebra helpers for dimension-generic square matrices.
//!
//! Determinants and inverses are computed with partially pivoted Gaussian
//! elimination so they stay available for any const dimension.

use nalgebra::SMatrix;

/// Compute the determinant of a D×D matrix.
///
/// Uses cofactor expansion for D = 2, 3 and Gaussian elimination with
/// partial pivoting for larger dimensions.
pub(crate) fn determinant<const D: usize>(m: &SMatrix<f64, D, D>) -> f64 {
    match D {
        0 => 1.0,
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        3 => {
            let a = m[(0, 0)];
            let b = m[(0, 1)];
            let c = m[(0, 2)];
            let d = m[(1, 0)];
            let e = m[(1, 1)];
            let f = m[(1, 2)];
            let g = m[(2, 0)];
            let h = m[(2, 1)];
            let i = m[(2, 2)];

            a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
        }
        _ => {
            let mut a = *m;
            let mut det = 1.0;

            for col in 0..D {
                let mut pivot_row = col;
                let mut pivot_val = a[(col, col)].abs();
                for row in (col + 1)..D {
                    let val = a[(row, col)].abs();
                    if val > pivot_val {
                        pivot_val = val;
                        pivot_row = row;
                    }
                }

                if pivot_val == 0.0 {
                    return 0.0;
                }

                if pivot_row != col {
                    a.swap_rows(col, pivot_row);
                    det = -det;
                }

                det *= a[(col, col)];

                for row in (col + 1)..D {
                    let factor = a[(row, col)] / a[(col, col)];
                    for k in col..D {
                        a[(row, k)] -= factor * a[(col, k)];
                    }
                }
            }

            det
        }
    }
}

/// Invert a D×D matrix by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when a pivot falls below `pivot_eps`, i.e. the matrix is
/// singular to working precision.
pub(crate) fn try_invert<const D: usize>(
    m: &SMatrix<f64, D, D>,
    pivot_eps: f64,
) -> Option<SMatrix<f64, D, D>> {
    let mut a = *m;
    let mut inv = SMatrix::<f64, D, D>::identity();

    for col in 0..D {
        let mut pivot_row = col;
        let mut pivot_val = a[(col, col)].abs();
        for row in (col + 1)..D {
            let val = a[(row, col)].abs();
            if val > pivot_val {
                pivot_val = val;
                pivot_row = row;
            }
        }

        if pivot_val < pivot_eps {
            return None;
        }

        if pivot_row != col {
            a.swap_rows(col, pivot_row);
            inv.swap_rows(col, pivot_row);
        }

        let diag = a[(col, col)];
        for k in 0..D {
            a[(col, k)] /= diag;
            inv[(col, k)] /= diag;
        }

        for row in 0..D {
            if row == col {
                continue;
            }
            let factor = a[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for k in 0..D {
                a[(row, k)] -= factor * a[(col, k)];
                inv[(row, k)] -= factor * inv[(col, k)];
            }
        }
    }

    Some(inv)
}
