//! Cubic B-spline free-form deformation transform.
//!
//! The transform adds a smooth displacement field to the identity. The field
//! is a cubic B-spline interpolation of control-point displacements laid out
//! on a regular grid over a rectangular transform domain. Both the mapped
//! point and the spatial Jacobian come from the same 4^D local window of
//! control points; the Jacobian additionally uses the basis-function
//! derivatives.

use super::trait_::{Jacobian, Transform};
use crate::error::Result;
use crate::spatial::{Point, Vector};
use nalgebra::{SMatrix, SVector};

/// Cubic B-spline basis values at local coordinate `t` in `[0, 1]`.
#[inline]
fn cubic_basis(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let omt = 1.0 - t;
    [
        omt * omt * omt / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

/// Derivatives of the cubic B-spline basis with respect to `t`.
#[inline]
fn cubic_basis_derivative(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let omt = 1.0 - t;
    [
        -omt * omt / 2.0,
        (3.0 * t2 - 4.0 * t) / 2.0,
        (-3.0 * t2 + 2.0 * t + 1.0) / 2.0,
        t2 / 2.0,
    ]
}

/// Local support window of a point: the starting control-point index and the
/// per-axis basis weights and derivative weights.
struct Window<const D: usize> {
    start: [usize; D],
    value: [[f64; 4]; D],
    deriv: [[f64; 4]; D],
}

/// Cubic B-spline free-form deformation over a rectangular transform domain.
///
/// The domain is described by its origin, physical dimensions and mesh size
/// (number of spline cells per axis). A cubic spline with `mesh[d]` cells
/// needs `mesh[d] + 3` control points along axis d; coefficients are one
/// displacement vector per control point, axis 0 fastest. Outside the domain
/// the displacement is zero and the Jacobian is the identity.
#[derive(Debug, Clone)]
pub struct BSplineTransform<const D: usize> {
    domain_origin: Point<D>,
    domain_dimensions: [f64; D],
    mesh_size: [usize; D],
    grid_size: [usize; D],
    grid_stride: [usize; D],
    control_spacing: [f64; D],
    coefficients: Vec<SVector<f64, D>>,
}

impl<const D: usize> BSplineTransform<D> {
    /// Create a new B-spline transform.
    ///
    /// # Arguments
    /// * `domain_origin` - Physical coordinate of the domain corner
    /// * `domain_dimensions` - Physical extent of the domain along each axis
    /// * `mesh_size` - Number of spline cells along each axis (≥ 1)
    /// * `coefficients` - One displacement per control point, axis 0 fastest;
    ///   the length must be the product of `mesh_size[d] + 3`
    pub fn new(
        domain_origin: Point<D>,
        domain_dimensions: [f64; D],
        mesh_size: [usize; D],
        coefficients: Vec<Vector<D>>,
    ) -> Self {
        assert!(
            mesh_size.iter().all(|&m| m >= 1),
            "Mesh size must be at least one cell per axis"
        );
        assert!(
            domain_dimensions.iter().all(|&d| d > 0.0),
            "Domain dimensions must be strictly positive"
        );

        let grid_size: [usize; D] = std::array::from_fn(|d| mesh_size[d] + 3);
        let mut grid_stride = [1usize; D];
        for d in 1..D {
            grid_stride[d] = grid_stride[d - 1] * grid_size[d - 1];
        }
        let num_control_points: usize = grid_size.iter().product();
        assert!(
            coefficients.len() == num_control_points,
            "Coefficient count must match the control-point grid"
        );

        let control_spacing: [f64; D] =
            std::array::from_fn(|d| domain_dimensions[d] / mesh_size[d] as f64);

        Self {
            domain_origin,
            domain_dimensions,
            mesh_size,
            grid_size,
            grid_stride,
            control_spacing,
            coefficients: coefficients.into_iter().map(|c| c.0).collect(),
        }
    }

    /// Create a transform with every control-point displacement zero.
    pub fn identity(
        domain_origin: Point<D>,
        domain_dimensions: [f64; D],
        mesh_size: [usize; D],
    ) -> Self {
        let num: usize = mesh_size.iter().map(|&m| m + 3).product();
        Self::new(
            domain_origin,
            domain_dimensions,
            mesh_size,
            vec![Vector::zeros(); num],
        )
    }

    /// Create a transform from a flat parameter vector in component-major
    /// order: all axis-0 displacements over the control grid, then all
    /// axis-1 displacements, and so on.
    pub fn from_parameters(
        domain_origin: Point<D>,
        domain_dimensions: [f64; D],
        mesh_size: [usize; D],
        parameters: &[f64],
    ) -> Self {
        let num: usize = mesh_size.iter().map(|&m| m + 3).product();
        assert!(
            parameters.len() == num * D,
            "Parameter vector length must be D times the control-point count"
        );

        let coefficients = (0..num)
            .map(|flat| {
                let mut c = Vector::zeros();
                for component in 0..D {
                    c[component] = parameters[component * num + flat];
                }
                c
            })
            .collect();

        Self::new(domain_origin, domain_dimensions, mesh_size, coefficients)
    }

    /// Get the transform domain origin.
    pub fn domain_origin(&self) -> &Point<D> {
        &self.domain_origin
    }

    /// Get the physical dimensions of the transform domain.
    pub fn domain_dimensions(&self) -> [f64; D] {
        self.domain_dimensions
    }

    /// Get the mesh size (spline cells per axis).
    pub fn mesh_size(&self) -> [usize; D] {
        self.mesh_size
    }

    /// Get the control-point grid size per axis (`mesh + 3`).
    pub fn grid_size(&self) -> [usize; D] {
        self.grid_size
    }

    /// Get the spacing between control points.
    pub fn control_spacing(&self) -> [f64; D] {
        self.control_spacing
    }

    /// Number of control points in the grid.
    pub fn num_control_points(&self) -> usize {
        self.coefficients.len()
    }

    /// Locate the support window of a physical point, or `None` when the
    /// point lies outside the transform domain.
    fn window(&self, point: &Point<D>) -> Option<Window<D>> {
        let mut window = Window {
            start: [0; D],
            value: [[0.0; 4]; D],
            deriv: [[0.0; 4]; D],
        };

        for d in 0..D {
            let u = (point[d] - self.domain_origin[d]) / self.control_spacing[d];
            if !u.is_finite() || u < 0.0 || u > self.mesh_size[d] as f64 {
                return None;
            }
            // A point exactly on the far face belongs to the last cell.
            let cell = (u.floor() as usize).min(self.mesh_size[d] - 1);
            let t = u - cell as f64;

            window.start[d] = cell;
            window.value[d] = cubic_basis(t);
            // Chain rule from spline coordinate to physical coordinate.
            window.deriv[d] = cubic_basis_derivative(t).map(|b| b / self.control_spacing[d]);
        }

        Some(window)
    }

    /// Sum the weighted control-point displacements over a 4^D window.
    fn displacement(&self, window: &Window<D>) -> SVector<f64, D> {
        let mut disp = SVector::<f64, D>::zeros();
        let mut offset = [0usize; D];
        loop {
            let mut weight = 1.0;
            let mut flat = 0usize;
            for d in 0..D {
                weight *= window.value[d][offset[d]];
                flat += (window.start[d] + offset[d]) * self.grid_stride[d];
            }
            disp += self.coefficients[flat] * weight;

            if !advance_window(&mut offset) {
                break;
            }
        }
        disp
    }

    /// Gradient of the displacement field over a 4^D window:
    /// `G[(i, j)] = du_i / dx_j`.
    fn displacement_gradient(&self, window: &Window<D>) -> SMatrix<f64, D, D> {
        let mut gradient = SMatrix::<f64, D, D>::zeros();
        let mut offset = [0usize; D];
        loop {
            let mut flat = 0usize;
            for d in 0..D {
                flat += (window.start[d] + offset[d]) * self.grid_stride[d];
            }
            let coefficient = &self.coefficients[flat];

            for j in 0..D {
                let mut weight = 1.0;
                for d in 0..D {
                    weight *= if d == j {
                        window.deriv[d][offset[d]]
                    } else {
                        window.value[d][offset[d]]
                    };
                }
                for i in 0..D {
                    gradient[(i, j)] += coefficient[i] * weight;
                }
            }

            if !advance_window(&mut offset) {
                break;
            }
        }
        gradient
    }
}

/// Advance a base-4 odometer over the support window; returns `false` once
/// every offset has been visited.
#[inline]
fn advance_window<const D: usize>(offset: &mut [usize; D]) -> bool {
    for d in 0..D {
        offset[d] += 1;
        if offset[d] < 4 {
            return true;
        }
        offset[d] = 0;
    }
    false
}

impl<const D: usize> Transform<D> for BSplineTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        match self.window(point) {
            Some(window) => Point(point.0 + self.displacement(&window)),
            None => *point,
        }
    }

    fn jacobian(&self, point: &Point<D>) -> Result<Jacobian<D>> {
        match self.window(point) {
            Some(window) => {
                Ok(SMatrix::identity() + self.displacement_gradient(&window))
            }
            None => Ok(SMatrix::identity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_partition_of_unity() {
        for &t in &[0.0, 0.25, 0.5, 0.99, 1.0] {
            let b = cubic_basis(t);
            let sum: f64 = b.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at t={t} was {sum}");

            let db = cubic_basis_derivative(t);
            let dsum: f64 = db.iter().sum();
            assert!(dsum.abs() < 1e-12, "derivative sum at t={t} was {dsum}");
        }
    }

    #[test]
    fn test_zero_coefficients_is_identity() {
        let transform =
            BSplineTransform::<2>::identity(Point::new([-10.0, -10.0]), [13.3, 13.3], [4, 7]);

        let p = Point::new([-3.2, 1.7]);
        assert_eq!(transform.transform_point(&p), p);
        assert_eq!(
            transform.jacobian(&p).unwrap(),
            SMatrix::<f64, 2, 2>::identity()
        );
    }

    #[test]
    fn test_grid_size_from_mesh() {
        let transform =
            BSplineTransform::<2>::identity(Point::origin(), [30.0, 30.0], [4, 7]);
        assert_eq!(transform.grid_size(), [7, 10]);
        assert_eq!(transform.num_control_points(), 70);
        assert!((transform.control_spacing()[0] - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_control_point_displacement() {
        // Mesh of 3 cells over [0, 30]: control spacing 10, grid 6 per axis.
        // Displace the control point whose peak influence is the grid
        // coordinate u = (1, 1), i.e. stored index (2, 2).
        let mesh = [3usize, 3];
        let num = 6 * 6;
        let mut coefficients = vec![Vector::<2>::zeros(); num];
        coefficients[2 * 6 + 2] = Vector::new([1.0, 1.0]);

        let transform = BSplineTransform::<2>::new(
            Point::origin(),
            [30.0, 30.0],
            mesh,
            coefficients,
        );

        // At the physical point (10, 10): u = (1, 1), window start (1, 1),
        // the displaced control point has local offset (1, 1), so its weight
        // is B1(0)^2 = (4/6)^2.
        let mapped = transform.transform_point(&Point::new([10.0, 10.0]));
        let weight = (4.0 / 6.0) * (4.0 / 6.0);
        assert!((mapped[0] - (10.0 + weight)).abs() < 1e-12);
        assert!((mapped[1] - (10.0 + weight)).abs() < 1e-12);
    }

    #[test]
    fn test_outside_domain_is_identity() {
        let mut coefficients = vec![Vector::<2>::zeros(); 6 * 6];
        for c in coefficients.iter_mut() {
            *c = Vector::new([3.0, -1.0]);
        }
        let transform =
            BSplineTransform::<2>::new(Point::origin(), [30.0, 30.0], [3, 3], coefficients);

        let outside = Point::new([-5.0, 40.0]);
        assert_eq!(transform.transform_point(&outside), outside);
        assert_eq!(
            transform.jacobian(&outside).unwrap(),
            SMatrix::<f64, 2, 2>::identity()
        );
    }

    #[test]
    fn test_uniform_field_has_identity_jacobian() {
        // A constant displacement everywhere inside the domain: the gradient
        // must vanish because the basis functions sum to one.
        let shift = Vector::new([3.0, -1.0]);
        let coefficients = vec![shift; 6 * 6];
        let transform =
            BSplineTransform::<2>::new(Point::origin(), [30.0, 30.0], [3, 3], coefficients);

        let p = Point::new([12.3, 7.6]);
        let mapped = transform.transform_point(&p);
        assert!((mapped[0] - (p[0] + 3.0)).abs() < 1e-12);
        assert!((mapped[1] - (p[1] - 1.0)).abs() < 1e-12);

        let j = transform.jacobian(&p).unwrap();
        let identity = SMatrix::<f64, 2, 2>::identity();
        for i in 0..2 {
            for k in 0..2 {
                assert!((j[(i, k)] - identity[(i, k)]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_from_parameters_component_major() {
        let num = 6 * 6;
        let mut parameters = vec![0.0; num * 2];
        parameters[5] = 1.5; // axis 0 displacement of control point 5
        parameters[num + 5] = -2.5; // axis 1 displacement of the same point

        let transform = BSplineTransform::<2>::from_parameters(
            Point::origin(),
            [30.0, 30.0],
            [3, 3],
            &parameters,
        );
        assert_eq!(transform.num_control_points(), num);

        let equivalent = {
            let mut coefficients = vec![Vector::<2>::zeros(); num];
            coefficients[5] = Vector::new([1.5, -2.5]);
            BSplineTransform::<2>::new(Point::origin(), [30.0, 30.0], [3, 3], coefficients)
        };

        let p = Point::new([3.3, 4.4]);
        assert_eq!(transform.transform_point(&p), equivalent.transform_point(&p));
    }
}
