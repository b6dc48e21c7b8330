//! Rigid transform implementation (rotation + translation).

use super::trait_::{Jacobian, Transform};
use crate::error::Result;
use crate::spatial::{Point, Vector};
use nalgebra::{Rotation2, Rotation3, SMatrix};

/// Rigid transform with a fixed center of rotation:
///
/// `T(x) = R(x - c) + c + t`
///
/// Supports 2D (single angle) and 3D (ZYX Euler angles) through dedicated
/// constructors; the rotation matrix is built once at construction. The
/// spatial Jacobian is the constant rotation R, which makes rigid motion the
/// canonical witness that finite-strain formulations ignore rotation while
/// the infinitesimal one does not.
#[derive(Debug, Clone)]
pub struct RigidTransform<const D: usize> {
    rotation: SMatrix<f64, D, D>,
    translation: Vector<D>,
    center: Point<D>,
}

impl<const D: usize> RigidTransform<D> {
    /// Create an identity rigid transform (no rotation, no translation).
    pub fn identity() -> Self {
        Self {
            rotation: SMatrix::identity(),
            translation: Vector::zeros(),
            center: Point::origin(),
        }
    }

    /// Get the rotation matrix.
    pub fn rotation(&self) -> &SMatrix<f64, D, D> {
        &self.rotation
    }

    /// Get the translation vector.
    pub fn translation(&self) -> &Vector<D> {
        &self.translation
    }

    /// Get the center of rotation.
    pub fn center(&self) -> &Point<D> {
        &self.center
    }
}

impl RigidTransform<2> {
    /// Create a 2D rigid transform from an angle in radians.
    pub fn new(angle: f64, translation: Vector<2>, center: Point<2>) -> Self {
        Self {
            rotation: *Rotation2::new(angle).matrix(),
            translation,
            center,
        }
    }
}

impl RigidTransform<3> {
    /// Create a 3D rigid transform from ZYX Euler angles
    /// `(roll, pitch, yaw)` in radians, i.e. `R = Rz(yaw) Ry(pitch) Rx(roll)`.
    pub fn new(angles: [f64; 3], translation: Vector<3>, center: Point<3>) -> Self {
        Self {
            rotation: *Rotation3::from_euler_angles(angles[0], angles[1], angles[2]).matrix(),
            translation,
            center,
        }
    }
}

impl<const D: usize> Transform<D> for RigidTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        let centered = *point - self.center;
        Point(self.center.0 + self.rotation * centered.0 + self.translation.0)
    }

    fn jacobian(&self, _point: &Point<D>) -> Result<Jacobian<D>> {
        Ok(self.rotation)
    }
}
