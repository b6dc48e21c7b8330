//! Transform-to-strain filter.
//!
//! Generates a strain tensor image over a regular sampling grid from an
//! arbitrary spatial transform. At every grid sample the filter queries the
//! transform's spatial Jacobian at the sample's physical coordinate and
//! applies the selected strain formulation; the result is a dense image of
//! packed symmetric tensors carrying the configured grid geometry.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::{Result, StrainError};
use crate::image::Image;
use crate::linalg;
use crate::spatial::{Direction, Point, Spacing, Vector};
use crate::tensor::SymmetricTensor;
use crate::transform::{Jacobian, Transform};
use nalgebra::SMatrix;

/// Pivot threshold for the Euler-Almansi inversion, about 1e4 times the
/// f64 machine epsilon.
const SINGULARITY_EPS: f64 = 2.22e-12;

/// Strain formulation applied to the spatial Jacobian J of the transform
/// (equivalently the deformation gradient F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainForm {
    /// `½(J + Jᵀ) − I`: linear in J, valid for small deformations.
    #[default]
    Infinitesimal,
    /// `½(JᵀJ − I)`: finite strain in the reference (material) frame.
    GreenLagrangian,
    /// `½(I − (JJᵀ)⁻¹)`: finite strain in the current (spatial) frame.
    EulerAlmansi,
}

impl FromStr for StrainForm {
    type Err = StrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "infinitesimal" => Ok(Self::Infinitesimal),
            "green_lagrangian" | "green-lagrangian" => Ok(Self::GreenLagrangian),
            "euler_almansi" | "euler-almansi" => Ok(Self::EulerAlmansi),
            other => Err(StrainError::precondition(format!(
                "unknown strain formulation: {other}"
            ))),
        }
    }
}

/// Counters reported after a successful generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationDiagnostics {
    /// Number of samples evaluated (the product of the size components).
    pub samples: usize,
    /// Samples zeroed because the Euler-Almansi tensor was singular there.
    pub singular_samples: usize,
}

type Kernel<const D: usize, const L: usize> = fn(&Jacobian<D>) -> Option<SymmetricTensor<D, L>>;

/// Filter producing a strain tensor image from a spatial transform.
///
/// The filter is configured with the output grid geometry (size, spacing,
/// origin, direction), a transform, and a [`StrainForm`]; `generate` then
/// fills one packed symmetric tensor per grid sample. The transform is
/// borrowed and consumed only through [`Transform::jacobian`], so affine and
/// spline families are handled uniformly.
///
/// Generation is parallel over slabs of the slowest-varying axis; the
/// transform must therefore tolerate concurrent Jacobian evaluation at
/// distinct points (the `Sync` bound on [`Transform`]).
///
/// # Type Parameters
/// * `D` - The grid dimensionality
/// * `L` - Packed tensor length, `D*(D+1)/2` (see [`SymmetricTensor`])
pub struct TransformToStrainFilter<'t, const D: usize, const L: usize> {
    size: [usize; D],
    spacing: Spacing<D>,
    origin: Point<D>,
    direction: Direction<D>,
    transform: Option<&'t dyn Transform<D>>,
    form: StrainForm,
    strict: bool,
    cancel: Option<CancelToken>,
    diagnostics: Option<GenerationDiagnostics>,
}

impl<'t, const D: usize, const L: usize> TransformToStrainFilter<'t, D, L> {
    /// Create an unconfigured filter: zero size, unit spacing, zero origin,
    /// identity direction, infinitesimal formulation, no transform.
    pub fn new() -> Self {
        Self {
            size: [0; D],
            spacing: Spacing::uniform(1.0),
            origin: Point::origin(),
            direction: Direction::identity(),
            transform: None,
            form: StrainForm::default(),
            strict: false,
            cancel: None,
            diagnostics: None,
        }
    }

    /// Set the per-axis sample counts of the output grid.
    pub fn set_size(&mut self, size: [usize; D]) -> &mut Self {
        self.size = size;
        self
    }

    /// Get the per-axis sample counts.
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// Set the physical step between adjacent samples.
    pub fn set_spacing(&mut self, spacing: Spacing<D>) -> &mut Self {
        self.spacing = spacing;
        self
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Set the physical coordinate of the sample at index (0,...,0).
    pub fn set_origin(&mut self, origin: Point<D>) -> &mut Self {
        self.origin = origin;
        self
    }

    /// Get the origin.
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Set the orientation of the grid axes.
    pub fn set_direction(&mut self, direction: Direction<D>) -> &mut Self {
        self.direction = direction;
        self
    }

    /// Get the direction.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Set the transform to differentiate. Required before generation.
    pub fn set_transform(&mut self, transform: &'t dyn Transform<D>) -> &mut Self {
        self.transform = Some(transform);
        self
    }

    /// Get the configured transform, if any.
    pub fn transform(&self) -> Option<&'t dyn Transform<D>> {
        self.transform
    }

    /// Select the strain formulation. Defaults to infinitesimal.
    pub fn set_strain_form(&mut self, form: StrainForm) -> &mut Self {
        self.form = form;
        self
    }

    /// Get the selected strain formulation.
    pub fn strain_form(&self) -> StrainForm {
        self.form
    }

    /// In strict mode a singular sample fails the whole pass with a numeric
    /// error instead of being zeroed and counted.
    pub fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// Install a cancellation token checked at slab boundaries.
    pub fn set_cancel_token(&mut self, token: CancelToken) -> &mut Self {
        self.cancel = Some(token);
        self
    }

    /// Diagnostics of the last successful generation pass.
    pub fn diagnostics(&self) -> Option<GenerationDiagnostics> {
        self.diagnostics
    }

    /// Generate the strain field.
    ///
    /// Preconditions are checked before any work: a transform must be set,
    /// every size component must be nonzero, spacing must be strictly
    /// positive, and the direction matrix orthonormal. On success the
    /// returned image carries the filter geometry field-for-field; on any
    /// failure no partial output escapes and the filter stays configured and
    /// re-runnable.
    pub fn generate(&mut self) -> Result<Image<SymmetricTensor<D, L>, D>> {
        self.diagnostics = None;

        let transform = self
            .transform
            .ok_or_else(|| StrainError::precondition("no transform set"))?;
        if self.size.iter().any(|&s| s == 0) {
            return Err(StrainError::precondition(format!(
                "output size {:?} has a zero axis",
                self.size
            )));
        }
        if !self.spacing.is_strictly_positive() {
            return Err(StrainError::precondition(format!(
                "spacing {:?} must be strictly positive",
                self.spacing.to_vec()
            )));
        }
        if !self.direction.is_orthonormal() {
            return Err(StrainError::precondition(
                "direction matrix must be orthonormal",
            ));
        }

        let mut image = Image::new(self.size, self.origin, self.spacing, self.direction);
        let total = image.len();
        tracing::debug!(samples = total, form = ?self.form, "generating strain field");

        // The formulation branch is hoisted out of the traversal.
        let kernel: Kernel<D, L> = match self.form {
            StrainForm::Infinitesimal => infinitesimal_kernel::<D, L>,
            StrainForm::GreenLagrangian => green_lagrangian_kernel::<D, L>,
            StrainForm::EulerAlmansi => euler_almansi_kernel::<D, L>,
        };

        let slab_len: usize = self.size[1..].iter().product::<usize>().max(1);
        let singular = AtomicUsize::new(0);
        let strict = self.strict;
        let size = self.size;
        let origin = self.origin;
        let spacing = self.spacing;
        let direction = self.direction;
        let cancel = self.cancel.clone();

        image
            .as_mut_slice()
            .par_chunks_mut(slab_len)
            .enumerate()
            .try_for_each(|(slab, samples)| {
                if let Some(token) = &cancel {
                    if token.is_cancelled() {
                        return Err(StrainError::Cancelled);
                    }
                }

                let mut index = [0usize; D];
                index[0] = slab;
                for sample in samples.iter_mut() {
                    let point = physical_point(&origin, &spacing, &direction, &index);
                    let jacobian = transform.jacobian(&point)?;
                    match kernel(&jacobian) {
                        Some(tensor) => *sample = tensor,
                        None if strict => {
                            return Err(StrainError::numeric(format!(
                                "singular deformation tensor at index {index:?}"
                            )));
                        }
                        None => {
                            singular.fetch_add(1, Ordering::Relaxed);
                            sample.set_zero();
                        }
                    }
                    advance_index(&mut index, &size);
                }
                Ok(())
            })?;

        let singular_samples = singular.into_inner();
        if singular_samples > 0 {
            tracing::debug!(singular_samples, "zeroed singular samples");
        }
        tracing::debug!("strain field generation complete");

        self.diagnostics = Some(GenerationDiagnostics {
            samples: total,
            singular_samples,
        });
        Ok(image)
    }
}

impl<const D: usize, const L: usize> Default for TransformToStrainFilter<'_, D, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical coordinate of a grid index:
/// `point = origin + direction · (spacing ⊙ index)`.
#[inline]
fn physical_point<const D: usize>(
    origin: &Point<D>,
    spacing: &Spacing<D>,
    direction: &Direction<D>,
    index: &[usize; D],
) -> Point<D> {
    let mut scaled = Vector::<D>::zeros();
    for d in 0..D {
        scaled[d] = index[d] as f64 * spacing[d];
    }
    *origin + *direction * scaled
}

/// Advance a grid index over the axes within one slab (axis 0 is fixed by
/// the slab; axis D-1 varies fastest).
#[inline]
fn advance_index<const D: usize>(index: &mut [usize; D], size: &[usize; D]) {
    for d in (1..D).rev() {
        index[d] += 1;
        if index[d] < size[d] {
            return;
        }
        index[d] = 0;
    }
}

fn infinitesimal_kernel<const D: usize, const L: usize>(
    j: &Jacobian<D>,
) -> Option<SymmetricTensor<D, L>> {
    let e = (j + j.transpose()) * 0.5 - SMatrix::<f64, D, D>::identity();
    Some(SymmetricTensor::from_matrix(&e))
}

fn green_lagrangian_kernel<const D: usize, const L: usize>(
    j: &Jacobian<D>,
) -> Option<SymmetricTensor<D, L>> {
    let e = (j.transpose() * j - SMatrix::<f64, D, D>::identity()) * 0.5;
    Some(SymmetricTensor::from_matrix(&e))
}

fn euler_almansi_kernel<const D: usize, const L: usize>(
    j: &Jacobian<D>,
) -> Option<SymmetricTensor<D, L>> {
    let b = j * j.transpose();
    if linalg::determinant(&b).abs() < SINGULARITY_EPS {
        return None;
    }
    let b_inv = linalg::try_invert(&b, SINGULARITY_EPS)?;
    let e = (SMatrix::<f64, D, D>::identity() - b_inv) * 0.5;
    Some(SymmetricTensor::from_matrix(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::AffineTransform;

    type Filter2<'t> = TransformToStrainFilter<'t, 2, 3>;

    #[test]
    fn test_generate_requires_transform() {
        let mut filter = Filter2::new();
        filter.set_size([4, 4]);
        let err = filter.generate().unwrap_err();
        assert!(matches!(err, StrainError::Precondition(_)));
        assert!(filter.diagnostics().is_none());
    }

    #[test]
    fn test_generate_rejects_zero_sized_axis() {
        let transform = AffineTransform::<2>::identity();
        let mut filter = Filter2::new();
        filter.set_transform(&transform);
        let err = filter.generate().unwrap_err();
        assert!(matches!(err, StrainError::Precondition(_)));
    }

    #[test]
    fn test_generate_rejects_non_orthonormal_direction() {
        let transform = AffineTransform::<2>::identity();
        let mut direction = Direction::<2>::identity();
        direction[(0, 0)] = 2.0;

        let mut filter = Filter2::new();
        filter
            .set_size([4, 4])
            .set_direction(direction)
            .set_transform(&transform);
        let err = filter.generate().unwrap_err();
        assert!(matches!(err, StrainError::Precondition(_)));
    }

    #[test]
    fn test_failed_generate_leaves_filter_reusable() {
        let transform = AffineTransform::<2>::identity();
        let mut filter = Filter2::new();
        filter.set_transform(&transform);
        assert!(filter.generate().is_err());

        filter.set_size([3, 3]);
        let image = filter.generate().unwrap();
        assert_eq!(image.len(), 9);
        assert_eq!(filter.diagnostics().unwrap().samples, 9);
    }

    #[test]
    fn test_strain_form_from_str() {
        assert_eq!(
            "infinitesimal".parse::<StrainForm>().unwrap(),
            StrainForm::Infinitesimal
        );
        assert_eq!(
            "green_lagrangian".parse::<StrainForm>().unwrap(),
            StrainForm::GreenLagrangian
        );
        assert_eq!(
            "euler-almansi".parse::<StrainForm>().unwrap(),
            StrainForm::EulerAlmansi
        );
        assert!("shear".parse::<StrainForm>().is_err());
    }

    #[test]
    fn test_kernels_on_identity_jacobian() {
        let identity = Jacobian::<2>::identity();
        assert_eq!(
            infinitesimal_kernel::<2, 3>(&identity).unwrap(),
            SymmetricTensor::new()
        );
        assert_eq!(
            green_lagrangian_kernel::<2, 3>(&identity).unwrap(),
            SymmetricTensor::new()
        );
        assert_eq!(
            euler_almansi_kernel::<2, 3>(&identity).unwrap(),
            SymmetricTensor::new()
        );
    }

    #[test]
    fn test_euler_almansi_kernel_singular() {
        let singular = Jacobian::<2>::new(1.0, 0.0, 0.0, 0.0);
        assert!(euler_almansi_kernel::<2, 3>(&singular).is_none());
    }
}
