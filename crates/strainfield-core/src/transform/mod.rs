pub mod affine;
pub mod bspline;
pub mod rigid;
pub mod trait_;
pub mod translation;

pub use affine::AffineTransform;
pub use bspline::BSplineTransform;
pub use rigid::RigidTransform;
pub use trait_::{Jacobian, Transform};
pub use translation::TranslationTransform;
