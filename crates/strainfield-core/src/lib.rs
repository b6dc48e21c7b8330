pub mod cancel;
pub mod error;
pub mod filter;
pub mod image;
pub mod spatial;
pub mod tensor;
pub mod transform;

pub(crate) mod linalg;

pub use cancel::CancelToken;
pub use error::{Result, StrainError};
pub use filter::{GenerationDiagnostics, StrainForm, TransformToStrainFilter};
pub use image::Image;
pub use spatial::{Direction, Point, Spacing, Vector};
pub use tensor::{SymmetricTensor, SymmetricTensor2, SymmetricTensor3};
