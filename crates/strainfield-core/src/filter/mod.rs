pub mod strain;

pub use strain::{GenerationDiagnostics, StrainForm, TransformToStrainFilter};

/// 2D strain filter (packed tensor length 3).
pub type TransformToStrainFilter2<'t> = TransformToStrainFilter<'t, 2, 3>;
/// 3D strain filter (packed tensor length 6).
pub type TransformToStrainFilter3<'t> = TransformToStrainFilter<'t, 3, 6>;
