pub mod symmetric;

pub use symmetric::{SymmetricTensor, SymmetricTensor2, SymmetricTensor3};
