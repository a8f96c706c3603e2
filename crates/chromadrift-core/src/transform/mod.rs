pub mod affine;
pub mod catalog;

pub use affine::Affine2;
pub use catalog::{TransformCatalog, TransformStore};
