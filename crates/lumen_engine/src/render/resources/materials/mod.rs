//! Material system
//!
//! Phong material records and their uniform upload.

pub mod material;

pub use material::Material;
