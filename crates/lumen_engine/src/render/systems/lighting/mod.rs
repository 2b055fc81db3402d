//! Lighting system
//!
//! Light definitions and the uniform layout the lit shader reads them from.

#[allow(clippy::module_inception)]
pub mod lighting;

pub use lighting::{Light, LightKind, Degrees, write_light_uniforms, MAX_SHADER_LIGHTS, DEFAULT_LIGHT_RANGE};
