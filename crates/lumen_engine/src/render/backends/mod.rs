//! Graphics backend implementations
//!
//! `headless` is always built. The OpenGL backend is behind the `opengl` feature.

pub mod headless;

#[cfg(feature = "opengl")]
pub mod opengl;

pub use headless::HeadlessContext;

#[cfg(feature = "opengl")]
pub use opengl::GlContext;
