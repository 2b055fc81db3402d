//! Scene-side primitives consumed by the pipeline
//!
//! Geometry is anything that can bind itself and issue one indexed draw. The
//! camera hands the pipeline finished matrices; how it moves is up to the
//! application.

pub mod geometry;
pub mod camera;

pub use geometry::{Geometry, IndexedGeometry};
pub use camera::CameraView;
