//! # Shadow Targets
//!
//! Off-screen depth targets filled by the depth-only passes and sampled by the
//! lit pass:
//!
//! - [`DirectionalShadowTarget`]: one 2D depth map for the directional light
//! - [`PointShadowTarget`]: one depth cube map per shadowed point light
//! - [`ShadowTargetPool`]: the fixed batch of `MAX_POINT_SHADOWS` cube targets
//!
//! Targets own their GPU handles and release them on drop. Reconfiguration
//! always replaces the whole value.

pub mod directional;
pub mod point;
pub mod pool;
pub mod projection;

pub use directional::DirectionalShadowTarget;
pub use point::PointShadowTarget;
pub use pool::{ShadowTargetPool, PointShadowAssignment, MAX_POINT_SHADOWS};
pub use projection::{
    LightSpace, CubeFaceView, CUBE_FACES, CUBE_NEAR_PLANE, SCENE_CENTER, SCENE_RADIUS,
    DEFAULT_LIGHT_DIRECTION, directional_light_space, cube_face_matrix, cube_face_matrices,
};

use thiserror::Error;

use crate::render::RenderError;

/// Errors raised while allocating shadow targets
#[derive(Error, Debug)]
pub enum ShadowError {
    /// The depth texture or framebuffer could not be created or is not complete
    #[error("Failed to allocate {target}: {reason}")]
    ResourceAllocationFailure {
        /// Which target was being built
        target: &'static str,
        /// Backend message
        reason: String,
    },

    /// A zero-sized target was requested
    #[error("Invalid shadow resolution {width}x{height}")]
    InvalidResolution {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// The far plane is not beyond the near plane
    #[error("Invalid shadow far plane: {0}")]
    InvalidFarPlane(f32),
}

impl ShadowError {
    pub(crate) fn allocation(target: &'static str, source: RenderError) -> Self {
        Self::ResourceAllocationFailure { target, reason: source.to_string() }
    }
}

/// Result type for shadow target operations
pub type ShadowResult<T> = Result<T, ShadowError>;
