//! # Rendering System
//!
//! Shadow-mapped forward renderer over a narrow graphics-context seam.
//!
//! ## Architecture
//!
//! - **api**: the [`GraphicsContext`](api::GraphicsContext) trait, GPU handles and uniform values
//! - **backends**: the in-memory headless context and the optional OpenGL context
//! - **state**: scoped guards for viewport, culling and framebuffer bindings
//! - **primitives**: drawable geometry and camera matrices supplied by the scene
//! - **resources**: Phong material records
//! - **systems**: light sources and their uniform layout
//! - **shadows**: directional and point shadow targets and the light-space math
//! - **pipeline**: the per-frame pass sequence tying it all together
//!
//! A frame is a fixed, ordered sequence of context operations: depth-only
//! passes into the shadow targets, then one lit pass into the window. Every
//! pass puts the viewport and culling state back before it returns.

pub mod api;
pub mod backends;
pub mod state;

// Scene-side inputs
pub mod primitives;
pub mod resources;

// Systems
pub mod systems;

pub mod shadows;
pub mod pipeline;

use thiserror::Error;

pub use api::{
    GraphicsContext, TextureId, FramebufferId, ProgramId, VertexArrayId, Viewport, CullFace,
    ClearFlags, TextureTarget, CubeFace, DepthAttachment, UniformValue,
};
pub use backends::HeadlessContext;
pub use primitives::{Geometry, IndexedGeometry, CameraView};
pub use resources::materials::Material;
pub use systems::lighting::{Light, LightKind, Degrees, MAX_SHADER_LIGHTS};
pub use shadows::{
    DirectionalShadowTarget, PointShadowTarget, ShadowTargetPool, ShadowError, ShadowResult,
    MAX_POINT_SHADOWS,
};
pub use pipeline::{RenderPipeline, PipelineState, FrameStats, RenderPath};

/// Errors reported by graphics backends
#[derive(Error, Debug)]
pub enum RenderError {
    /// Backend setup failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// A draw or state change failed
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// A GPU object could not be created
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for backend operations
pub type RenderResult<T> = Result<T, RenderError>;
