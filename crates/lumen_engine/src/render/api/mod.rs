//! High-level rendering API
//!
//! Backend-agnostic types the pipeline talks to: the graphics context trait,
//! GPU handles and uniform values.

pub mod graphics_context;

pub use graphics_context::{
    GraphicsContext, TextureId, FramebufferId, ProgramId, VertexArrayId,
    Viewport, CullFace, ClearFlags, TextureTarget, CubeFace, DepthAttachment, UniformValue,
};
