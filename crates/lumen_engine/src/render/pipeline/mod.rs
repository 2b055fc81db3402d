//! Frame orchestration
//!
//! [`RenderPipeline`] owns the shadow targets, queues borrowed objects and
//! lights, and runs the depth and lit passes in a fixed order each frame.

pub mod render_pipeline;


pub use render_pipeline::{
    RenderPipeline, PipelineState, FrameStats, RenderPath, DrawableObject,
    DIRECTIONAL_SHADOW_UNIT, POINT_SHADOW_FIRST_UNIT, DIFFUSE_TEXTURE_UNIT,
};
