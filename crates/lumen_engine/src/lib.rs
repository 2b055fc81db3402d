//! # Lumen Engine
//!
//! A shadow-mapped forward renderer for small static scenes.
//!
//! ## Features
//!
//! - **Directional shadows**: one orthographic depth map fitted to the scene bounds
//! - **Point shadows**: up to five omnidirectional depth cube maps per frame
//! - **Phong lighting**: point, directional and spot lights, eight per frame
//! - **Backend seam**: a headless recording backend, plus OpenGL behind the `opengl` feature
//! - **Configuration**: TOML or RON renderer settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use lumen_engine::prelude::*;
//!
//! let headless = Rc::new(HeadlessContext::new(Viewport::from_size(1920, 1080)));
//! let lit = headless.create_program("lit");
//! let depth = headless.create_program("shadow_depth");
//! let cube = IndexedGeometry::new(headless.create_vertex_array(), 36);
//!
//! let ctx: Rc<dyn GraphicsContext> = headless;
//! let mut pipeline = RenderPipeline::new(ctx, lit, 1920, 1080);
//! pipeline.configure_directional_shadow(depth, 2048, 2048)?;
//! pipeline.add_object(&cube, Mat4::identity(), Material::marble(), Vec3::new(1.0, 1.0, 1.0));
//! pipeline.add_light(Light::directional(Vec3::new(0.3, -1.0, 0.3), Vec3::new(1.0, 1.0, 1.0), 0.8));
//! pipeline.render();
//! # Ok::<(), lumen_engine::render::ShadowError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, RendererConfig},
        foundation::math::{Vec3, Mat4, Mat4Ext},
        render::{
            GraphicsContext, HeadlessContext, Viewport, ProgramId, TextureId,
            Geometry, IndexedGeometry, CameraView, Material,
            Light, LightKind, Degrees,
            RenderPipeline, PipelineState, FrameStats, RenderPath,
        },
    };
}
