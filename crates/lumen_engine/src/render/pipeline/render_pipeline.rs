//! # Render Pipeline
//!
//! Per-frame orchestration of the shadow and lighting passes.
//!
//! ## Frame sequence
//!
//! ```text
//! render()
//!  ├─ Unconfigured or no lights ─> unshadowed lit pass
//!  └─ otherwise
//!      ├─ directional depth pass   (front-face culling, window viewport restored)
//!      ├─ point depth passes       (K lights x 6 faces, K = min(point lights, 5))
//!      └─ lit pass                 (depth maps bound, up to 8 lights uploaded)
//! ```
//!
//! The pipeline owns its shadow targets and borrows everything it draws.
//! `render()` never fails: a missing or broken shadow target only lowers the
//! output quality.

use std::rc::Rc;

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{
    ClearFlags, CubeFace, CullFace, GraphicsContext, ProgramId, TextureId, TextureTarget, Viewport,
};
use crate::render::primitives::{CameraView, Geometry};
use crate::render::resources::materials::Material;
use crate::render::shadows::{
    cube_face_matrices, directional_light_space, DirectionalShadowTarget, LightSpace,
    PointShadowAssignment, ShadowResult, ShadowTargetPool, MAX_POINT_SHADOWS,
};
use crate::render::state::{ScopedCullMode, ScopedFramebuffer, ScopedViewport};
use crate::render::systems::lighting::{write_light_uniforms, Light, MAX_SHADER_LIGHTS};

/// Texture unit of the directional shadow map
pub const DIRECTIONAL_SHADOW_UNIT: u32 = 0;

/// First texture unit of the point shadow cube maps; slot `i` uses `unit + i`
pub const POINT_SHADOW_FIRST_UNIT: u32 = 1;

/// Texture unit of an object's diffuse texture
pub const DIFFUSE_TEXTURE_UNIT: u32 = POINT_SHADOW_FIRST_UNIT + MAX_POINT_SHADOWS as u32;

/// Shadow readiness of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No directional target; frames render unshadowed
    Unconfigured,
    /// Directional target configured
    ShadowReady,
    /// Directional target and point shadow pool configured
    PointShadowReady,
}

/// Which pass sequence the last frame ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPath {
    /// Lit pass only
    #[default]
    Unshadowed,
    /// Depth passes followed by the lit pass
    Shadowed,
}

/// Statistics of the most recent frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Pass sequence that ran
    pub path: RenderPath,
    /// Draw submissions across all passes
    pub draw_submissions: usize,
    /// Point lights whose cube map was filled
    pub point_shadows: usize,
    /// Lights written to the lit shader
    pub lights_uploaded: usize,
    /// Cube targets whose framebuffer was incomplete once a face was attached
    pub incomplete_point_targets: usize,
}

/// One object queued for drawing
///
/// Geometry is borrowed for the pipeline's lifetime; the texture handle is
/// not owned either.
#[derive(Clone, Copy)]
pub struct DrawableObject<'s> {
    /// Geometry to draw
    pub geometry: &'s dyn Geometry,
    /// Model transform
    pub transform: Mat4,
    /// Surface material
    pub material: Material,
    /// Tint color
    pub color: Vec3,
    /// Optional diffuse texture
    pub texture: Option<TextureId>,
}

impl std::fmt::Debug for DrawableObject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableObject")
            .field("transform", &self.transform)
            .field("material", &self.material)
            .field("color", &self.color)
            .field("texture", &self.texture)
            .finish_non_exhaustive()
    }
}

/// Shadow-mapped forward renderer
pub struct RenderPipeline<'s> {
    ctx: Rc<dyn GraphicsContext>,
    lit_shader: ProgramId,

    objects: Vec<DrawableObject<'s>>,
    lights: Vec<Light>,
    camera: Option<CameraView>,

    directional_shader: Option<ProgramId>,
    directional_target: Option<DirectionalShadowTarget>,
    point_pool: Option<ShadowTargetPool>,

    window: Viewport,
    last_frame: FrameStats,
    // Set when the light list changes so warnings fire once per change
    lights_changed: bool,
}

impl<'s> RenderPipeline<'s> {
    /// Create an unconfigured pipeline drawing with `lit_shader` into a window of the given size
    pub fn new(
        ctx: Rc<dyn GraphicsContext>,
        lit_shader: ProgramId,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            ctx,
            lit_shader,
            objects: Vec::new(),
            lights: Vec::new(),
            camera: None,
            directional_shader: None,
            directional_target: None,
            point_pool: None,
            window: Viewport::from_size(window_width, window_height),
            last_frame: FrameStats::default(),
            lights_changed: true,
        }
    }

    /// (Re)build the directional shadow target
    ///
    /// The previous target is released first. On failure the pipeline falls
    /// back to [`PipelineState::Unconfigured`] and keeps rendering unshadowed.
    pub fn configure_directional_shadow(
        &mut self,
        shader: ProgramId,
        width: u32,
        height: u32,
    ) -> ShadowResult<()> {
        let result = DirectionalShadowTarget::configure(
            &mut self.directional_target,
            Rc::clone(&self.ctx),
            width,
            height,
        );

        match result {
            Ok(()) => {
                self.directional_shader = Some(shader);
                log::info!("Directional shadow map configured at {}x{}", width, height);
                Ok(())
            }
            Err(e) => {
                self.directional_shader = None;
                log::error!("Directional shadows disabled: {}", e);
                Err(e)
            }
        }
    }

    /// (Re)build the point shadow pool
    ///
    /// The previous pool is released first. On failure point shadows are
    /// disabled; directional shadows are unaffected.
    pub fn configure_point_shadows(
        &mut self,
        shader: ProgramId,
        size: u32,
        far_plane: f32,
    ) -> ShadowResult<()> {
        match ShadowTargetPool::configure(&mut self.point_pool, &self.ctx, shader, size, far_plane) {
            Ok(()) => {
                log::info!(
                    "Point shadow pool configured: {} cube maps at {}, far plane {}",
                    MAX_POINT_SHADOWS,
                    size,
                    far_plane
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Point shadows disabled: {}", e);
                Err(e)
            }
        }
    }

    /// Queue an untextured object
    pub fn add_object(
        &mut self,
        geometry: &'s dyn Geometry,
        transform: Mat4,
        material: Material,
        color: Vec3,
    ) {
        self.objects.push(DrawableObject { geometry, transform, material, color, texture: None });
    }

    /// Queue an object sampled with a diffuse texture
    pub fn add_textured_object(
        &mut self,
        geometry: &'s dyn Geometry,
        transform: Mat4,
        material: Material,
        color: Vec3,
        texture: TextureId,
    ) {
        self.objects.push(DrawableObject {
            geometry,
            transform,
            material,
            color,
            texture: Some(texture),
        });
    }

    /// Remove every queued object
    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    /// Append a light; list order decides truncation and shadow assignment
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
        self.lights_changed = true;
    }

    /// Remove every light
    pub fn clear_lights(&mut self) {
        self.lights.clear();
        self.lights_changed = true;
    }

    /// Camera matrices used by the lit pass
    pub fn set_camera(&mut self, camera: CameraView) {
        self.camera = Some(camera);
    }

    /// Window size restored after the depth passes
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window = Viewport::from_size(width, height);
    }

    /// Window viewport
    pub fn window(&self) -> Viewport {
        self.window
    }

    /// Current shadow readiness
    pub fn state(&self) -> PipelineState {
        match (&self.directional_target, &self.point_pool) {
            (None, _) => PipelineState::Unconfigured,
            (Some(_), None) => PipelineState::ShadowReady,
            (Some(_), Some(_)) => PipelineState::PointShadowReady,
        }
    }

    /// Directional shadow target, if configured
    pub fn directional_target(&self) -> Option<&DirectionalShadowTarget> {
        self.directional_target.as_ref()
    }

    /// Point shadow pool, if configured
    pub fn point_pool(&self) -> Option<&ShadowTargetPool> {
        self.point_pool.as_ref()
    }

    /// Queued objects in insertion order
    pub fn objects(&self) -> &[DrawableObject<'s>] {
        &self.objects
    }

    /// Lights in insertion order
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Statistics of the most recent [`render`](Self::render)
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Render one frame
    ///
    /// Always leaves the viewport at the window size and culling as it was.
    pub fn render(&mut self) {
        let context = Rc::clone(&self.ctx);
        let ctx = context.as_ref();
        let _viewport = ScopedViewport::restoring_to(ctx, self.window);

        if self.lights_changed {
            self.report_light_list();
            self.lights_changed = false;
        }

        let mut stats = FrameStats::default();

        let shadowed = self.state() != PipelineState::Unconfigured && !self.lights.is_empty();
        if shadowed {
            let light_space = self.shadow_pass(ctx, &mut stats);
            self.lighting_pass(ctx, &light_space, &mut stats);
            stats.path = RenderPath::Shadowed;
        } else {
            if let Some(pool) = self.point_pool.as_mut() {
                pool.clear_assignments();
            }
            self.unshadowed_pass(ctx, &mut stats);
        }

        log::trace!("Frame rendered: {:?}", stats);
        self.last_frame = stats;
    }

    fn report_light_list(&self) {
        if self.lights.len() > MAX_SHADER_LIGHTS {
            log::warn!(
                "{} lights queued; only the first {} reach the lit shader",
                self.lights.len(),
                MAX_SHADER_LIGHTS
            );
        }

        let point_lights = self.lights.iter().filter(|l| l.point_position().is_some()).count();
        if self.point_pool.is_some() && point_lights > MAX_POINT_SHADOWS {
            log::warn!(
                "{} point lights queued; only the first {} cast shadows",
                point_lights,
                MAX_POINT_SHADOWS
            );
        }

        if self.directional_target.is_some()
            && !self.lights.is_empty()
            && !self.lights.iter().any(Light::is_directional)
        {
            log::debug!("No directional light; shadow map uses the default direction");
        }
    }

    fn first_directional(&self) -> Option<Vec3> {
        self.lights.iter().find(|l| l.is_directional()).map(Light::direction)
    }

    /// Fill the directional map, then the point cube maps
    fn shadow_pass(&mut self, ctx: &dyn GraphicsContext, stats: &mut FrameStats) -> LightSpace {
        let light_space = directional_light_space(self.first_directional());
        let _framebuffer = ScopedFramebuffer::save(ctx);

        if let (Some(target), Some(shader)) = (&self.directional_target, self.directional_shader) {
            let _cull = ScopedCullMode::new(ctx, Some(CullFace::Front));
            let _viewport = ScopedViewport::restoring_to(ctx, self.window);

            ctx.use_program(shader);
            ctx.set_uniform(shader, "lightSpaceMatrix", light_space.matrix.into());
            target.begin_write();
            ctx.clear(ClearFlags::DEPTH);
            stats.draw_submissions += draw_depth(ctx, shader, &self.objects);
            target.end_write();

            log::debug!("Directional depth pass from {:?}", light_space.position);
        }

        if let Some(pool) = self.point_pool.as_mut() {
            let point_lights = self.lights.iter().enumerate().filter_map(|(light_index, light)| {
                light
                    .point_position()
                    .map(|position| PointShadowAssignment { light_index, position })
            });
            stats.point_shadows = pool.assign(point_lights);

            if stats.point_shadows > 0 {
                let shader = pool.shader();
                let far_plane = pool.far_plane();
                let _cull = ScopedCullMode::new(ctx, Some(CullFace::Front));
                let _viewport = ScopedViewport::restoring_to(ctx, self.window);

                ctx.use_program(shader);
                ctx.set_uniform(shader, "far_plane", far_plane.into());

                for (assignment, target) in pool.active() {
                    ctx.set_uniform(shader, "lightPos", assignment.position.into());
                    target.begin_write();
                    let matrices = cube_face_matrices(assignment.position, far_plane);
                    for (face, matrix) in CubeFace::all().zip(matrices) {
                        target.attach_face(face);
                        if face.index() == 0 && !ctx.is_framebuffer_complete(target.framebuffer()) {
                            log::debug!(
                                "Point shadow framebuffer {:?} incomplete for light {}",
                                target.framebuffer(),
                                assignment.light_index
                            );
                            stats.incomplete_point_targets += 1;
                        }
                        ctx.clear(ClearFlags::DEPTH);
                        ctx.set_uniform(shader, "lightSpaceMatrix", matrix.into());
                        stats.draw_submissions += draw_depth(ctx, shader, &self.objects);
                    }
                    target.end_write();
                }

                log::debug!("Point depth passes for {} lights", stats.point_shadows);
            }
        }

        light_space
    }

    fn lighting_pass(
        &self,
        ctx: &dyn GraphicsContext,
        light_space: &LightSpace,
        stats: &mut FrameStats,
    ) {
        let shader = self.lit_shader;
        ctx.use_program(shader);
        self.write_camera(ctx);

        ctx.set_uniform(shader, "shadowsEnabled", true.into());
        ctx.set_uniform(shader, "lightSpaceMatrix", light_space.matrix.into());
        self.write_sampler_units(ctx);
        if let Some(target) = &self.directional_target {
            target.bind_for_read(DIRECTIONAL_SHADOW_UNIT);
        }

        let mut active = 0;
        if let Some(pool) = &self.point_pool {
            for (slot, (assignment, target)) in pool.active().enumerate() {
                target.bind_for_read(POINT_SHADOW_FIRST_UNIT + slot as u32);
                ctx.set_uniform(
                    shader,
                    &format!("pointShadowPositions[{slot}]"),
                    assignment.position.into(),
                );
                active += 1;
            }
            ctx.set_uniform(shader, "far_plane", pool.far_plane().into());
        }
        unbind_point_shadows(ctx, active);
        ctx.set_uniform(shader, "numPointShadows", (active as i32).into());

        stats.lights_uploaded = write_light_uniforms(ctx, shader, &self.lights);
        stats.draw_submissions += self.draw_lit(ctx);
    }

    fn unshadowed_pass(&self, ctx: &dyn GraphicsContext, stats: &mut FrameStats) {
        let shader = self.lit_shader;
        ctx.use_program(shader);
        self.write_camera(ctx);

        // Samplers of different types must never share a unit, even unused ones
        self.write_sampler_units(ctx);
        unbind_point_shadows(ctx, 0);

        ctx.set_uniform(shader, "shadowsEnabled", false.into());
        ctx.set_uniform(shader, "lightSpaceMatrix", Mat4::zeros().into());
        ctx.set_uniform(shader, "numPointShadows", 0_i32.into());

        stats.lights_uploaded = write_light_uniforms(ctx, shader, &self.lights);
        stats.draw_submissions += self.draw_lit(ctx);
    }

    /// Point every sampler of the lit shader at its fixed unit
    fn write_sampler_units(&self, ctx: &dyn GraphicsContext) {
        let shader = self.lit_shader;
        ctx.set_uniform(shader, "shadowMap", (DIRECTIONAL_SHADOW_UNIT as i32).into());
        for slot in 0..MAX_POINT_SHADOWS {
            let unit = POINT_SHADOW_FIRST_UNIT + slot as u32;
            ctx.set_uniform(shader, &format!("pointShadowMaps[{slot}]"), (unit as i32).into());
        }
        ctx.set_uniform(shader, "diffuseTexture", (DIFFUSE_TEXTURE_UNIT as i32).into());
    }

    fn write_camera(&self, ctx: &dyn GraphicsContext) {
        if let Some(camera) = &self.camera {
            ctx.set_uniform(self.lit_shader, "view", camera.view.into());
            ctx.set_uniform(self.lit_shader, "projection", camera.projection.into());
            ctx.set_uniform(self.lit_shader, "camPos", camera.position.into());
        }
    }

    fn draw_lit(&self, ctx: &dyn GraphicsContext) -> usize {
        let shader = self.lit_shader;
        for object in &self.objects {
            ctx.set_uniform(shader, "model", object.transform.into());
            object.material.apply(ctx, shader);
            ctx.set_uniform(shader, "objectColor", object.color.into());

            match object.texture {
                Some(texture) => {
                    ctx.bind_texture(DIFFUSE_TEXTURE_UNIT, TextureTarget::Texture2d, Some(texture));
                    ctx.set_uniform(shader, "useTexture", true.into());
                }
                None => ctx.set_uniform(shader, "useTexture", false.into()),
            }

            object.geometry.draw(ctx);
        }
        self.objects.len()
    }
}

/// Unbind cube maps from the point shadow units at `first_slot` and beyond
///
/// Stale cube maps from earlier frames must not be sampled.
fn unbind_point_shadows(ctx: &dyn GraphicsContext, first_slot: usize) {
    for slot in first_slot..MAX_POINT_SHADOWS {
        ctx.bind_texture(POINT_SHADOW_FIRST_UNIT + slot as u32, TextureTarget::CubeMap, None);
    }
}

/// Draw every object with a depth-only program; returns the submissions issued
fn draw_depth(ctx: &dyn GraphicsContext, shader: ProgramId, objects: &[DrawableObject<'_>]) -> usize {
    for object in objects {
        ctx.set_uniform(shader, "model", object.transform.into());
        object.geometry.draw(ctx);
    }
    objects.len()
}

impl std::fmt::Debug for RenderPipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("state", &self.state())
            .field("objects", &self.objects.len())
            .field("lights", &self.lights.len())
            .field("window", &self.window)
            .field("last_frame", &self.last_frame)
            .finish_non_exhaustive()
    }
}
