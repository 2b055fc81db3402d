//! OpenGL backend over `glow`
//!
//! [`GlContext`] wraps a `glow::Context` created by the windowing layer. GL
//! state the pipeline reads back (bound framebuffer, viewport, culling) is
//! mirrored on the Rust side so queries never stall the driver. Uniform
//! locations are looked up once per `(program, name)` and cached.

use std::cell::RefCell;
use std::collections::HashMap;

use glow::HasContext;

use crate::render::api::{
    ClearFlags, CullFace, DepthAttachment, FramebufferId, GraphicsContext, ProgramId, TextureId,
    TextureTarget, UniformValue, VertexArrayId, Viewport,
};
use crate::render::{RenderError, RenderResult};

/// GLSL sources matching the uniform layout the pipeline writes
pub mod shaders {
    /// Lit pass vertex shader
    pub const LIT_VERT: &str = include_str!("../../../resources/shaders/lit.vert");
    /// Lit pass fragment shader
    pub const LIT_FRAG: &str = include_str!("../../../resources/shaders/lit.frag");
    /// Directional depth-only vertex shader
    pub const SHADOW_DEPTH_VERT: &str = include_str!("../../../resources/shaders/shadow_depth.vert");
    /// Directional depth-only fragment shader
    pub const SHADOW_DEPTH_FRAG: &str = include_str!("../../../resources/shaders/shadow_depth.frag");
    /// Point-light depth vertex shader
    pub const POINT_SHADOW_DEPTH_VERT: &str =
        include_str!("../../../resources/shaders/point_shadow_depth.vert");
    /// Point-light depth fragment shader writing linear distance
    pub const POINT_SHADOW_DEPTH_FRAG: &str =
        include_str!("../../../resources/shaders/point_shadow_depth.frag");
}

#[derive(Debug, Default)]
struct GlState {
    bound_framebuffer: Option<FramebufferId>,
    viewport: Viewport,
    cull: Option<CullFace>,
    uniform_locations: HashMap<(ProgramId, String), Option<glow::UniformLocation>>,
}

/// Graphics context backed by a live OpenGL 3.3 context
pub struct GlContext {
    gl: glow::Context,
    state: RefCell<GlState>,
}

fn texture(id: TextureId) -> glow::Texture {
    glow::NativeTexture(id.0)
}

fn framebuffer(id: FramebufferId) -> glow::Framebuffer {
    glow::NativeFramebuffer(id.0)
}

fn program(id: ProgramId) -> glow::Program {
    glow::NativeProgram(id.0)
}

fn vertex_array(id: VertexArrayId) -> glow::VertexArray {
    glow::NativeVertexArray(id.0)
}

fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl GlContext {
    /// Wrap a current GL context whose default framebuffer has the given size
    pub fn new(gl: glow::Context, window: Viewport) -> Self {
        let ctx = Self {
            gl,
            state: RefCell::new(GlState { viewport: window, ..GlState::default() }),
        };
        // SAFETY: the caller hands over a current context
        unsafe {
            ctx.gl.enable(glow::DEPTH_TEST);
            ctx.gl.disable(glow::CULL_FACE);
            ctx.gl.viewport(window.x, window.y, gl_size(window.width), gl_size(window.height));
        }
        ctx
    }

    /// Underlying `glow` context, for uploading geometry and textures
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Compile and link a vertex + fragment program
    pub fn compile_program(&self, vertex_src: &str, fragment_src: &str) -> RenderResult<ProgramId> {
        unsafe {
            let vs = self.compile_shader(glow::VERTEX_SHADER, vertex_src)?;
            let fs = match self.compile_shader(glow::FRAGMENT_SHADER, fragment_src) {
                Ok(fs) => fs,
                Err(e) => {
                    self.gl.delete_shader(vs);
                    return Err(e);
                }
            };

            let prog = self
                .gl
                .create_program()
                .map_err(RenderError::ResourceCreationFailed)?;
            self.gl.attach_shader(prog, vs);
            self.gl.attach_shader(prog, fs);
            self.gl.link_program(prog);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);

            if !self.gl.get_program_link_status(prog) {
                let log = self.gl.get_program_info_log(prog);
                self.gl.delete_program(prog);
                return Err(RenderError::InitializationFailed(format!("Shader link error: {log}")));
            }

            log::debug!("Linked GL program {:?}", prog);
            Ok(ProgramId(prog.0))
        }
    }

    unsafe fn compile_shader(&self, kind: u32, source: &str) -> RenderResult<glow::Shader> {
        let shader = self
            .gl
            .create_shader(kind)
            .map_err(RenderError::ResourceCreationFailed)?;
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
        if !self.gl.get_shader_compile_status(shader) {
            let log = self.gl.get_shader_info_log(shader);
            self.gl.delete_shader(shader);
            return Err(RenderError::InitializationFailed(format!("Shader compile error: {log}")));
        }
        Ok(shader)
    }

    /// Release a program and its cached uniform locations
    pub fn delete_program(&self, id: ProgramId) {
        self.state.borrow_mut().uniform_locations.retain(|(p, _), _| *p != id);
        unsafe { self.gl.delete_program(program(id)) };
    }

    /// Handle for a vertex array created through [`gl`](Self::gl)
    pub fn wrap_vertex_array(vao: glow::VertexArray) -> VertexArrayId {
        VertexArrayId(vao.0)
    }

    /// Handle for a 2D texture created through [`gl`](Self::gl)
    pub fn wrap_texture(tex: glow::Texture) -> TextureId {
        TextureId(tex.0)
    }

    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<glow::UniformLocation> {
        let key = (id, name.to_string());
        if let Some(location) = self.state.borrow().uniform_locations.get(&key) {
            return location.clone();
        }
        let location = unsafe { self.gl.get_uniform_location(program(id), name) };
        if location.is_none() {
            // Unused uniforms are optimized out by the driver
            log::trace!("Uniform '{}' not active in program {:?}", name, id);
        }
        self.state.borrow_mut().uniform_locations.insert(key, location.clone());
        location
    }
}

impl GraphicsContext for GlContext {
    fn create_depth_texture(&self, width: u32, height: u32) -> RenderResult<TextureId> {
        unsafe {
            let tex = self
                .gl
                .create_texture()
                .map_err(RenderError::ResourceCreationFailed)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::DEPTH_COMPONENT24 as i32,
                gl_size(width),
                gl_size(height),
                0,
                glow::DEPTH_COMPONENT,
                glow::FLOAT,
                None,
            );
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_BORDER as i32);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_BORDER as i32);
            // Samples outside the map read as fully lit
            self.gl.tex_parameter_f32_slice(
                glow::TEXTURE_2D,
                glow::TEXTURE_BORDER_COLOR,
                &[1.0, 1.0, 1.0, 1.0],
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(TextureId(tex.0))
        }
    }

    fn create_depth_cubemap(&self, size: u32) -> RenderResult<TextureId> {
        unsafe {
            let tex = self
                .gl
                .create_texture()
                .map_err(RenderError::ResourceCreationFailed)?;
            self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(tex));
            for face in 0..6 {
                self.gl.tex_image_2d(
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                    0,
                    glow::DEPTH_COMPONENT24 as i32,
                    gl_size(size),
                    gl_size(size),
                    0,
                    glow::DEPTH_COMPONENT,
                    glow::FLOAT,
                    None,
                );
            }
            for (param, value) in [
                (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
                (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_R, glow::CLAMP_TO_EDGE),
            ] {
                self.gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, param, value as i32);
            }
            self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
            Ok(TextureId(tex.0))
        }
    }

    fn create_depth_framebuffer(&self) -> RenderResult<FramebufferId> {
        let previous = self.bound_framebuffer();
        unsafe {
            let fb = self
                .gl
                .create_framebuffer()
                .map_err(RenderError::ResourceCreationFailed)?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fb));
            self.gl.draw_buffer(glow::NONE);
            self.gl.read_buffer(glow::NONE);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous.map(framebuffer));
            Ok(FramebufferId(fb.0))
        }
    }

    fn attach_depth(&self, fb: FramebufferId, attachment: DepthAttachment) {
        let previous = self.bound_framebuffer();
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer(fb)));
            match attachment {
                DepthAttachment::Texture(tex) => self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_ATTACHMENT,
                    glow::TEXTURE_2D,
                    Some(texture(tex)),
                    0,
                ),
                DepthAttachment::CubeFace(tex, face) => self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_ATTACHMENT,
                    glow::TEXTURE_CUBE_MAP_POSITIVE_X + face.index() as u32,
                    Some(texture(tex)),
                    0,
                ),
            }
            if previous != Some(fb) {
                self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous.map(framebuffer));
            }
        }
    }

    fn is_framebuffer_complete(&self, fb: FramebufferId) -> bool {
        let previous = self.bound_framebuffer();
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer(fb)));
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous.map(framebuffer));
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::warn!("Framebuffer {:?} incomplete: status 0x{:X}", fb, status);
            }
            status == glow::FRAMEBUFFER_COMPLETE
        }
    }

    fn delete_texture(&self, tex: TextureId) {
        unsafe { self.gl.delete_texture(texture(tex)) };
    }

    fn delete_framebuffer(&self, fb: FramebufferId) {
        let mut state = self.state.borrow_mut();
        if state.bound_framebuffer == Some(fb) {
            state.bound_framebuffer = None;
        }
        unsafe { self.gl.delete_framebuffer(framebuffer(fb)) };
    }

    fn bind_framebuffer(&self, fb: Option<FramebufferId>) {
        self.state.borrow_mut().bound_framebuffer = fb;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, fb.map(framebuffer)) };
    }

    fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_framebuffer
    }

    fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().viewport = viewport;
        unsafe {
            self.gl.viewport(
                viewport.x,
                viewport.y,
                gl_size(viewport.width),
                gl_size(viewport.height),
            );
        }
    }

    fn cull_mode(&self) -> Option<CullFace> {
        self.state.borrow().cull
    }

    fn set_cull_mode(&self, mode: Option<CullFace>) {
        self.state.borrow_mut().cull = mode;
        unsafe {
            match mode {
                Some(face) => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(match face {
                        CullFace::Front => glow::FRONT,
                        CullFace::Back => glow::BACK,
                    });
                }
                None => self.gl.disable(glow::CULL_FACE),
            }
        }
    }

    fn clear(&self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) };
    }

    fn bind_texture(&self, unit: u32, target: TextureTarget, tex: Option<TextureId>) {
        let target = match target {
            TextureTarget::Texture2d => glow::TEXTURE_2D,
            TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        };
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(target, tex.map(texture));
        }
    }

    fn use_program(&self, id: ProgramId) {
        unsafe { self.gl.use_program(Some(program(id))) };
    }

    fn set_uniform(&self, id: ProgramId, name: &str, value: UniformValue) {
        let Some(location) = self.uniform_location(id, name) else {
            return;
        };
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Bool(v) => self.gl.uniform_1_i32(location, i32::from(v)),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, m.as_slice()),
            }
        }
    }

    fn draw_indexed(&self, vao: VertexArrayId, index_count: u32) {
        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array(vao)));
            self.gl.draw_elements(glow::TRIANGLES, gl_size(index_count), glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}
