//! Headless graphics backend
//!
//! An in-memory [`GraphicsContext`] that records every state change and draw
//! submission instead of talking to a GPU. It tracks live resources so leaks and
//! double frees are observable, and supports failure injection for the
//! allocation paths. Used by the test suite and by the demo application.

use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::render::api::{
    ClearFlags, CullFace, DepthAttachment, FramebufferId, GraphicsContext, ProgramId,
    TextureId, TextureTarget, UniformValue, VertexArrayId, Viewport,
};
use crate::render::{RenderError, RenderResult};

/// Largest texture edge the headless device accepts
pub const MAX_TEXTURE_SIZE: u32 = 16384;

/// Kind and size of a live texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRecord {
    /// 2D depth texture
    Depth2d {
        /// Width in texels
        width: u32,
        /// Height in texels
        height: u32,
    },
    /// Depth cube map
    DepthCube {
        /// Edge length of each face
        size: u32,
    },
    /// Color texture registered by a scene collaborator
    Color2d,
}

/// Attachments of a live framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferRecord {
    /// Current depth attachment
    pub depth: Option<DepthAttachment>,
    /// Whether color draw buffers are enabled
    pub color_writes: bool,
}

/// One draw submission and the state it was issued under
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    /// Program current at draw time
    pub program: Option<ProgramId>,
    /// Render destination; `None` is the window
    pub framebuffer: Option<FramebufferId>,
    /// Depth attachment of the destination framebuffer
    pub depth_attachment: Option<DepthAttachment>,
    /// Whether the destination accepts color writes
    pub color_writes: bool,
    /// Viewport at draw time
    pub viewport: Viewport,
    /// Face culling at draw time
    pub cull: Option<CullFace>,
    /// Geometry drawn
    pub vertex_array: VertexArrayId,
    /// Number of indices submitted
    pub index_count: u32,
}

/// A recorded context operation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Framebuffer bound
    BindFramebuffer(Option<FramebufferId>),
    /// Viewport changed
    SetViewport(Viewport),
    /// Culling changed
    SetCullMode(Option<CullFace>),
    /// Buffers cleared on the bound destination
    Clear(Option<FramebufferId>, ClearFlags),
    /// Depth attachment changed
    AttachDepth(FramebufferId, DepthAttachment),
    /// Texture bound to a unit
    BindTexture(u32, TextureTarget, Option<TextureId>),
    /// Program made current
    UseProgram(ProgramId),
    /// Uniform written
    SetUniform(ProgramId, String, UniformValue),
    /// Draw submitted
    Draw(DrawRecord),
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u32,
    textures: HashMap<TextureId, TextureRecord>,
    framebuffers: HashMap<FramebufferId, FramebufferRecord>,
    programs: HashMap<ProgramId, String>,
    bound_framebuffer: Option<FramebufferId>,
    viewport: Viewport,
    cull: Option<CullFace>,
    texture_units: HashMap<u32, (TextureTarget, TextureId)>,
    current_program: Option<ProgramId>,
    uniforms: HashMap<(ProgramId, String), UniformValue>,
    commands: Vec<Command>,
    draws: Vec<DrawRecord>,
    allocation_budget: Option<usize>,
    incomplete_framebuffers: bool,
    invalid_deletes: usize,
}

impl HeadlessState {
    fn next_handle(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).unwrap_or(NonZeroU32::MIN)
    }

    fn take_allocation(&mut self, what: &str) -> RenderResult<()> {
        match self.allocation_budget.as_mut() {
            Some(0) => Err(RenderError::ResourceCreationFailed(format!(
                "headless allocation budget exhausted while creating {what}"
            ))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// In-memory graphics context
#[derive(Debug, Default)]
pub struct HeadlessContext {
    state: RefCell<HeadlessState>,
}

impl HeadlessContext {
    /// Create a context whose window viewport is `window`
    pub fn new(window: Viewport) -> Self {
        let state = HeadlessState {
            viewport: window,
            ..HeadlessState::default()
        };
        Self { state: RefCell::new(state) }
    }

    /// Register a shader program; shader compilation is not simulated
    pub fn create_program(&self, label: &str) -> ProgramId {
        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.next_handle());
        state.programs.insert(id, label.to_string());
        id
    }

    /// Register a vertex array standing in for uploaded geometry
    pub fn create_vertex_array(&self) -> VertexArrayId {
        VertexArrayId(self.state.borrow_mut().next_handle())
    }

    /// Register a color texture standing in for a decoded image
    pub fn create_color_texture(&self) -> TextureId {
        let mut state = self.state.borrow_mut();
        let id = TextureId(state.next_handle());
        state.textures.insert(id, TextureRecord::Color2d);
        id
    }

    /// Let the next `count` texture/framebuffer allocations succeed, then fail
    pub fn fail_allocations_after(&self, count: usize) {
        self.state.borrow_mut().allocation_budget = Some(count);
    }

    /// Remove any allocation limit
    pub fn clear_allocation_failures(&self) {
        self.state.borrow_mut().allocation_budget = None;
    }

    /// Report every framebuffer as incomplete while `incomplete` is set
    pub fn set_incomplete_framebuffers(&self, incomplete: bool) {
        self.state.borrow_mut().incomplete_framebuffers = incomplete;
    }

    /// Number of textures currently allocated
    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Number of depth textures (2D and cube) currently allocated
    pub fn live_depth_textures(&self) -> usize {
        self.state
            .borrow()
            .textures
            .values()
            .filter(|record| !matches!(record, TextureRecord::Color2d))
            .count()
    }

    /// Number of framebuffers currently allocated
    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    /// Deletes of handles that were not live (double frees)
    pub fn invalid_deletes(&self) -> usize {
        self.state.borrow().invalid_deletes
    }

    /// Record of a live texture
    pub fn texture(&self, texture: TextureId) -> Option<TextureRecord> {
        self.state.borrow().textures.get(&texture).copied()
    }

    /// Record of a live framebuffer
    pub fn framebuffer(&self, framebuffer: FramebufferId) -> Option<FramebufferRecord> {
        self.state.borrow().framebuffers.get(&framebuffer).copied()
    }

    /// Texture bound at `unit`
    pub fn texture_at(&self, unit: u32) -> Option<(TextureTarget, TextureId)> {
        self.state.borrow().texture_units.get(&unit).copied()
    }

    /// Last value written to a program's uniform
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniforms
            .get(&(program, name.to_string()))
            .copied()
    }

    /// Program currently in use
    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().current_program
    }

    /// Draw submissions since the last [`reset_frame_log`](Self::reset_frame_log)
    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    /// Number of draw submissions since the last reset
    pub fn draw_count(&self) -> usize {
        self.state.borrow().draws.len()
    }

    /// Operations recorded since the last reset
    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Forget recorded commands and draws; resources and state are kept
    pub fn reset_frame_log(&self) {
        let mut state = self.state.borrow_mut();
        state.commands.clear();
        state.draws.clear();
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_depth_texture(&self, width: u32, height: u32) -> RenderResult<TextureId> {
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(RenderError::ResourceCreationFailed(format!(
                "depth texture size {width}x{height} outside 1..={MAX_TEXTURE_SIZE}"
            )));
        }
        let mut state = self.state.borrow_mut();
        state.take_allocation("depth texture")?;
        let id = TextureId(state.next_handle());
        state.textures.insert(id, TextureRecord::Depth2d { width, height });
        Ok(id)
    }

    fn create_depth_cubemap(&self, size: u32) -> RenderResult<TextureId> {
        if size == 0 || size > MAX_TEXTURE_SIZE {
            return Err(RenderError::ResourceCreationFailed(format!(
                "cube map size {size} outside 1..={MAX_TEXTURE_SIZE}"
            )));
        }
        let mut state = self.state.borrow_mut();
        state.take_allocation("depth cube map")?;
        let id = TextureId(state.next_handle());
        state.textures.insert(id, TextureRecord::DepthCube { size });
        Ok(id)
    }

    fn create_depth_framebuffer(&self) -> RenderResult<FramebufferId> {
        let mut state = self.state.borrow_mut();
        state.take_allocation("framebuffer")?;
        let id = FramebufferId(state.next_handle());
        state.framebuffers.insert(id, FramebufferRecord { depth: None, color_writes: false });
        Ok(id)
    }

    fn attach_depth(&self, framebuffer: FramebufferId, attachment: DepthAttachment) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.framebuffers.get_mut(&framebuffer) {
            record.depth = Some(attachment);
        } else {
            log::warn!("attach_depth on unknown framebuffer {:?}", framebuffer);
        }
        state.commands.push(Command::AttachDepth(framebuffer, attachment));
    }

    fn is_framebuffer_complete(&self, framebuffer: FramebufferId) -> bool {
        let state = self.state.borrow();
        if state.incomplete_framebuffers {
            return false;
        }
        let Some(record) = state.framebuffers.get(&framebuffer) else {
            return false;
        };
        match record.depth {
            Some(DepthAttachment::Texture(tex)) => {
                matches!(state.textures.get(&tex), Some(TextureRecord::Depth2d { .. }))
            }
            Some(DepthAttachment::CubeFace(tex, _)) => {
                matches!(state.textures.get(&tex), Some(TextureRecord::DepthCube { .. }))
            }
            None => false,
        }
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        if state.textures.remove(&texture).is_none() {
            log::warn!("delete of unknown texture {:?}", texture);
            state.invalid_deletes += 1;
        }
        state.texture_units.retain(|_, (_, bound)| *bound != texture);
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        let mut state = self.state.borrow_mut();
        if state.framebuffers.remove(&framebuffer).is_none() {
            log::warn!("delete of unknown framebuffer {:?}", framebuffer);
            state.invalid_deletes += 1;
        }
        if state.bound_framebuffer == Some(framebuffer) {
            state.bound_framebuffer = None;
        }
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        let mut state = self.state.borrow_mut();
        state.bound_framebuffer = framebuffer;
        state.commands.push(Command::BindFramebuffer(framebuffer));
    }

    fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_framebuffer
    }

    fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn set_viewport(&self, viewport: Viewport) {
        let mut state = self.state.borrow_mut();
        state.viewport = viewport;
        state.commands.push(Command::SetViewport(viewport));
    }

    fn cull_mode(&self) -> Option<CullFace> {
        self.state.borrow().cull
    }

    fn set_cull_mode(&self, mode: Option<CullFace>) {
        let mut state = self.state.borrow_mut();
        state.cull = mode;
        state.commands.push(Command::SetCullMode(mode));
    }

    fn clear(&self, flags: ClearFlags) {
        let mut state = self.state.borrow_mut();
        let target = state.bound_framebuffer;
        state.commands.push(Command::Clear(target, flags));
    }

    fn bind_texture(&self, unit: u32, target: TextureTarget, texture: Option<TextureId>) {
        let mut state = self.state.borrow_mut();
        match texture {
            Some(tex) => {
                state.texture_units.insert(unit, (target, tex));
            }
            None => {
                state.texture_units.remove(&unit);
            }
        }
        state.commands.push(Command::BindTexture(unit, target, texture));
    }

    fn use_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        state.current_program = Some(program);
        state.commands.push(Command::UseProgram(program));
    }

    fn set_uniform(&self, program: ProgramId, name: &str, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        state.uniforms.insert((program, name.to_string()), value);
        state.commands.push(Command::SetUniform(program, name.to_string(), value));
    }

    fn draw_indexed(&self, vertex_array: VertexArrayId, index_count: u32) {
        let mut state = self.state.borrow_mut();
        let framebuffer = state.bound_framebuffer;
        let record = framebuffer.and_then(|fb| state.framebuffers.get(&fb).copied());
        let draw = DrawRecord {
            program: state.current_program,
            framebuffer,
            depth_attachment: record.and_then(|r| r.depth),
            // The window always accepts color
            color_writes: record.map_or(true, |r| r.color_writes),
            viewport: state.viewport,
            cull: state.cull,
            vertex_array,
            index_count,
        };
        state.draws.push(draw);
        state.commands.push(Command::Draw(draw));
    }
}
