//! Graphics context abstraction
//!
//! The graphics context is process-wide shared state: bound framebuffer,
//! viewport, face culling and texture units. Every backend implements
//! [`GraphicsContext`] with `&self` methods so resources and passes can hold a
//! shared `Rc` to it, the same way a GL context is shared between owners.

use std::num::NonZeroU32;

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec3};
use crate::render::RenderResult;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw backend object name
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gpu_handle!(
    /// Handle to a texture object owned by the backend
    TextureId
);
gpu_handle!(
    /// Handle to an off-screen framebuffer
    FramebufferId
);
gpu_handle!(
    /// Handle to a linked shader program
    ProgramId
);
gpu_handle!(
    /// Handle to a vertex array holding indexed geometry
    VertexArrayId
);

/// Viewport rectangle in window pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Viewport covering a target of the given size from the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Which polygon faces are culled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Cull front faces (used by depth passes against shadow acne)
    Front,
    /// Cull back faces
    Back,
}

bitflags! {
    /// Buffers cleared by [`GraphicsContext::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color attachments
        const COLOR = 0b01;
        /// Depth attachment
        const DEPTH = 0b10;
    }
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Plain 2D texture
    Texture2d,
    /// Six-faced cube map
    CubeMap,
}

/// One face of a cube map, in `+X, -X, +Y, -Y, +Z, -Z` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeFace(u8);

impl CubeFace {
    /// Number of faces in a cube map
    pub const COUNT: usize = 6;

    /// Face at `index`, or `None` when out of range
    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then(|| Self(index as u8))
    }

    /// All six faces in attachment order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Face index in `0..6`
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// What gets attached as a framebuffer's depth attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAttachment {
    /// A full 2D depth texture
    Texture(TextureId),
    /// A single face of a depth cube map
    CubeFace(TextureId, CubeFace),
}

/// Value written to a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` / sampler unit
    Int(i32),
    /// `bool`
    Bool(bool),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3(Vec3),
    /// `mat4`
    Mat4(Mat4),
}

impl UniformValue {
    /// Integer payload, if this is an `Int`
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload, if this is a `Float`
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Bool payload, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Vector payload, if this is a `Vec3`
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Matrix payload, if this is a `Mat4`
    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            Self::Mat4(m) => Some(*m),
            _ => None,
        }
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

/// Process-wide graphics context
///
/// Backends implement this over a real API (see `GlContext`) or in memory
/// (`HeadlessContext`). Methods mirror the minimal set of context operations the
/// shadow pipeline issues; nothing here allocates per frame.
pub trait GraphicsContext {
    /// Allocate a 2D depth texture (24-bit, nearest filtering, white clamp-to-border)
    fn create_depth_texture(&self, width: u32, height: u32) -> RenderResult<TextureId>;

    /// Allocate a depth cube map with six square faces (24-bit, linear filtering, clamp-to-edge)
    fn create_depth_cubemap(&self, size: u32) -> RenderResult<TextureId>;

    /// Allocate a framebuffer whose color draw and read buffers are disabled
    fn create_depth_framebuffer(&self) -> RenderResult<FramebufferId>;

    /// Attach a depth texture or cube face to a framebuffer
    fn attach_depth(&self, framebuffer: FramebufferId, attachment: DepthAttachment);

    /// Whether the framebuffer can be rendered into
    fn is_framebuffer_complete(&self, framebuffer: FramebufferId) -> bool;

    /// Release a texture
    fn delete_texture(&self, texture: TextureId);

    /// Release a framebuffer
    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    /// Bind a framebuffer as render destination; `None` selects the window
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>);

    /// Currently bound render destination
    fn bound_framebuffer(&self) -> Option<FramebufferId>;

    /// Current viewport
    fn viewport(&self) -> Viewport;

    /// Set the viewport
    fn set_viewport(&self, viewport: Viewport);

    /// Current face culling; `None` means culling is disabled
    fn cull_mode(&self) -> Option<CullFace>;

    /// Enable culling of the given faces, or disable culling with `None`
    fn set_cull_mode(&self, mode: Option<CullFace>);

    /// Clear buffers of the bound render destination
    fn clear(&self, flags: ClearFlags);

    /// Bind a texture (or unbind with `None`) at a texture unit
    fn bind_texture(&self, unit: u32, target: TextureTarget, texture: Option<TextureId>);

    /// Make a program current
    fn use_program(&self, program: ProgramId);

    /// Write a named uniform of a program
    fn set_uniform(&self, program: ProgramId, name: &str, value: UniformValue);

    /// Bind a vertex array and issue one indexed triangle draw
    fn draw_indexed(&self, vertex_array: VertexArrayId, index_count: u32);
}
