//! Directional shadow map render target
//!
//! A single 2D depth texture attached to a depth-only framebuffer. Resources
//! are released when the target drops; reconfiguring replaces the whole value.

use std::rc::Rc;

use crate::render::api::{
    DepthAttachment, FramebufferId, GraphicsContext, TextureId, TextureTarget, Viewport,
};
use crate::render::state::ScopedFramebuffer;

use super::{ShadowError, ShadowResult};

const TARGET_NAME: &str = "directional shadow map";

/// Depth-only render target for the directional light
pub struct DirectionalShadowTarget {
    ctx: Rc<dyn GraphicsContext>,
    framebuffer: FramebufferId,
    depth_map: TextureId,
    width: u32,
    height: u32,
}

impl DirectionalShadowTarget {
    /// Allocate a framebuffer-complete depth target of `width` x `height`
    pub fn new(ctx: Rc<dyn GraphicsContext>, width: u32, height: u32) -> ShadowResult<Self> {
        if width == 0 || height == 0 {
            return Err(ShadowError::InvalidResolution { width, height });
        }

        let depth_map = ctx
            .create_depth_texture(width, height)
            .map_err(|e| ShadowError::allocation(TARGET_NAME, e))?;
        let framebuffer = match ctx.create_depth_framebuffer() {
            Ok(fb) => fb,
            Err(e) => {
                ctx.delete_texture(depth_map);
                return Err(ShadowError::allocation(TARGET_NAME, e));
            }
        };

        // From here on, an early return drops `target` and frees both handles
        let target = Self { ctx, framebuffer, depth_map, width, height };

        let complete = {
            let _restore = ScopedFramebuffer::save(target.ctx.as_ref());
            target.ctx.bind_framebuffer(Some(framebuffer));
            target.ctx.attach_depth(framebuffer, DepthAttachment::Texture(depth_map));
            target.ctx.is_framebuffer_complete(framebuffer)
        };

        if !complete {
            return Err(ShadowError::ResourceAllocationFailure {
                target: TARGET_NAME,
                reason: "framebuffer not complete".to_string(),
            });
        }

        log::debug!("Created {}x{} directional shadow map {:?}", width, height, depth_map);
        Ok(target)
    }

    /// Release whatever `slot` holds, then build a fresh target into it
    ///
    /// On failure `slot` is left empty; the old target is never kept around.
    pub fn configure(
        slot: &mut Option<Self>,
        ctx: Rc<dyn GraphicsContext>,
        width: u32,
        height: u32,
    ) -> ShadowResult<()> {
        drop(slot.take());
        *slot = Some(Self::new(ctx, width, height)?);
        Ok(())
    }

    /// Bind as the render destination and size the viewport to the target
    pub fn begin_write(&self) {
        self.ctx.bind_framebuffer(Some(self.framebuffer));
        self.ctx.set_viewport(Viewport::from_size(self.width, self.height));
    }

    /// Bind the window again; the caller restores the window viewport
    pub fn end_write(&self) {
        self.ctx.bind_framebuffer(None);
    }

    /// Bind the depth texture for sampling at texture `unit`
    pub fn bind_for_read(&self, unit: u32) {
        self.ctx.bind_texture(unit, TextureTarget::Texture2d, Some(self.depth_map));
    }

    /// Depth texture handle
    pub fn depth_map(&self) -> TextureId {
        self.depth_map
    }

    /// Framebuffer handle
    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer
    }

    /// Resolution as `(width, height)`
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for DirectionalShadowTarget {
    fn drop(&mut self) {
        self.ctx.delete_framebuffer(self.framebuffer);
        self.ctx.delete_texture(self.depth_map);
    }
}

impl std::fmt::Debug for DirectionalShadowTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectionalShadowTarget")
            .field("framebuffer", &self.framebuffer)
            .field("depth_map", &self.depth_map)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
