//! Scoped graphics-state guards
//!
//! Each guard changes one piece of context-global state on construction and
//! puts it back when dropped, so every exit path of a pass (including early
//! returns) leaves the context as it found it.

use crate::render::api::{CullFace, FramebufferId, GraphicsContext, Viewport};

/// Restores a viewport when dropped
#[must_use = "the viewport is restored as soon as the guard is dropped"]
pub struct ScopedViewport<'a> {
    ctx: &'a dyn GraphicsContext,
    restore: Viewport,
}

impl<'a> ScopedViewport<'a> {
    /// Remember the current viewport and restore it on drop
    pub fn save(ctx: &'a dyn GraphicsContext) -> Self {
        let restore = ctx.viewport();
        Self { ctx, restore }
    }

    /// Restore `restore` on drop, whatever the viewport is now
    pub fn restoring_to(ctx: &'a dyn GraphicsContext, restore: Viewport) -> Self {
        Self { ctx, restore }
    }

    /// Viewport that will be restored
    pub fn restore_target(&self) -> Viewport {
        self.restore
    }
}

impl Drop for ScopedViewport<'_> {
    fn drop(&mut self) {
        self.ctx.set_viewport(self.restore);
    }
}

/// Sets face culling for a scope and restores the previous mode on drop
#[must_use = "culling is restored as soon as the guard is dropped"]
pub struct ScopedCullMode<'a> {
    ctx: &'a dyn GraphicsContext,
    previous: Option<CullFace>,
}

impl<'a> ScopedCullMode<'a> {
    /// Switch culling to `mode` until the guard drops
    pub fn new(ctx: &'a dyn GraphicsContext, mode: Option<CullFace>) -> Self {
        let previous = ctx.cull_mode();
        ctx.set_cull_mode(mode);
        Self { ctx, previous }
    }
}

impl Drop for ScopedCullMode<'_> {
    fn drop(&mut self) {
        self.ctx.set_cull_mode(self.previous);
    }
}

/// Binds a render destination for a scope and rebinds the previous one on drop
#[must_use = "the previous framebuffer is rebound as soon as the guard is dropped"]
pub struct ScopedFramebuffer<'a> {
    ctx: &'a dyn GraphicsContext,
    previous: Option<FramebufferId>,
}

impl<'a> ScopedFramebuffer<'a> {
    /// Remember the bound framebuffer; the caller binds the new one
    pub fn save(ctx: &'a dyn GraphicsContext) -> Self {
        let previous = ctx.bound_framebuffer();
        Self { ctx, previous }
    }
}

impl Drop for ScopedFramebuffer<'_> {
    fn drop(&mut self) {
        self.ctx.bind_framebuffer(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessContext;

    #[test]
    fn test_viewport_restored_on_drop() {
        let ctx = HeadlessContext::new(Viewport::from_size(800, 600));
        {
            let _guard = ScopedViewport::save(&ctx);
            ctx.set_viewport(Viewport::from_size(1024, 1024));
            assert_eq!(ctx.viewport(), Viewport::from_size(1024, 1024));
        }
        assert_eq!(ctx.viewport(), Viewport::from_size(800, 600));
    }

    #[test]
    fn test_viewport_restoring_to_window() {
        let ctx = HeadlessContext::new(Viewport::from_size(10, 10));
        {
            let guard = ScopedViewport::restoring_to(&ctx, Viewport::from_size(1920, 1080));
            assert_eq!(guard.restore_target(), Viewport::from_size(1920, 1080));
        }
        assert_eq!(ctx.viewport(), Viewport::from_size(1920, 1080));
    }

    #[test]
    fn test_nested_cull_guards_unwind_in_order() {
        let ctx = HeadlessContext::new(Viewport::from_size(1, 1));
        ctx.set_cull_mode(Some(CullFace::Back));
        {
            let _outer = ScopedCullMode::new(&ctx, Some(CullFace::Front));
            {
                let _inner = ScopedCullMode::new(&ctx, None);
                assert_eq!(ctx.cull_mode(), None);
            }
            assert_eq!(ctx.cull_mode(), Some(CullFace::Front));
        }
        assert_eq!(ctx.cull_mode(), Some(CullFace::Back));
    }

    #[test]
    fn test_guards_restore_on_early_return() {
        fn pass(ctx: &dyn GraphicsContext, bail: bool) -> Option<()> {
            let _viewport = ScopedViewport::save(ctx);
            let _cull = ScopedCullMode::new(ctx, Some(CullFace::Front));
            ctx.set_viewport(Viewport::from_size(4, 4));
            if bail {
                return None;
            }
            Some(())
        }

        let ctx = HeadlessContext::new(Viewport::from_size(640, 480));
        assert!(pass(&ctx, true).is_none());
        assert_eq!(ctx.viewport(), Viewport::from_size(640, 480));
        assert_eq!(ctx.cull_mode(), None);
    }

    #[test]
    fn test_framebuffer_rebound_on_drop() {
        let ctx = HeadlessContext::new(Viewport::from_size(1, 1));
        let fb = ctx.create_depth_framebuffer().expect("headless framebuffer");
        {
            let _guard = ScopedFramebuffer::save(&ctx);
            ctx.bind_framebuffer(Some(fb));
            assert_eq!(ctx.bound_framebuffer(), Some(fb));
        }
        assert_eq!(ctx.bound_framebuffer(), None);
    }
}
