//! Point-light cube shadow render target
//!
//! One depth cube map plus a depth-only framebuffer. No face is attached at
//! creation; the shadow pass attaches each face in turn and clears it before
//! drawing.

use std::rc::Rc;

use crate::render::api::{
    CubeFace, DepthAttachment, FramebufferId, GraphicsContext, TextureId, TextureTarget, Viewport,
};

use super::{projection::CUBE_NEAR_PLANE, ShadowError, ShadowResult};

const TARGET_NAME: &str = "point shadow cube map";

/// Depth cube-map render target for one point light
pub struct PointShadowTarget {
    ctx: Rc<dyn GraphicsContext>,
    framebuffer: FramebufferId,
    depth_cubemap: TextureId,
    size: u32,
    far_plane: f32,
}

impl PointShadowTarget {
    /// Allocate a cube map with `size` x `size` faces
    pub fn new(ctx: Rc<dyn GraphicsContext>, size: u32, far_plane: f32) -> ShadowResult<Self> {
        if size == 0 {
            return Err(ShadowError::InvalidResolution { width: size, height: size });
        }
        if !far_plane.is_finite() || far_plane <= CUBE_NEAR_PLANE {
            return Err(ShadowError::InvalidFarPlane(far_plane));
        }

        let depth_cubemap = ctx
            .create_depth_cubemap(size)
            .map_err(|e| ShadowError::allocation(TARGET_NAME, e))?;
        let framebuffer = match ctx.create_depth_framebuffer() {
            Ok(fb) => fb,
            Err(e) => {
                ctx.delete_texture(depth_cubemap);
                return Err(ShadowError::allocation(TARGET_NAME, e));
            }
        };

        Ok(Self { ctx, framebuffer, depth_cubemap, size, far_plane })
    }

    /// Bind the framebuffer and size the viewport to one face
    pub fn begin_write(&self) {
        self.ctx.bind_framebuffer(Some(self.framebuffer));
        self.ctx.set_viewport(Viewport::from_size(self.size, self.size));
    }

    /// Attach `face` as the depth attachment; clear depth before drawing into it
    pub fn attach_face(&self, face: CubeFace) {
        self.ctx.bind_framebuffer(Some(self.framebuffer));
        self.ctx.attach_depth(
            self.framebuffer,
            DepthAttachment::CubeFace(self.depth_cubemap, face),
        );
    }

    /// Bind the window again
    pub fn end_write(&self) {
        self.ctx.bind_framebuffer(None);
    }

    /// Bind the cube map for sampling at texture `unit`
    pub fn bind_for_read(&self, unit: u32) {
        self.ctx.bind_texture(unit, TextureTarget::CubeMap, Some(self.depth_cubemap));
    }

    /// Far plane used for the face projections and depth linearization
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// Edge length of each face
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Cube map handle
    pub fn depth_cubemap(&self) -> TextureId {
        self.depth_cubemap
    }

    /// Framebuffer handle
    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer
    }
}

impl Drop for PointShadowTarget {
    fn drop(&mut self) {
        self.ctx.delete_framebuffer(self.framebuffer);
        self.ctx.delete_texture(self.depth_cubemap);
    }
}

impl std::fmt::Debug for PointShadowTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointShadowTarget")
            .field("framebuffer", &self.framebuffer)
            .field("depth_cubemap", &self.depth_cubemap)
            .field("size", &self.size)
            .field("far_plane", &self.far_plane)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::headless::{HeadlessContext, TextureRecord};

    fn context() -> Rc<HeadlessContext> {
        Rc::new(HeadlessContext::new(Viewport::from_size(1920, 1080)))
    }

    #[test]
    fn test_new_leaves_faces_unattached() {
        let ctx = context();
        let target = PointShadowTarget::new(ctx.clone(), 512, 60.0).expect("target");
        assert_eq!(ctx.texture(target.depth_cubemap()), Some(TextureRecord::DepthCube { size: 512 }));

        let fb = ctx.framebuffer(target.framebuffer()).expect("framebuffer");
        assert_eq!(fb.depth, None);
        assert!(!fb.color_writes);
        assert!((target.far_plane() - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_attach_face_targets_requested_face() {
        let ctx = context();
        let target = PointShadowTarget::new(ctx.clone(), 128, 25.0).expect("target");
        target.begin_write();
        assert_eq!(ctx.viewport(), Viewport::from_size(128, 128));

        let face = CubeFace::new(4).expect("face");
        target.attach_face(face);
        let fb = ctx.framebuffer(target.framebuffer()).expect("framebuffer");
        assert_eq!(fb.depth, Some(DepthAttachment::CubeFace(target.depth_cubemap(), face)));
        assert!(ctx.is_framebuffer_complete(target.framebuffer()));

        target.end_write();
        assert_eq!(ctx.bound_framebuffer(), None);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let ctx = context();
        assert!(matches!(
            PointShadowTarget::new(ctx.clone(), 0, 60.0),
            Err(ShadowError::InvalidResolution { .. })
        ));
        assert!(matches!(
            PointShadowTarget::new(ctx.clone(), 64, 0.05),
            Err(ShadowError::InvalidFarPlane(_))
        ));
        assert!(matches!(
            PointShadowTarget::new(ctx.clone(), 64, f32::INFINITY),
            Err(ShadowError::InvalidFarPlane(_))
        ));
        assert_eq!(ctx.live_textures(), 0);
    }

    #[test]
    fn test_framebuffer_failure_releases_cubemap() {
        let ctx = context();
        ctx.fail_allocations_after(1);
        let result = PointShadowTarget::new(ctx.clone(), 64, 60.0);
        assert!(matches!(result, Err(ShadowError::ResourceAllocationFailure { .. })));
        assert_eq!(ctx.live_textures(), 0);
        assert_eq!(ctx.live_framebuffers(), 0);
    }

    #[test]
    fn test_bind_for_read_uses_cube_target() {
        let ctx = context();
        let target = PointShadowTarget::new(ctx.clone(), 64, 60.0).expect("target");
        target.bind_for_read(3);
        assert_eq!(ctx.texture_at(3), Some((TextureTarget::CubeMap, target.depth_cubemap())));
    }
}
