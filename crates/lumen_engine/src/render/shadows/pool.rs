//! Fixed-capacity pool of point shadow targets
//!
//! All `MAX_POINT_SHADOWS` cube targets share one size, far plane and depth
//! program. The pool is rebuilt as a unit: the old batch is released first and
//! the new batch only becomes visible once every slot allocated.

use std::rc::Rc;

use crate::foundation::math::Vec3;
use crate::render::api::{GraphicsContext, ProgramId};

use super::{PointShadowTarget, ShadowResult};

/// Maximum number of point lights that cast shadows in one frame
pub const MAX_POINT_SHADOWS: usize = 5;

/// A point light bound to a pool slot for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointShadowAssignment {
    /// Index of the light in the pipeline's light list
    pub light_index: usize,
    /// World-space light position
    pub position: Vec3,
}

/// Batch of point shadow targets
#[derive(Debug)]
pub struct ShadowTargetPool {
    shader: ProgramId,
    size: u32,
    far_plane: f32,
    // Always exactly MAX_POINT_SHADOWS; never resized after construction
    targets: Box<[PointShadowTarget]>,
    assignments: Vec<PointShadowAssignment>,
}

impl ShadowTargetPool {
    /// Allocate all targets; any failure releases the slots built so far
    pub fn new(
        ctx: &Rc<dyn GraphicsContext>,
        shader: ProgramId,
        size: u32,
        far_plane: f32,
    ) -> ShadowResult<Self> {
        let targets = (0..MAX_POINT_SHADOWS)
            .map(|_| PointShadowTarget::new(Rc::clone(ctx), size, far_plane))
            .collect::<ShadowResult<Vec<_>>>()?
            .into_boxed_slice();

        Ok(Self {
            shader,
            size,
            far_plane,
            targets,
            assignments: Vec::with_capacity(MAX_POINT_SHADOWS),
        })
    }

    /// Release the pool held in `slot`, then build a new one into it
    ///
    /// A partially rebuilt pool is never stored; on failure `slot` is empty.
    pub fn configure(
        slot: &mut Option<Self>,
        ctx: &Rc<dyn GraphicsContext>,
        shader: ProgramId,
        size: u32,
        far_plane: f32,
    ) -> ShadowResult<()> {
        drop(slot.take());
        *slot = Some(Self::new(ctx, shader, size, far_plane)?);
        Ok(())
    }

    /// Bind the first `MAX_POINT_SHADOWS` point lights to slots for this frame
    ///
    /// Previous assignments are discarded. Returns the number of active slots.
    pub fn assign<I>(&mut self, point_lights: I) -> usize
    where
        I: IntoIterator<Item = PointShadowAssignment>,
    {
        self.assignments.clear();
        self.assignments
            .extend(point_lights.into_iter().take(MAX_POINT_SHADOWS));
        self.assignments.len()
    }

    /// Forget this frame's assignments
    pub fn clear_assignments(&mut self) {
        self.assignments.clear();
    }

    /// Number of slots holding a light this frame
    pub fn active_count(&self) -> usize {
        self.assignments.len()
    }

    /// Active `(assignment, target)` pairs in slot order
    pub fn active(&self) -> impl Iterator<Item = (&PointShadowAssignment, &PointShadowTarget)> {
        self.assignments.iter().zip(self.targets.iter())
    }

    /// Depth program used for the cube passes
    pub fn shader(&self) -> ProgramId {
        self.shader
    }

    /// All slots, active or not
    pub fn targets(&self) -> &[PointShadowTarget] {
        &self.targets
    }

    /// Shared far plane
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// Shared face size
    pub fn size(&self) -> u32 {
        self.size
    }
}
