//! # Camera matrices
//!
//! The pipeline does not own a camera. Whatever drives the viewpoint hands it a
//! [`CameraView`] each frame, and the lit pass writes it as `view`,
//! `projection` and `camPos`.
//!
//! Uses the right-handed Y-up convention with OpenGL clip space (`z` in `[-1, 1]`).

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// View and projection of the active viewpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World-to-view transform
    pub view: Mat4,
    /// View-to-clip transform
    pub projection: Mat4,
    /// Eye position in world space (for specular terms)
    pub position: Vec3,
}

impl CameraView {
    /// Perspective camera at `position` looking at `target`
    ///
    /// `fov_degrees` is the vertical field of view.
    pub fn look_at(
        position: Vec3,
        target: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view: Mat4::look_at(position, target, Vec3::y()),
            projection: Mat4::perspective(utils::deg_to_rad(fov_degrees), aspect, near, far),
            position,
        }
    }

    /// Aspect ratio of a window, falling back to 1 for a zero height
    pub fn aspect(width: u32, height: u32) -> f32 {
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
            position: Vec3::zeros(),
        }
    }
}
