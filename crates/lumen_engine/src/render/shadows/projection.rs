//! Light-space transforms for the shadow passes
//!
//! The directional light is modelled as an orthographic camera placed on a
//! fixed bounding sphere around the scene. Point lights render six 90° faces
//! into a cube map; the face table uses the cube-map convention of flipped up
//! vectors so that no face looks along its own up axis.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::api::CubeFace;

/// Center of the scene bounding sphere the directional light orbits
pub const SCENE_CENTER: [f32; 3] = [0.0, 2.0, 0.0];

/// Radius of the scene bounding sphere
pub const SCENE_RADIUS: f32 = 25.0;

/// Direction used when no directional light is present
pub const DEFAULT_LIGHT_DIRECTION: [f32; 3] = [0.3, -1.0, 0.3];

/// Near plane of the directional light's orthographic projection
pub const DIRECTIONAL_NEAR_PLANE: f32 = 0.1;

/// Far plane of the directional light's orthographic projection
pub const DIRECTIONAL_FAR_PLANE: f32 = 100.0;

/// Near plane of every cube-face projection
pub const CUBE_NEAR_PLANE: f32 = 0.1;

/// Field of view of every cube-face projection
pub const CUBE_FOV_DEGREES: f32 = 90.0;

const WORLD_UP: [f32; 3] = [0.0, 1.0, 0.0];

/// View direction and up vector for one cube face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeFaceView {
    /// Direction the face camera looks along
    pub direction: [f32; 3],
    /// Up vector of the face camera
    pub up: [f32; 3],
}

impl CubeFaceView {
    /// Look direction as a vector
    pub fn direction(&self) -> Vec3 {
        Vec3::from(self.direction)
    }

    /// Up vector as a vector
    pub fn up(&self) -> Vec3 {
        Vec3::from(self.up)
    }
}

/// Face table in `+X, -X, +Y, -Y, +Z, -Z` order
pub const CUBE_FACES: [CubeFaceView; CubeFace::COUNT] = [
    CubeFaceView { direction: [1.0, 0.0, 0.0], up: [0.0, -1.0, 0.0] },
    CubeFaceView { direction: [-1.0, 0.0, 0.0], up: [0.0, -1.0, 0.0] },
    CubeFaceView { direction: [0.0, 1.0, 0.0], up: [0.0, 0.0, 1.0] },
    CubeFaceView { direction: [0.0, -1.0, 0.0], up: [0.0, 0.0, -1.0] },
    CubeFaceView { direction: [0.0, 0.0, 1.0], up: [0.0, -1.0, 0.0] },
    CubeFaceView { direction: [0.0, 0.0, -1.0], up: [0.0, -1.0, 0.0] },
];

/// The directional light's virtual camera for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpace {
    /// Normalized light direction actually used
    pub direction: Vec3,
    /// Camera position on the bounding sphere
    pub position: Vec3,
    /// Look-at view matrix
    pub view: Mat4,
    /// Orthographic projection
    pub projection: Mat4,
    /// `projection * view`
    pub matrix: Mat4,
}

/// Normalized default light direction
pub fn default_light_direction() -> Vec3 {
    Vec3::from(DEFAULT_LIGHT_DIRECTION).normalize()
}

/// Build the light-space transform for a directional light
///
/// `None`, zero-length and non-finite directions fall back to
/// [`DEFAULT_LIGHT_DIRECTION`].
pub fn directional_light_space(direction: Option<Vec3>) -> LightSpace {
    let direction = direction
        .and_then(|d| d.try_normalize(1.0e-6))
        .filter(|d| d.iter().all(|c| c.is_finite()))
        .unwrap_or_else(default_light_direction);

    let center = Vec3::from(SCENE_CENTER);
    let position = center - direction * SCENE_RADIUS;

    // World-up is parallel to a light pointing straight down or up
    let world_up = Vec3::from(WORLD_UP);
    let up = if direction.cross(&world_up).norm() < 1.0e-4 {
        Vec3::z()
    } else {
        world_up
    };

    let view = Mat4::look_at(position, center, up);
    let projection = Mat4::orthographic(
        -SCENE_RADIUS,
        SCENE_RADIUS,
        -SCENE_RADIUS,
        SCENE_RADIUS,
        DIRECTIONAL_NEAR_PLANE,
        DIRECTIONAL_FAR_PLANE,
    );

    LightSpace {
        direction,
        position,
        view,
        projection,
        matrix: projection * view,
    }
}

/// Perspective projection shared by all six faces of a cube shadow
pub fn cube_face_projection(far_plane: f32) -> Mat4 {
    Mat4::perspective(utils::deg_to_rad(CUBE_FOV_DEGREES), 1.0, CUBE_NEAR_PLANE, far_plane)
}

/// View matrix of one cube face as seen from `light_position`
pub fn cube_face_view(light_position: Vec3, face: CubeFace) -> Mat4 {
    let entry = &CUBE_FACES[face.index()];
    Mat4::look_at(light_position, light_position + entry.direction(), entry.up())
}

/// `projection * view` for one cube face
pub fn cube_face_matrix(light_position: Vec3, face: CubeFace, far_plane: f32) -> Mat4 {
    cube_face_projection(far_plane) * cube_face_view(light_position, face)
}

/// All six face matrices in attachment order
pub fn cube_face_matrices(light_position: Vec3, far_plane: f32) -> [Mat4; CubeFace::COUNT] {
    let projection = cube_face_projection(far_plane);
    let mut matrices = [Mat4::identity(); CubeFace::COUNT];
    for face in CubeFace::all() {
        matrices[face.index()] = projection * cube_face_view(light_position, face);
    }
    matrices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec4};
    use approx::assert_relative_eq;

    #[test]
    fn test_face_directions_never_parallel_to_up() {
        for (i, face) in CUBE_FACES.iter().enumerate() {
            let cross = face.direction().cross(&face.up());
            assert!(cross.norm() > 0.5, "face {i} has a degenerate up vector");
        }
    }

    #[test]
    fn test_face_directions_cover_all_axes() {
        let sum: Vec3 = CUBE_FACES.iter().map(CubeFaceView::direction).sum();
        assert_relative_eq!(sum, Vec3::zeros());
        for face in &CUBE_FACES {
            assert_relative_eq!(face.direction().norm(), 1.0);
        }
    }

    #[test]
    fn test_default_direction_when_missing() {
        let space = directional_light_space(None);
        let expected = Vec3::new(0.3, -1.0, 0.3).normalize();
        assert_relative_eq!(space.direction, expected, epsilon = 1e-6);
        assert_relative_eq!(
            space.position,
            Vec3::new(0.0, 2.0, 0.0) - expected * 25.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_zero_and_nan_directions_fall_back() {
        let fallback = directional_light_space(None);
        assert_eq!(directional_light_space(Some(Vec3::zeros())), fallback);
        assert_eq!(directional_light_space(Some(Vec3::new(f32::NAN, 0.0, 0.0))), fallback);
    }

    #[test]
    fn test_light_space_maps_scene_center_to_middle_of_depth_range() {
        let space = directional_light_space(Some(Vec3::new(-0.5, -1.0, 0.2)));
        let clip = space.matrix * Vec4::new(0.0, 2.0, 0.0, 1.0);
        // Center is `radius` units in front of the camera: x/y centered
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-4);
        let expected_z = -1.0 + 2.0 * (SCENE_RADIUS - 0.1) / (100.0 - 0.1);
        assert_relative_eq!(clip.z, expected_z, epsilon = 1e-4);
    }

    #[test]
    fn test_straight_down_light_stays_finite() {
        let space = directional_light_space(Some(Vec3::new(0.0, -1.0, 0.0)));
        assert!(space.matrix.iter().all(|v| v.is_finite()));
        assert_relative_eq!(space.position, Vec3::new(0.0, 27.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_cube_face_looks_along_its_axis() {
        let light = Vec3::new(0.0, 14.0, 0.0);
        for face in CubeFace::all() {
            let matrix = cube_face_matrix(light, face, 60.0);
            assert!(matrix.iter().all(|v| v.is_finite()));

            // A point along the face direction lands in the middle of the face
            let target = light + CUBE_FACES[face.index()].direction() * 5.0;
            let clip = matrix * Vec4::new(target.x, target.y, target.z, 1.0);
            assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
            assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
            assert!(clip.w > 0.0);
        }
    }

    #[test]
    fn test_cube_face_matrices_match_single_face() {
        let light = Point3::new(1.0, 2.0, 3.0).coords;
        let all = cube_face_matrices(light, 40.0);
        for face in CubeFace::all() {
            assert_relative_eq!(all[face.index()], cube_face_matrix(light, face, 40.0));
        }
    }
}
