//! Museum room scene
//!
//! A 40 x 20 room with three podiums and exhibits, lit by one ceiling point
//! light. Mesh generation lives outside the renderer, so each piece is an
//! indexed vertex array with the index count its generator would produce.

use lumen_engine::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use lumen_engine::render::{HeadlessContext, IndexedGeometry, Light, Material, TextureId};

const PLANE_INDICES: u32 = 6;
const CUBE_INDICES: u32 = 36;

/// Index count of a UV sphere with the given subdivision
fn sphere_indices(sectors: u32, stacks: u32) -> u32 {
    sectors * (stacks - 1) * 6
}

/// One placed mesh
pub struct SceneItem {
    /// Uploaded geometry
    pub geometry: IndexedGeometry,
    /// Model transform
    pub transform: Mat4,
    /// Surface material
    pub material: Material,
    /// Tint
    pub color: Vec3,
    /// Diffuse texture, if any
    pub texture: Option<TextureId>,
}

/// Everything the renderer needs for the museum room
pub struct MuseumScene {
    /// Placed meshes in draw order
    pub items: Vec<SceneItem>,
    /// Lights in priority order
    pub lights: Vec<Light>,
}

fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_translation(&Vec3::new(x, y, z))
}

fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_nonuniform_scaling(&Vec3::new(x, y, z))
}

impl MuseumScene {
    /// Build the room on the headless backend
    pub fn build(ctx: &HeadlessContext) -> Self {
        let floor_texture = ctx.create_color_texture();
        let wall_texture = ctx.create_color_texture();
        let mut items = Vec::new();

        let mut add = |indices: u32, transform: Mat4, material: Material, color: Vec3, texture: Option<TextureId>| {
            items.push(SceneItem {
                geometry: IndexedGeometry::new(ctx.create_vertex_array(), indices),
                transform,
                material,
                color,
                texture,
            });
        };

        let quarter = utils::deg_to_rad(90.0);
        let half = utils::deg_to_rad(180.0);

        // Shell
        add(PLANE_INDICES, translate(0.0, -5.0, 0.0), Material::floor(), Vec3::new(0.5, 0.5, 0.5), Some(floor_texture));
        add(PLANE_INDICES, translate(0.0, 15.0, 0.0), Material::ceiling(), Vec3::new(0.9, 0.9, 0.9), Some(floor_texture));
        add(
            PLANE_INDICES,
            translate(0.0, 5.0, -10.0) * Mat4::rotation_x(quarter) * Mat4::rotation_y(half),
            Material::wall(),
            Vec3::new(0.75, 0.75, 0.75),
            Some(wall_texture),
        );
        add(
            PLANE_INDICES,
            translate(0.0, 5.0, 10.0) * Mat4::rotation_x(-quarter),
            Material::wall(),
            Vec3::new(0.75, 0.75, 0.75),
            Some(wall_texture),
        );
        add(
            PLANE_INDICES,
            translate(-20.0, 5.0, 0.0) * Mat4::rotation_z(quarter) * Mat4::rotation_x(half),
            Material::wall(),
            Vec3::new(0.75, 0.75, 0.75),
            Some(wall_texture),
        );
        add(
            PLANE_INDICES,
            translate(20.0, 5.0, 0.0) * Mat4::rotation_z(quarter),
            Material::wall(),
            Vec3::new(0.75, 0.75, 0.75),
            Some(wall_texture),
        );

        // Ceiling light panel
        add(PLANE_INDICES, translate(0.0, 14.5, 0.0), Material::gold(), Vec3::new(1.0, 1.0, 0.9), None);

        // Exhibits
        let sphere = sphere_indices(32, 16);
        add(CUBE_INDICES, translate(-5.0, -4.2, -3.0), Material::stone(), Vec3::new(0.5, 0.5, 0.5), None);
        add(sphere, translate(-5.0, -1.5, -3.0), Material::gold(), Vec3::new(1.0, 0.84, 0.0), None);
        add(CUBE_INDICES, translate(0.0, -3.0, 5.0) * scale(1.0, 0.5, 1.0), Material::stone(), Vec3::new(0.5, 0.5, 0.5), None);
        add(CUBE_INDICES, translate(0.0, -1.0, 5.0) * scale(0.7, 0.7, 0.7), Material::marble(), Vec3::new(0.95, 0.95, 0.95), None);
        add(CUBE_INDICES, translate(5.0, -3.0, -3.0) * scale(1.0, 0.5, 1.0), Material::stone(), Vec3::new(0.5, 0.5, 0.5), None);
        add(sphere, translate(5.0, -1.5, -3.0), Material::plastic_red(), Vec3::new(1.0, 0.2, 0.2), None);

        let lights = vec![
            Light::point(Vec3::new(0.0, 14.0, 0.0), Vec3::new(1.0, 0.98, 0.9), 8.0, 40.0),
        ];

        Self { items, lights }
    }

    /// Extra lights for a busier frame: a sun through the skylight and two spots on the spheres
    pub fn gallery_lights() -> Vec<Light> {
        vec![
            Light::directional(Vec3::new(0.3, -1.0, 0.3), Vec3::new(1.0, 0.95, 0.85), 0.4),
            Light::default_spot(
                Vec3::new(-5.0, 10.0, -3.0),
                Vec3::new(0.0, -1.0, 0.0),
                Vec3::new(1.0, 0.9, 0.7),
                4.0,
            ),
            Light::default_spot(
                Vec3::new(5.0, 10.0, -3.0),
                Vec3::new(0.0, -1.0, 0.0),
                Vec3::new(1.0, 0.9, 0.7),
                4.0,
            ),
        ]
    }
}
