//! Phong material records
//!
//! A material is four numbers the lit shader reads as `matAmbient`,
//! `matDiffuse`, `matSpecular` and `matShininess`. The presets cover the
//! surfaces of the museum scene; shininess values are on the 0..128 scale.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::render::api::{GraphicsContext, ProgramId};

/// Surface reflectance parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Ambient reflectance
    pub ambient: Vec3,
    /// Diffuse reflectance
    pub diffuse: Vec3,
    /// Specular reflectance
    pub specular: Vec3,
    /// Specular exponent
    pub shininess: f32,
}

impl Material {
    /// Build a material from raw components
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self { ambient, diffuse, specular, shininess }
    }

    /// White plastic
    pub fn plastic_white() -> Self {
        Self::new(
            Vec3::zeros(),
            Vec3::new(0.55, 0.55, 0.55),
            Vec3::new(0.70, 0.70, 0.70),
            0.25 * 128.0,
        )
    }

    /// Red plastic
    pub fn plastic_red() -> Self {
        Self::new(
            Vec3::zeros(),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.7, 0.6, 0.6),
            0.25 * 128.0,
        )
    }

    /// Polished gold
    pub fn gold() -> Self {
        Self::new(
            Vec3::new(0.24725, 0.1995, 0.0745),
            Vec3::new(0.75164, 0.60648, 0.22648),
            Vec3::new(0.628_281, 0.555_802, 0.366_065),
            0.4 * 128.0,
        )
    }

    /// Rough stone
    pub fn stone() -> Self {
        Self::new(
            Vec3::new(0.2, 0.2, 0.2),
            Vec3::new(0.3, 0.3, 0.3),
            Vec3::new(0.1, 0.1, 0.1),
            0.078_125 * 128.0,
        )
    }

    /// White marble
    pub fn marble() -> Self {
        Self::new(
            Vec3::new(0.25, 0.25, 0.25),
            Vec3::new(0.8, 0.8, 0.8),
            Vec3::new(0.9, 0.9, 0.9),
            0.25 * 128.0,
        )
    }

    /// Matte gallery floor
    pub fn floor() -> Self {
        Self::new(
            Vec3::new(0.05, 0.05, 0.05),
            Vec3::new(0.45, 0.45, 0.45),
            Vec3::new(0.02, 0.02, 0.02),
            8.0,
        )
    }

    /// Painted wall
    pub fn wall() -> Self {
        Self::new(
            Vec3::new(0.25, 0.25, 0.25),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.02, 0.02, 0.02),
            4.0,
        )
    }

    /// Ceiling plaster
    pub fn ceiling() -> Self {
        Self::new(
            Vec3::new(0.3, 0.3, 0.3),
            Vec3::new(0.75, 0.75, 0.75),
            Vec3::new(0.03, 0.03, 0.03),
            6.0,
        )
    }

    /// Phone screen glass
    pub fn glass() -> Self {
        Self::new(
            Vec3::new(0.15, 0.15, 0.16),
            Vec3::new(0.5, 0.5, 0.52),
            Vec3::new(0.4, 0.4, 0.45),
            32.0,
        )
    }

    /// Write the `mat*` uniforms of `program`
    pub fn apply(&self, ctx: &dyn GraphicsContext, program: ProgramId) {
        ctx.set_uniform(program, "matAmbient", self.ambient.into());
        ctx.set_uniform(program, "matDiffuse", self.diffuse.into());
        ctx.set_uniform(program, "matSpecular", self.specular.into());
        ctx.set_uniform(program, "matShininess", self.shininess.into());
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::plastic_white()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::Viewport;
    use crate::render::backends::HeadlessContext;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets_use_128_scale() {
        assert_relative_eq!(Material::plastic_white().shininess, 32.0);
        assert_relative_eq!(Material::gold().shininess, 51.2);
        assert_relative_eq!(Material::stone().shininess, 10.0);
        assert_relative_eq!(Material::floor().shininess, 8.0);
    }

    #[test]
    fn test_apply_writes_all_fields() {
        let ctx = HeadlessContext::new(Viewport::from_size(1, 1));
        let program = ctx.create_program("lit");
        let gold = Material::gold();

        gold.apply(&ctx, program);

        assert_eq!(ctx.uniform(program, "matDiffuse").and_then(|v| v.as_vec3()), Some(gold.diffuse));
        assert_eq!(
            ctx.uniform(program, "matShininess").and_then(|v| v.as_float()),
            Some(gold.shininess)
        );
    }

    #[test]
    fn test_round_trips_through_ron() {
        let text = ron::to_string(&Material::marble()).expect("serialize");
        let parsed: Material = ron::from_str(&text).expect("parse");
        assert_eq!(parsed, Material::marble());
    }
}
