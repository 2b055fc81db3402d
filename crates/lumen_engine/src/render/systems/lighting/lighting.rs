//! Light sources and their shader representation
//!
//! Lights are plain values: a color and intensity shared by every kind, plus a
//! [`LightKind`] carrying the fields that only make sense for that kind. The
//! lit shader consumes them through a fixed array of [`MAX_SHADER_LIGHTS`]
//! `lights[i]` structs, written by [`write_light_uniforms`].
//!
//! Spot cone angles are stored in degrees and converted to cosines only at the
//! moment they are written, so a stored light stays readable and editable.

use crate::foundation::math::{utils, Vec3};
use crate::render::api::{GraphicsContext, ProgramId};

/// Size of the `lights[]` uniform array in the lit shader
pub const MAX_SHADER_LIGHTS: usize = 8;

/// Default range of point and spot lights
pub const DEFAULT_LIGHT_RANGE: f32 = 100.0;

/// An angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Angle in radians
    pub fn to_radians(self) -> f32 {
        utils::deg_to_rad(self.0)
    }

    /// Cosine of the angle, as the shader compares it against `dot(L, D)`
    pub fn cos(self) -> f32 {
        self.to_radians().cos()
    }
}

/// Kind-specific light parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Omnidirectional light from a point (light bulbs, fires)
    Point {
        /// World-space position
        position: Vec3,
        /// Attenuation range
        range: f32,
    },
    /// Parallel light rays (sunlight)
    Directional {
        /// Unit direction the light travels in
        direction: Vec3,
    },
    /// Cone of light (flashlights, stage lighting)
    Spot {
        /// World-space position
        position: Vec3,
        /// Unit direction of the cone axis
        direction: Vec3,
        /// Attenuation range
        range: f32,
        /// Angle where the falloff starts
        inner_cutoff: Degrees,
        /// Angle where the light reaches zero
        outer_cutoff: Degrees,
    },
}

/// Light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Kind and kind-specific parameters
    pub kind: LightKind,
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional { direction: direction.normalize() },
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { position, range },
        }
    }

    /// Create a spot light with cone angles in degrees
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cutoff: Degrees,
        outer_cutoff: Degrees,
    ) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot {
                position,
                direction: direction.normalize(),
                range,
                inner_cutoff,
                outer_cutoff,
            },
        }
    }

    /// Spot light with the 30°/40° cone and default range
    pub fn default_spot(position: Vec3, direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::spot(
            position,
            direction,
            color,
            intensity,
            DEFAULT_LIGHT_RANGE,
            Degrees(30.0),
            Degrees(40.0),
        )
    }

    /// Type tag the shader switches on
    pub fn shader_type(&self) -> i32 {
        match self.kind {
            LightKind::Point { .. } => 0,
            LightKind::Directional { .. } => 1,
            LightKind::Spot { .. } => 2,
        }
    }

    /// Position, or zero for directional lights
    pub fn position(&self) -> Vec3 {
        match self.kind {
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => position,
            LightKind::Directional { .. } => Vec3::zeros(),
        }
    }

    /// Direction, or zero for point lights
    pub fn direction(&self) -> Vec3 {
        match self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => direction,
            LightKind::Point { .. } => Vec3::zeros(),
        }
    }

    /// Range, or zero for directional lights
    pub fn range(&self) -> f32 {
        match self.kind {
            LightKind::Point { range, .. } | LightKind::Spot { range, .. } => range,
            LightKind::Directional { .. } => 0.0,
        }
    }

    /// `(inner, outer)` cone angles; zero for non-spot lights
    pub fn cutoffs(&self) -> (Degrees, Degrees) {
        match self.kind {
            LightKind::Spot { inner_cutoff, outer_cutoff, .. } => (inner_cutoff, outer_cutoff),
            _ => (Degrees(0.0), Degrees(0.0)),
        }
    }

    /// Whether this is a directional light
    pub fn is_directional(&self) -> bool {
        matches!(self.kind, LightKind::Directional { .. })
    }

    /// Position if this is a point light
    pub fn point_position(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Point { position, .. } => Some(position),
            _ => None,
        }
    }
}

/// Write `numLights` and the `lights[i]` array for the first [`MAX_SHADER_LIGHTS`] lights
///
/// Returns how many lights were written. The remaining lights are dropped in
/// insertion order.
pub fn write_light_uniforms(ctx: &dyn GraphicsContext, program: ProgramId, lights: &[Light]) -> usize {
    let count = lights.len().min(MAX_SHADER_LIGHTS);
    ctx.set_uniform(program, "numLights", (count as i32).into());

    for (i, light) in lights.iter().take(count).enumerate() {
        let (inner, outer) = light.cutoffs();
        let prefix = format!("lights[{i}]");
        ctx.set_uniform(program, &format!("{prefix}.type"), light.shader_type().into());
        ctx.set_uniform(program, &format!("{prefix}.position"), light.position().into());
        ctx.set_uniform(program, &format!("{prefix}.direction"), light.direction().into());
        ctx.set_uniform(program, &format!("{prefix}.color"), light.color.into());
        ctx.set_uniform(program, &format!("{prefix}.intensity"), light.intensity.into());
        ctx.set_uniform(program, &format!("{prefix}.range"), light.range().into());
        ctx.set_uniform(program, &format!("{prefix}.cutOff"), inner.cos().into());
        ctx.set_uniform(program, &format!("{prefix}.outerCutOff"), outer.cos().into());
    }

    count
}
