//! # Configuration System
//!
//! Serializable renderer configuration loaded from TOML or RON files. The
//! format is chosen by file extension.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values parsed but out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Window dimensions restored after every depth pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1920, height: 1080 }
    }
}

/// Directional shadow map settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalShadowConfig {
    /// Whether the directional shadow target is allocated at startup
    pub enabled: bool,
    /// Depth texture width
    pub width: u32,
    /// Depth texture height
    pub height: u32,
}

impl Default for DirectionalShadowConfig {
    fn default() -> Self {
        Self { enabled: true, width: 1920, height: 1080 }
    }
}

/// Point-light cube shadow settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointShadowConfig {
    /// Whether the cube shadow pool is allocated at startup
    pub enabled: bool,
    /// Edge length of each cube face
    pub size: u32,
    /// Far plane of the per-face projection, also used for depth linearization
    pub far_plane: f32,
}

impl Default for PointShadowConfig {
    fn default() -> Self {
        Self { enabled: true, size: 2048, far_plane: 60.0 }
    }
}

/// # Renderer Configuration
///
/// Top-level configuration for the shadow-mapped renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RendererConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Window size
    pub window: WindowConfig,
    /// Directional shadow settings
    pub directional_shadow: DirectionalShadowConfig,
    /// Point shadow settings
    pub point_shadows: PointShadowConfig,
}

impl RendererConfig {
    /// Set the window size
    pub fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window = WindowConfig { width, height };
        self
    }

    /// Set the directional shadow resolution
    pub fn with_directional_shadow(mut self, width: u32, height: u32) -> Self {
        self.directional_shadow = DirectionalShadowConfig { enabled: true, width, height };
        self
    }

    /// Set the point shadow cube size and far plane
    pub fn with_point_shadows(mut self, size: u32, far_plane: f32) -> Self {
        self.point_shadows = PointShadowConfig { enabled: true, size, far_plane };
        self
    }

    /// The log filter to fall back on
    pub fn log_filter(&self) -> &str {
        if self.log_level.is_empty() { "info" } else { &self.log_level }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        let dir = &self.directional_shadow;
        if dir.enabled && (dir.width == 0 || dir.height == 0) {
            return Err(ConfigError::Invalid(format!(
                "directional shadow resolution must be non-zero, got {}x{}",
                dir.width, dir.height
            )));
        }

        let point = &self.point_shadows;
        if point.enabled {
            if point.size == 0 {
                return Err(ConfigError::Invalid("point shadow size must be non-zero".to_string()));
            }
            if !(point.far_plane.is_finite() && point.far_plane > crate::render::shadows::CUBE_NEAR_PLANE) {
                return Err(ConfigError::Invalid(format!(
                    "point shadow far plane must exceed the near plane, got {}",
                    point.far_plane
                )));
            }
        }

        Ok(())
    }
}

impl Config for RendererConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_museum_setup() {
        let config = RendererConfig::default();
        assert_eq!(config.window, WindowConfig { width: 1920, height: 1080 });
        assert_eq!(config.point_shadows.size, 2048);
        assert!((config.point_shadows.far_plane - 60.0).abs() < f32::EPSILON);
        assert_eq!(config.log_filter(), "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let text = r#"
            log_level = "debug"

            [point_shadows]
            enabled = true
            size = 512
            far_plane = 30.0
        "#;
        let config: RendererConfig = toml::from_str(text).expect("valid toml");
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.point_shadows.size, 512);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let text = r#"
            [window]
            width = 800

            [directional_shadow]
            enabled = false

            [point_shadows]
            far_plane = 25.0
        "#;
        let config: RendererConfig = toml::from_str(text).expect("valid toml");
        assert_eq!(config.window, WindowConfig { width: 800, height: 1080 });
        assert!(!config.directional_shadow.enabled);
        assert_eq!(config.directional_shadow.width, 1920);
        assert_eq!(config.point_shadows.size, 2048);
        assert!((config.point_shadows.far_plane - 25.0).abs() < f32::EPSILON);

        let ron_config: RendererConfig =
            ron::from_str("(point_shadows: (size: 512))").expect("valid ron");
        assert_eq!(ron_config.point_shadows.size, 512);
        assert!(ron_config.point_shadows.enabled);
    }

    #[test]
    fn test_parse_ron() {
        let text = "(window: (width: 800, height: 600))";
        let config: RendererConfig = ron::from_str(text).expect("valid ron");
        assert_eq!(config.window.width, 800);
        assert!(config.directional_shadow.enabled);
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let zero_window = RendererConfig::default().with_window(0, 1080);
        assert!(matches!(zero_window.validate(), Err(ConfigError::Invalid(_))));

        let bad_far = RendererConfig::default().with_point_shadows(1024, 0.05);
        assert!(bad_far.validate().is_err());

        let mut disabled = RendererConfig::default();
        disabled.point_shadows = PointShadowConfig { enabled: false, size: 0, far_plane: 0.0 };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RendererConfig::load_from_file("renderer.json");
        // Missing file is reported before the extension check
        assert!(result.is_err());

        let save = RendererConfig::default().save_to_file("renderer.json");
        assert!(matches!(save, Err(ConfigError::UnsupportedFormat(_))));
    }
}
