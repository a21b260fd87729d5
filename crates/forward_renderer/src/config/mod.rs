//! Configuration system
//!
//! The renderer is configured once at initialization from a small key/value
//! document. Two optional switches drive which GPU resources get created:
//!
//! - `sky`: path to an equirectangular sky image, enables the sky pass
//! - `postprocess`: path to a fragment shader, enables the offscreen target and
//!   fullscreen composite
//!
//! Documents can be TOML, RON or JSON; the format is picked by file extension.

use std::path::{Path, PathBuf};

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match Format::from_path(path)? {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Json => {
                serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::from_path(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
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
}

/// Engine-supplied shader sources used by the sky and post-process stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    /// Vertex stage of the textured shader drawn on the sky sphere
    pub textured_vertex: PathBuf,
    /// Fragment stage of the textured shader drawn on the sky sphere
    pub textured_fragment: PathBuf,
    /// Fullscreen-triangle vertex stage paired with the post-process fragment shader
    pub fullscreen_vertex: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            textured_vertex: PathBuf::from("assets/shaders/textured.vert"),
            textured_fragment: PathBuf::from("assets/shaders/textured.frag"),
            fullscreen_vertex: PathBuf::from("assets/shaders/fullscreen.vert"),
        }
    }
}

/// Forward renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Equirectangular sky texture; presence enables the sky pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sky: Option<PathBuf>,

    /// Post-process fragment shader; presence enables the offscreen target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocess: Option<PathBuf>,

    /// Sky sphere tessellation (longitude, latitude segments)
    pub sky_segments: (u32, u32),

    /// Engine shader locations
    pub shaders: ShaderPaths,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sky: None,
            postprocess: None,
            sky_segments: (16, 16),
            shaders: ShaderPaths::default(),
        }
    }
}

impl Config for RendererConfig {}

impl RendererConfig {
    /// Create a configuration with neither sky nor post-processing
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the sky pass with the given texture
    pub fn with_sky(mut self, path: impl Into<PathBuf>) -> Self {
        self.sky = Some(path.into());
        self
    }

    /// Enable post-processing with the given fragment shader
    pub fn with_postprocess(mut self, path: impl Into<PathBuf>) -> Self {
        self.postprocess = Some(path.into());
        self
    }

    /// Override the engine shader locations
    pub fn with_shaders(mut self, shaders: ShaderPaths) -> Self {
        self.shaders = shaders;
        self
    }
}

/// Application-level document, with renderer settings under `renderer`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Forward renderer settings
    pub renderer: RendererConfig,
}

impl Config for AppConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "forward_renderer_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config_has_no_optional_stages() {
        let config = RendererConfig::default();
        assert!(config.sky.is_none());
        assert!(config.postprocess.is_none());
        assert_eq!(config.sky_segments, (16, 16));
    }

    #[test]
    fn test_toml_with_only_sky() {
        let config: RendererConfig = toml::from_str(r#"sky = "assets/textures/sky.jpg""#).unwrap();
        assert_eq!(config.sky, Some(PathBuf::from("assets/textures/sky.jpg")));
        assert!(config.postprocess.is_none());
        assert_eq!(config.shaders, ShaderPaths::default());
    }

    #[test]
    fn test_json_app_document() {
        let json = r#"{
            "renderer": {
                "sky": "assets/textures/sky.jpg",
                "postprocess": "assets/shaders/postprocess/vignette.frag"
            }
        }"#;
        let path = temp_file("app.json", json);
        let config = AppConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(config.renderer.sky.is_some());
        assert_eq!(
            config.renderer.postprocess,
            Some(PathBuf::from("assets/shaders/postprocess/vignette.frag"))
        );
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let config = RendererConfig::new().with_postprocess("grayscale.frag");
        let path = std::env::temp_dir().join(format!("forward_renderer_{}_rt.ron", std::process::id()));
        config.save_to_file(&path).unwrap();
        let loaded = RendererConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_file("renderer.yaml", "sky: x");
        let result = RendererConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let path = temp_file("broken.toml", "sky = [");
        let result = RendererConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RendererConfig::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
