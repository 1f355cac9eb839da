//! Layered configuration system
//!
//! Config is loaded with layers of precedence (highest wins):
//! 1. Environment variables: `LUMAPLAN_OUTPUT_DIR`, `LUMAPLAN_WIDTH`,
//!    `LUMAPLAN_HEIGHT`, `LUMAPLAN_MIXING_MODE`
//! 2. Project-local: `.lumaplan/config.toml`
//! 3. Global: `~/.lumaplan/config.toml`
//!
//! Command line flags are applied on top by the CLI.

use crate::error::{LumaplanError, Result};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How lights are grouped into combinatorial render sets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightMixingMode {
    /// One group per light, blended client-side
    #[default]
    Css,
    /// One group per room
    Overlay,
    /// A single group for the whole house
    Full,
}

impl FromStr for LightMixingMode {
    type Err = LumaplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "overlay" => Ok(Self::Overlay),
            "full" => Ok(Self::Full),
            other => Err(LumaplanError::ConfigError(format!(
                "unknown light mixing mode '{}' (expected css, overlay or full)",
                other
            ))),
        }
    }
}

impl fmt::Display for LightMixingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Css => "css",
            Self::Overlay => "overlay",
            Self::Full => "full",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = LumaplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(LumaplanError::ConfigError(format!(
                "unknown image format '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    High,
    Low,
}

/// Icon clustering used while relaxing overlaps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// An icon joins the first cluster it touches; clusters never merge
    #[default]
    SingleLinkage,
    /// Transitive closure of the intersection relation
    UnionFind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub light_mixing_mode: LightMixingMode,
    /// Per-pixel diff threshold, 0..=100
    pub sensitivity: u8,
    pub quality: Quality,
    pub image_format: ImageFormat,
    pub use_existing_renders: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 576,
            light_mixing_mode: LightMixingMode::Css,
            sensitivity: 10,
            quality: Quality::High,
            image_format: ImageFormat::Png,
            use_existing_renders: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl OutputConfig {
    /// Raw per-combination frames
    pub fn renders_dir(&self) -> PathBuf {
        self.dir.join("renders")
    }

    /// Derived assets and the layout document
    pub fn floorplan_dir(&self) -> PathBuf {
        self.dir.join("floorplan")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub avoid_icon_overlap: bool,
    pub cluster_mode: ClusterMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            avoid_icon_overlap: true,
            cluster_mode: ClusterMode::SingleLinkage,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LumaplanConfig {
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub layout: LayoutConfig,
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSection {
    width: Option<u32>,
    height: Option<u32>,
    light_mixing_mode: Option<LightMixingMode>,
    sensitivity: Option<u8>,
    quality: Option<Quality>,
    image_format: Option<ImageFormat>,
    use_existing_renders: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSection {
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSection {
    avoid_icon_overlap: Option<bool>,
    cluster_mode: Option<ClusterMode>,
}

/// One config file layer; absent keys leave lower layers untouched
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    render: RenderSection,
    #[serde(default)]
    output: OutputSection,
    #[serde(default)]
    layout: LayoutSection,
    scenes: Option<Vec<Scene>>,
}

impl LumaplanConfig {
    /// Load config with layered precedence: defaults < global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".lumaplan/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file path on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::load_file(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Write the resolved config as a complete TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(LumaplanError::ConfigError(format!(
                "render size must be positive, got {}x{}",
                self.render.width, self.render.height
            )));
        }
        if self.render.sensitivity > 100 {
            return Err(LumaplanError::ConfigError(format!(
                "sensitivity must be between 0 and 100, got {}",
                self.render.sensitivity
            )));
        }
        Ok(())
    }

    /// Scenes to render; an empty list means one implicit unnamed scene
    pub fn effective_scenes(&self) -> Vec<Scene> {
        if self.scenes.is_empty() {
            vec![Scene::default()]
        } else {
            self.scenes.clone()
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".lumaplan").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            LumaplanError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn merge(&mut self, overlay: ConfigFile) {
        let r = overlay.render;
        if let Some(v) = r.width {
            self.render.width = v;
        }
        if let Some(v) = r.height {
            self.render.height = v;
        }
        if let Some(v) = r.light_mixing_mode {
            self.render.light_mixing_mode = v;
        }
        if let Some(v) = r.sensitivity {
            self.render.sensitivity = v;
        }
        if let Some(v) = r.quality {
            self.render.quality = v;
        }
        if let Some(v) = r.image_format {
            self.render.image_format = v;
        }
        if let Some(v) = r.use_existing_renders {
            self.render.use_existing_renders = v;
        }
        if let Some(dir) = overlay.output.dir {
            self.output.dir = dir;
        }
        if let Some(v) = overlay.layout.avoid_icon_overlap {
            self.layout.avoid_icon_overlap = v;
        }
        if let Some(v) = overlay.layout.cluster_mode {
            self.layout.cluster_mode = v;
        }
        if let Some(scenes) = overlay.scenes {
            self.scenes = scenes;
        }
    }

    /// Apply `LUMAPLAN_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("LUMAPLAN_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
        for (key, slot) in [
            ("LUMAPLAN_WIDTH", &mut self.render.width),
            ("LUMAPLAN_HEIGHT", &mut self.render.height),
        ] {
            if let Some(raw) = lookup(key) {
                match raw.parse::<u32>() {
                    Ok(v) => *slot = v,
                    Err(_) => log::warn!("Ignoring {}={}: not a positive integer", key, raw),
                }
            }
        }
        if let Some(raw) = lookup("LUMAPLAN_MIXING_MODE") {
            match raw.parse::<LightMixingMode>() {
                Ok(mode) => self.render.light_mixing_mode = mode,
                Err(e) => log::warn!("Ignoring LUMAPLAN_MIXING_MODE: {}", e),
            }
        }
    }
}
