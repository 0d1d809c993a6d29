pub mod rendering;
pub mod window;

pub use rendering::RenderConfig;
pub use window::WindowConfig;

use crate::render::shaders::FailurePolicy;
use crate::scenes::{Exercise, SceneSettings};
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "shaderlab.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub exercise: Exercise,
    pub on_shader_error: FailurePolicy,
    pub shader_dir: PathBuf,
    pub log_level: String,
    pub window: WindowConfig,
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exercise: Exercise::default(),
            on_shader_error: FailurePolicy::default(),
            shader_dir: PathBuf::from("data/shaders"),
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write config file {:?}", path))
    }

    /// Loads `path`, writing the defaults there first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }
        Self::load_from(path)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow!("Invalid log level '{}'", self.log_level))
    }

    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            policy: self.on_shader_error,
            shader_dir: self.shader_dir.clone(),
        }
    }

    pub fn window_title(&self) -> String {
        self.window
            .title
            .clone()
            .unwrap_or_else(|| self.exercise.window_title().to_string())
    }
}

/// Loads the config from the platform config directory, creating it with
/// defaults on first run.
pub fn load_or_create_config() -> Result<AppConfig> {
    AppConfig::load_or_create(&get_config_path()?)
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "shaderlab")
        .context("Couldn't determine project directory")?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE))
}
