use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

pub const DEFAULT_TASK_URL: &str =
    "https://s3-eu-west-1.amazonaws.com/poteha-job-interview-uploads/f98f8e9a-24d0-4c2c-a481-bcfd15c140d4/task.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// URL or file path of the task JSON.
    pub task_url: String,
    /// Frame widths are in terminal columns.
    pub min_width: f64,
    pub initial_width: f64,
    /// Rows kept free below the last fully visible frame.
    pub bottom_margin: f64,
    /// Rows reserved under the grid top when deriving the maximum width.
    pub grid_margin: f64,
    /// Tile height per column of tile width.
    pub tile_aspect: f64,
    pub width_quiet_ms: u64,
    pub resize_quiet_ms: u64,
    /// Slider increment per key press.
    pub width_step: f64,
    pub preview_command: Option<String>,
    pub log_file: String,
    pub log_level: String,
}

impl Settings {
    /// Defaults, then the blueprint next to the manifest, the user config and
    /// `./framesift.toml`, then `FRAMESIFT_*` environment variables.
    pub fn new(explicit: Option<&Path>) -> Result<Self> {
        let blueprint_path = match std::env::var("CARGO_MANIFEST_DIR") {
            Ok(manifest_dir) => {
                let mut path = PathBuf::from(manifest_dir);
                path.push("framesift.toml");
                path
            }
            Err(_) => PathBuf::from("framesift.toml"),
        };

        let mut files = vec![blueprint_path.clone()];
        if let Some(user_config_path) = get_user_config_path() {
            if !user_config_path.exists() {
                seed_user_config(&blueprint_path, &user_config_path)?;
            }
            files.push(user_config_path);
        }
        files.push(PathBuf::from("framesift.toml"));

        Self::from_sources(&files, explicit)
    }

    /// Layers the given optional files (lowest priority first), an explicit
    /// required file, and the environment over the built-in defaults.
    pub fn from_sources(files: &[PathBuf], explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("task_url", DEFAULT_TASK_URL)?
            .set_default("min_width", 12.0)?
            .set_default("initial_width", 36.0)?
            .set_default("bottom_margin", 1.0)?
            .set_default("grid_margin", 1.0)?
            .set_default("tile_aspect", 0.28)?
            .set_default("width_quiet_ms", 300_i64)?
            .set_default("resize_quiet_ms", 500_i64)?
            .set_default("width_step", 5.0)?
            .set_default("log_file", "~/.local/state/framesift/framesift.log")?
            .set_default("log_level", "info")?;

        for file in files {
            builder = builder.add_source(File::from(file.as_path()).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix("FRAMESIFT"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn width_quiet(&self) -> Duration {
        Duration::from_millis(self.width_quiet_ms)
    }

    pub fn resize_quiet(&self) -> Duration {
        Duration::from_millis(self.resize_quiet_ms)
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_file).into_owned())
    }
}

/// Copies the blueprint to the user config location on first run. A missing
/// blueprint is not an error; the defaults cover every setting.
fn seed_user_config(blueprint_path: &Path, user_config_path: &Path) -> Result<()> {
    if let Ok(blueprint_content) = fs::read_to_string(blueprint_path) {
        if let Some(parent) = user_config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(user_config_path, blueprint_content)?;
    }
    Ok(())
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("framesift");
    path.push("framesift.toml");
    Some(path)
}

/// Remembers the last frame width in the user config so the next session
/// starts there.
pub fn save_frame_width(width: f64) -> Result<()> {
    match get_user_config_path() {
        Some(path) => save_frame_width_to(&path, width),
        None => Ok(()),
    }
}

pub fn save_frame_width_to(path: &Path, width: f64) -> Result<()> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let mut doc = config_str.parse::<toml::Table>()?;

    doc.insert("initial_width".to_string(), toml::Value::Float(width.round()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    Ok(())
}
