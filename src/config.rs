use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "slicer_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlicerEntry {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub slicers: Vec<SlicerEntry>,
    #[serde(default)]
    pub file_extensions: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let slicer = |name: &str, path: &str| SlicerEntry {
            name: name.to_string(),
            path: path.to_string(),
        };
        Self {
            slicers: vec![
                slicer(
                    "Bambu Studio",
                    r"C:\Program Files\Bambu Studio\bambu-studio.exe",
                ),
                slicer(
                    "PrusaSlicer",
                    r"C:\Program Files\Prusa3D\PrusaSlicer\prusa-slicer.exe",
                ),
                slicer("Orca Slicer", r"C:\Program Files\OrcaSlicer\orca-slicer.exe"),
            ],
            file_extensions: [".3mf", ".stl", ".stp", ".step"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: LauncherConfig,
    pub notice: Option<String>,
}

pub fn config_file_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Reads the config, writing the default document first if none exists.
/// Never fails: unreadable or corrupt files fall back to the defaults and
/// are left untouched on disk.
pub fn load_or_create(path: &Path) -> LoadedConfig {
    if !path.exists() {
        let config = LauncherConfig::default();
        let notice = match write_config(path, &config) {
            Ok(()) => {
                log::info!("Wrote default config to {}", path.display());
                None
            }
            Err(err) => {
                log::warn!("{err:#}");
                Some(format!("Failed to save default config: {err:#}"))
            }
        };
        return LoadedConfig { config, notice };
    }

    match read_config(path) {
        Ok(config) => LoadedConfig {
            config,
            notice: None,
        },
        Err(err) => {
            log::warn!("{err:#}; using built-in defaults");
            LoadedConfig {
                config: LauncherConfig::default(),
                notice: Some(format!("Failed to load config: {err:#}")),
            }
        }
    }
}

pub fn read_config(path: &Path) -> Result<LauncherConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Config file {} is not valid JSON", path.display()))
}

pub fn write_config(path: &Path, config: &LauncherConfig) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    config
        .serialize(&mut serializer)
        .context("Could not serialize config")?;
    fs::write(path, buffer)
        .with_context(|| format!("Could not write config file {}", path.display()))
}
