use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::StencilError;

/// Settings shared by the package gate, the editor and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deepest schema nesting an uploaded package may have.
    pub max_schema_level: usize,
    pub editor: EditorConfig,
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_schema_level: 2,
            editor: EditorConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self, StencilError> {
        loader.load()
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<(), StencilError> {
        saver.save(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Slack, in canonical characters, allowed on either side of a loop body
    /// when deciding whether the cursor sits inside it.
    pub loop_tolerance: usize,
    /// Prefix for the placeholder line of a synthesized loop block.
    pub loop_indent: SmolStr,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            loop_tolerance: 10,
            loop_indent: SmolStr::new_static("  "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used when exporting the template.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "template.txt".to_owned(),
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    fn load(&self) -> Result<Config, StencilError>;
}

/// The trait for saving configuration data.
pub trait Saver {
    fn save(&self, config: &Config) -> Result<(), StencilError>;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
///
/// The format follows the file extension: `.json` or `.toml`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn format(&self) -> Result<Format, StencilError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            _ => Err(StencilError::Config(format!(
                "unsupported config format: {}",
                self.path.display()
            ))),
        }
    }
}

enum Format {
    Json,
    Toml,
}

impl Loader for FileStore {
    fn load(&self) -> Result<Config, StencilError> {
        let format = self.format()?;
        let text = std::fs::read_to_string(&self.path)?;
        match format {
            Format::Json => serde_json::from_str(&text).map_err(|e| {
                crate::error::ParseError::new(self.path.display().to_string(), &text, e).into()
            }),
            Format::Toml => toml::from_str(&text).map_err(|e| StencilError::Config(e.to_string())),
        }
    }
}

impl Saver for FileStore {
    fn save(&self, config: &Config) -> Result<(), StencilError> {
        let text = match self.format()? {
            Format::Json => serde_json::to_string_pretty(config)
                .map_err(|e| StencilError::Config(e.to_string()))?,
            Format::Toml => {
                toml::to_string_pretty(config).map_err(|e| StencilError::Config(e.to_string()))?
            }
        };
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}
