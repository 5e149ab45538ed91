//! Engine configuration
//!
//! Controls where custom node definitions are discovered, whether they are
//! hot reloaded and how generated source is formatted. Every field has a
//! default, so a config file only needs the keys it overrides.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;
use crate::nodes::CodegenOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Directories scanned for custom node definition files
    pub custom_node_dirs: Vec<PathBuf>,
    pub recursive_scan: bool,
    pub hot_reload: bool,
    /// Spaces per indentation level in generated shader source
    pub indent_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut custom_node_dirs = Vec::new();
        if let Some(home) = dirs::home_dir() {
            custom_node_dirs.push(home.join(constants::config::HOME_NODE_DIR));
        }
        custom_node_dirs.push(PathBuf::from(constants::config::LOCAL_NODE_DIR));

        Self {
            custom_node_dirs,
            recursive_scan: false,
            hot_reload: false,
            indent_width: constants::shader::DEFAULT_INDENT,
        }
    }
}

impl EngineConfig {
    /// Load a config file; missing keys take their default values
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved engine config to {}", path.display());
        Ok(())
    }

    /// Add a directory to scan for custom node definitions
    pub fn add_custom_node_dir<P: AsRef<Path>>(&mut self, path: P) {
        self.custom_node_dirs.push(path.as_ref().to_path_buf());
    }

    pub fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            indent_width: self.indent_width,
        }
    }
}
