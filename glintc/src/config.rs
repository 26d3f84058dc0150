//! `glint.toml` configuration loading for the `glintc` driver.
//!
//! Grounded on `faxt::config::Config`'s load/load_from_path/find_config_file
//! trio, trimmed to the one thing this tool's pipeline needs beyond its CLI
//! flags: a default set of `load` search directories and the two file
//! extensions (`SPEC_FULL.md` §6's "Ambient addition — configuration
//! file"). CLI flags always override what's in here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GlintcError, Result};

/// Default configuration file name, looked for in the current directory.
pub const CONFIG_FILE_NAME: &str = "glint.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Extra `load` search directories beyond the implied `"."` first entry.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,

    /// Extension that marks a `load` target (and a CLI positional arg) as
    /// glint source rather than a compiled-bytecode input or a dynamic
    /// native-library basename.
    #[serde(default = "default_source_ext")]
    pub source_ext: String,

    /// Extension for compiled bytecode files, both `-c`'s output and a
    /// direct-to-VM input.
    #[serde(default = "default_compiled_ext")]
    pub compiled_ext: String,
}

fn default_source_ext() -> String {
    glint_util::SOURCE_EXT.to_string()
}

fn default_compiled_ext() -> String {
    glint_util::COMPILED_EXT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_dirs: Vec::new(),
            source_ext: default_source_ext(),
            compiled_ext: default_compiled_ext(),
        }
    }
}

impl Config {
    /// Loads `glint.toml` from the current directory if present, otherwise
    /// returns the default configuration.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GlintcError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| GlintcError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    fn find_config_file() -> Option<PathBuf> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_glint_extensions() {
        let config = Config::default();
        assert!(config.search_dirs.is_empty());
        assert_eq!(config.source_ext, "gln");
        assert_eq!(config.compiled_ext, "glnc");
    }

    #[test]
    fn load_from_path_round_trips_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glint.toml");
        std::fs::write(
            &path,
            "search_dirs = [\"/opt/glint/libs\"]\nsource_ext = \"gln\"\ncompiled_ext = \"glnc\"\n",
        )
        .unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.search_dirs, vec![PathBuf::from("/opt/glint/libs")]);
    }

    #[test]
    fn load_from_nonexistent_path_errors() {
        let result = Config::load_from_path(Path::new("/nonexistent/glint.toml"));
        assert!(result.is_err());
    }
}
