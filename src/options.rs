//! Annotation options and their TOML file form.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnnotateError, Result};

/// Config file picked up from the working directory when present.
pub const CONFIG_FILE_NAME: &str = "schemanote.toml";

pub const DEFAULT_HEADER: &str = "== Schema Info";

pub const DEFAULT_COMMENT_PREFIX: &str = "#";

/// Where the block sits in the annotated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub position: Position,
    /// Move an existing block to `position` instead of keeping it where it is.
    pub force: bool,
    pub show_foreign_keys: bool,
    pub show_indexes: bool,
    /// Marker text identifying the managed block.
    pub header: String,
    /// Line-comment token every block line starts with.
    pub comment_prefix: String,
    /// Fail rather than write when a file would change.
    pub frozen: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            position: Position::Before,
            force: false,
            show_foreign_keys: false,
            show_indexes: false,
            header: DEFAULT_HEADER.to_string(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            frozen: false,
        }
    }
}

impl Options {
    /// Load options from a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))?;
        toml::from_str(&content).map_err(|source| AnnotateError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
