//! Configuration file support for ferro-effect.
//!
//! Annotator settings can be read from a TOML file.
//!
//! # Example Configuration
//!
//! ```toml
//! promoter_len = 5000
//! typed_cnv_effects = false
//!
//! [parallel]
//! chunk_size = 500
//! num_threads = 4
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-effect.toml` in current directory
//! 2. `~/.config/ferro/effect.toml`

use crate::error::FerroError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for the variant annotator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorConfig {
    /// Bases upstream of a transcript reported as promoter (0 disables).
    pub promoter_len: u64,
    /// Report copy-number changes as `CNV+`/`CNV-` instead of `unknown`.
    pub typed_cnv_effects: bool,
    /// Batch annotation settings.
    pub parallel: ParallelConfig,
}

/// Configuration for parallel batch processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallelConfig {
    /// Chunk size for parallel processing
    pub chunk_size: usize,
    /// Number of threads (0 = use rayon default)
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            num_threads: 0,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size for batched processing
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the number of threads
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }
}

impl AnnotatorConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the promoter length.
    pub fn with_promoter_len(mut self, promoter_len: u64) -> Self {
        self.promoter_len = promoter_len;
        self
    }

    /// Switch copy-number effects to `CNV+`/`CNV-`.
    pub fn with_typed_cnv_effects(mut self, typed: bool) -> Self {
        self.typed_cnv_effects = typed;
        self
    }

    /// Load configuration from the default locations.
    ///
    /// Returns `Ok(None)` when no config file exists. A file that exists but
    /// does not parse is an error.
    pub fn load() -> Result<Option<Self>, FerroError> {
        let cwd_config = PathBuf::from(".ferro-effect.toml");
        if cwd_config.exists() {
            return Self::load_from_path(&cwd_config).map(Some);
        }

        if let Some(home) = dirs_home() {
            let home_config = home.join(".config").join("ferro").join("effect.toml");
            if home_config.exists() {
                return Self::load_from_path(&home_config).map(Some);
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, FerroError> {
        let content = fs::read_to_string(path).map_err(|e| FerroError::Config {
            msg: format!("{}: {}", path.display(), e),
        })?;
        log::debug!("loading annotator config from {}", path.display());
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, FerroError> {
        Ok(toml::from_str(content)?)
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
