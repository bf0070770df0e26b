//! Generator configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! yields the umi-style output.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GenError, Result};

/// Knobs that shape the emitted TypeScript.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Module the request helper is imported from.
    pub request_import: String,
    /// Name of the imported request helper.
    pub request_fn: String,
    /// Namespace wrapping every declaration.
    pub namespace: String,
    /// Tag assigned to operations without tags.
    pub default_tag: String,
    /// Suffix appended to a function name to name its parameter bag.
    pub params_suffix: String,
    /// Lines written at the top of every function module.
    pub file_header: Vec<String>,
    /// Signatures longer than this are broken one argument per line.
    pub print_width: usize,
    /// Treat fields as required when a schema has no required markings at all.
    pub implicit_required: bool,
    /// Emit tag modules on the rayon pool.
    pub parallel_emit: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            request_import: "umi".to_string(),
            request_fn: "request".to_string(),
            namespace: "API".to_string(),
            default_tag: "default".to_string(),
            params_suffix: "Params".to_string(),
            file_header: vec!["// @ts-ignore".to_string(), "/* eslint-disable */".to_string()],
            print_width: 100,
            implicit_required: true,
            parallel_emit: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| GenError::InvalidConfig {
            message: err.to_string(),
        })
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| GenError::InvalidConfig {
            message: format!("failed to read {}: {err}", path.display()),
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded generator config");
        Ok(config)
    }
}
