//! Declarations files
//!
//! Entry-point overrides can live outside the code, in TOML or JSON:
//!
//! ```toml
//! [[entrypoint]]
//! function = "to_rename"
//! name = "renamed"
//! description = "An example with custom labels."
//!
//! [entrypoint.params]
//! foo = "the value for foo"
//! _count = { help = "how many", type = "int", default = 1 }
//! ```
//!
//! Parameter order is kept, since it is the order positionals are added in.

use crate::error::{SetupError, SetupResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Declarations for one function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrypointSection {
    /// Function the declarations apply to
    pub function: String,
    /// Command name override (`{name}` is replaced by the function name)
    #[serde(default)]
    pub name: Option<String>,
    /// Description override
    #[serde(default)]
    pub description: Option<String>,
    /// Parameter specs in declaration order: help strings or option maps
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Extra parser adapter configuration
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
}

/// A whole declarations file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrypointsFile {
    /// One section per function
    #[serde(default)]
    pub entrypoint: Vec<EntrypointSection>,
}

impl EntrypointsFile {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> SetupResult<Self> {
        toml::from_str(content)
            .map_err(|e| SetupError::config(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse JSON text
    pub fn from_json_str(content: &str) -> SetupResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| SetupError::config(format!("Failed to parse JSON: {}", e)))
    }

    /// Load from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> SetupResult<Self> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> SetupResult<Self> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load by extension, trying TOML then JSON when it is not recognised
    pub fn from_file(path: impl AsRef<Path>) -> SetupResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path).or_else(|_| Self::from_json_file(path)),
        }
    }

    /// Section for `function`; the last one wins if it appears twice
    pub fn section(&self, function: &str) -> Option<&EntrypointSection> {
        self.entrypoint.iter().rev().find(|s| s.function == function)
    }
}

fn read(path: &Path) -> SetupResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        SetupError::config(format!(
            "Failed to read declarations file {}: {}",
            path.display(),
            e
        ))
    })
}
