//! Template loading for transcript rendering.
//!
//! Template files are YAML maps of named handlebars templates. A built-in
//! set ships with the crate; user files are layered on top of it.

use crate::RenderError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_YAML: &str = include_str!("../templates/transcript.yaml");

/// Top-level templates file structure
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

/// A single template definition
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub description: String,
    pub template: String,
}

impl TemplatesFile {
    /// The templates compiled into the crate.
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_yaml(BUILTIN_YAML)
    }

    /// Load templates from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Template(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse templates from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(yaml).map_err(|e| RenderError::Template(e.to_string()))
    }

    /// Overlay `other` on top of `self`; same-named templates are replaced.
    pub fn merge(mut self, other: TemplatesFile) -> Self {
        self.templates.extend(other.templates);
        self.version = other.version;
        self
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// List all template names, sorted
    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
