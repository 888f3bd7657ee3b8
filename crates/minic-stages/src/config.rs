//! Pipeline configuration: which analyzer serves each phase.
//!
//! ```yaml
//! lexical: builtin
//! syntax: builtin
//! semantic:
//!   command:
//!     program: ./bin/check
//!     args: ["--strict"]
//! ```
//!
//! Omitted phases fall back to the built-in stage.

use crate::{builtin, CommandAnalyzer};
use minic_core::{Analyzer, AnalyzerSet, Phase};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MINIC_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG/READ: {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CONFIG/PARSE: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("CONFIG/INVALID: {0}")]
    Invalid(String),
}

/// How a single phase is served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBinding", into = "RawBinding")]
pub enum Binding {
    #[default]
    Builtin,
    Command { program: String, args: Vec<String> },
}

// Accepts both `builtin` and `{ command: { program, args } }`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawBinding {
    Name(String),
    Command { command: CommandSpec },
}

#[derive(Serialize, Deserialize)]
struct CommandSpec {
    program: String,
    #[serde(default)]
    args: Vec<String>,
}

impl TryFrom<RawBinding> for Binding {
    type Error = String;

    fn try_from(raw: RawBinding) -> Result<Self, Self::Error> {
        match raw {
            RawBinding::Name(name) if name == "builtin" => Ok(Binding::Builtin),
            RawBinding::Name(other) => Err(format!("unknown analyzer binding '{}' (expected 'builtin' or a command)", other)),
            RawBinding::Command { command } => Ok(Binding::Command {
                program: command.program,
                args: command.args,
            }),
        }
    }
}

impl From<Binding> for RawBinding {
    fn from(binding: Binding) -> Self {
        match binding {
            Binding::Builtin => RawBinding::Name("builtin".to_string()),
            Binding::Command { program, args } => RawBinding::Command {
                command: CommandSpec { program, args },
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub lexical: Binding,
    pub syntax: Binding,
    pub semantic: Binding,
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content. Blank content is the default.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from `$MINIC_CONFIG` when set, otherwise all built-in.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => {
                tracing::info!(path = ?path, "loading pipeline configuration");
                Self::load(PathBuf::from(path))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn binding(&self, phase: Phase) -> &Binding {
        match phase {
            Phase::Lexical => &self.lexical,
            Phase::Syntax => &self.syntax,
            Phase::Semantic => &self.semantic,
        }
    }

    /// Construct the analyzer set described by this configuration.
    pub fn build(&self) -> Result<AnalyzerSet, ConfigError> {
        let mut set = AnalyzerSet::new();
        for phase in Phase::ALL {
            let analyzer: Box<dyn Analyzer> = match self.binding(phase) {
                Binding::Builtin => builtin(phase),
                Binding::Command { program, args } => {
                    if program.trim().is_empty() {
                        return Err(ConfigError::Invalid(format!(
                            "{} analysis: command program must not be empty",
                            phase
                        )));
                    }
                    Box::new(CommandAnalyzer::new(phase, program.clone(), args.clone()))
                }
            };
            tracing::debug!(%phase, analyzer = analyzer.id(), "analyzer bound");
            set = set.bind(phase, analyzer);
        }
        Ok(set)
    }
}
