//! MiniC Out: session transcript rendering
//!
//! Turns a [`SessionSnapshot`] into something a person (or a program) can
//! read: the plain log transcript, a Markdown report rendered through
//! handlebars templates, or JSON.
//!
//! # Example
//!
//! ```ignore
//! use minic_out::{render_transcript, TranscriptFormat};
//!
//! let report = render_transcript(&session.snapshot(), TranscriptFormat::Markdown)?;
//! println!("{}", report);
//! ```

pub mod renderer;
pub mod templates;

use minic_core::{SessionSnapshot, NO_OUTPUT};
use renderer::TemplateRenderer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use templates::TemplatesFile;
use thiserror::Error;

/// Errors that can occur during rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    #[default]
    Plain,
    Markdown,
    Json,
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TranscriptFormat::Plain => "plain",
            TranscriptFormat::Markdown => "markdown",
            TranscriptFormat::Json => "json",
        })
    }
}

impl FromStr for TranscriptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(TranscriptFormat::Plain),
            "markdown" | "md" => Ok(TranscriptFormat::Markdown),
            "json" => Ok(TranscriptFormat::Json),
            other => Err(format!("unknown transcript format '{}' (expected plain, markdown or json)", other)),
        }
    }
}

/// Renders snapshots with a fixed template set.
pub struct Transcripts {
    renderer: TemplateRenderer,
}

impl Transcripts {
    /// Built-in templates only.
    pub fn builtin() -> Result<Self, RenderError> {
        Ok(Self { renderer: TemplateRenderer::builtin()? })
    }

    /// Built-in templates overlaid with those in `path`.
    pub fn with_overrides(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let templates = TemplatesFile::builtin()?.merge(TemplatesFile::load(path)?);
        Ok(Self { renderer: TemplateRenderer::new(templates)? })
    }

    pub fn render(&self, snapshot: &SessionSnapshot, format: TranscriptFormat) -> Result<String, RenderError> {
        match format {
            TranscriptFormat::Plain => Ok(snapshot.transcript.clone()),
            TranscriptFormat::Markdown => self.renderer.render("markdown", &template_context(snapshot)),
            TranscriptFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        }
    }

    /// Render any named template against the snapshot.
    pub fn render_named(&self, name: &str, snapshot: &SessionSnapshot) -> Result<String, RenderError> {
        self.renderer.render(name, &template_context(snapshot))
    }

    /// One-line pipeline status.
    pub fn status_line(&self, snapshot: &SessionSnapshot) -> Result<String, RenderError> {
        self.render_named("status", snapshot)
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }
}

/// Render with the built-in templates.
pub fn render_transcript(snapshot: &SessionSnapshot, format: TranscriptFormat) -> Result<String, RenderError> {
    Transcripts::builtin()?.render(snapshot, format)
}

/// Data handed to templates: the snapshot flattened into display strings.
pub fn template_context(snapshot: &SessionSnapshot) -> Value {
    let entries: Vec<Value> = snapshot
        .entries
        .iter()
        .map(|entry| {
            let text = entry.outcome.text().trim_end();
            let text = if entry.outcome.is_success() && text.trim().is_empty() {
                NO_OUTPUT
            } else {
                text
            };
            json!({
                "seq": entry.seq,
                "phase": entry.phase.name(),
                "label": entry.phase.label(),
                "status": if entry.outcome.is_success() { "success" } else { "failure" },
                "text": text,
                "source_hash": entry.source_hash,
                "latency_ms": entry.latency_ms,
                "at": entry.at.to_rfc3339(),
            })
        })
        .collect();

    json!({
        "id": snapshot.id.to_string(),
        "stage": snapshot.stage.to_string(),
        "runnable": snapshot.runnable.map(|p| p.name()),
        "source": snapshot.source.trim_end(),
        "entry_count": snapshot.entries.len(),
        "failures": snapshot.failures(),
        "entries": entries,
        "created_at": snapshot.created_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("md".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Markdown);
        assert_eq!("JSON".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Json);
        assert_eq!("text".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Plain);
        assert!("html".parse::<TranscriptFormat>().is_err());
    }

    #[test]
    fn test_format_display_round_trips() {
        for format in [TranscriptFormat::Plain, TranscriptFormat::Markdown, TranscriptFormat::Json] {
            assert_eq!(format.to_string().parse::<TranscriptFormat>().unwrap(), format);
        }
    }
}
