//! Subcommand implementations.

use anyhow::Context;
use minic_core::{AnalyzerAdapter, Phase, Session};
use minic_out::{TranscriptFormat, Transcripts};
use minic_stages::PipelineConfig;
use std::path::Path;
use std::sync::Arc;

/// Result of `minic run`.
#[derive(Debug)]
pub struct RunReport {
    pub output: String,
    /// At least one phase ran and failed.
    pub failed: bool,
}

/// Analyzer bindings from `config`, or all built-in when absent.
pub fn load_analyzers(config: Option<&Path>) -> anyhow::Result<Arc<dyn AnalyzerAdapter>> {
    let config = match config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let analyzers = config.build()?;
    for (phase, id) in analyzers.describe() {
        tracing::debug!(%phase, analyzer = %id, "analyzer bound");
    }
    Ok(Arc::new(analyzers))
}

pub fn transcripts(templates: Option<&Path>) -> anyhow::Result<Transcripts> {
    Ok(match templates {
        Some(path) => Transcripts::with_overrides(path)
            .with_context(|| format!("loading templates from {}", path.display()))?,
        None => Transcripts::builtin()?,
    })
}

/// Load `file`, run phases up to `through` and render the transcript.
pub fn run_file(
    adapter: Arc<dyn AnalyzerAdapter>,
    file: &Path,
    through: Phase,
    format: TranscriptFormat,
    transcripts: &Transcripts,
) -> anyhow::Result<RunReport> {
    let mut session = Session::new(adapter);
    session.load_file(file)?;
    if session.runnable().is_none() {
        anyhow::bail!("{} contains no source", file.display());
    }

    let entries = session.run_through(through)?;
    let failed = entries.iter().any(|e| !e.outcome.is_success());
    let output = transcripts.render(&session.snapshot(), format)?;
    Ok(RunReport { output, failed })
}

/// Run the HTTP API until interrupted.
pub fn serve(adapter: Arc<dyn AnalyzerAdapter>, addr: &str, max_sessions: usize) -> anyhow::Result<()> {
    let state = minic_api::default_state(adapter, max_sessions)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime
        .block_on(minic_api::run(addr, state))
        .with_context(|| format!("serving on {}", addr))
}
