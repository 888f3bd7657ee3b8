//! Session: source text, stage controller and output log for one user.
//!
//! The four events (load, edit, run, reset) are the only way to mutate a
//! session. Each is processed to completion inside one `&mut self` call,
//! so the analyzer call, the log append and the transition form a single
//! step.
use crate::controller::StageController;
use crate::data_model::{AnalysisOutcome, LogEntry, SessionSnapshot};
use crate::error::PipelineError;
use crate::log::OutputLog;
use crate::phase::{AnalyzerAdapter, Phase};
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load(String),
    Edit(String),
    Run(Phase),
    Reset,
}

pub struct Session {
    id: Uuid,
    source: String,
    controller: StageController,
    log: OutputLog,
    adapter: Arc<dyn AnalyzerAdapter>,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(adapter: Arc<dyn AnalyzerAdapter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: String::new(),
            controller: StageController::new(),
            log: OutputLog::new(),
            adapter,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replaces the source wholesale and restarts the pipeline.
    pub fn load(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.controller.source_changed(&self.source);
        tracing::info!(session = %self.id, bytes = self.source.len(), "source loaded");
    }

    /// Same contract as [`Session::load`]: any edit invalidates downstream results,
    /// even when the text is unchanged.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.controller.source_changed(&self.source);
        tracing::debug!(session = %self.id, bytes = self.source.len(), "source edited");
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            PipelineError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.load(text);
        Ok(())
    }

    /// Runs `phase` if the gating allows it.
    ///
    /// Analyzer failures are not errors here: they come back as a log entry
    /// with a failure outcome, and the pipeline is back at [`Stage::Idle`].
    pub fn run(&mut self, phase: Phase) -> Result<LogEntry, PipelineError> {
        if let Err(e) = self.controller.check(phase) {
            tracing::warn!(session = %self.id, %phase, stage = %self.controller.stage(), "rejected phase request");
            return Err(e);
        }

        let start = Instant::now();
        let outcome = AnalysisOutcome::from(self.adapter.invoke(phase, &self.source));
        let latency_ms = start.elapsed().as_millis() as u64;
        let succeeded = outcome.is_success();

        let entry = self
            .log
            .append(phase, outcome, hash_source(&self.source), latency_ms)
            .clone();
        let stage = self.controller.complete(phase, succeeded);

        if succeeded {
            tracing::info!(session = %self.id, %phase, %stage, latency_ms, "phase succeeded");
        } else {
            tracing::warn!(
                session = %self.id,
                %phase,
                error = entry.outcome.text(),
                "phase failed, pipeline reverted to idle"
            );
        }

        Ok(entry)
    }

    pub fn run_lexical(&mut self) -> Result<LogEntry, PipelineError> {
        self.run(Phase::Lexical)
    }

    pub fn run_syntax(&mut self) -> Result<LogEntry, PipelineError> {
        self.run(Phase::Syntax)
    }

    pub fn run_semantic(&mut self) -> Result<LogEntry, PipelineError> {
        self.run(Phase::Semantic)
    }

    /// Clears source and log; nothing is runnable afterwards.
    pub fn reset(&mut self) {
        self.source.clear();
        self.log.clear();
        self.controller.reset();
        tracing::info!(session = %self.id, "session reset");
    }

    /// Single entry point for presentation layers. Returns the log entry
    /// produced by a `Run` event.
    pub fn dispatch(&mut self, event: Event) -> Result<Option<LogEntry>, PipelineError> {
        match event {
            Event::Load(text) => self.load(text),
            Event::Edit(text) => self.edit(text),
            Event::Run(phase) => return self.run(phase).map(Some),
            Event::Reset => self.reset(),
        }
        Ok(None)
    }

    /// Runs every phase in order, stopping at the first failure or after
    /// `through`. Returns the entries appended.
    pub fn run_through(&mut self, through: Phase) -> Result<Vec<LogEntry>, PipelineError> {
        let mut entries = Vec::new();
        while let Some(phase) = self.controller.runnable() {
            if phase > through {
                break;
            }
            let entry = self.run(phase)?;
            let failed = !entry.outcome.is_success();
            entries.push(entry);
            if failed {
                break;
            }
        }
        Ok(entries)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn stage(&self) -> Stage {
        self.controller.stage()
    }

    pub fn runnable(&self) -> Option<Phase> {
        self.controller.runnable()
    }

    pub fn is_runnable(&self, phase: Phase) -> bool {
        self.controller.is_runnable(phase)
    }

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    pub fn transcript(&self) -> String {
        self.log.snapshot()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            stage: self.stage(),
            runnable: self.runnable(),
            source: self.source.clone(),
            entries: self.log.entries().to_vec(),
            transcript: self.log.snapshot(),
            created_at: self.created_at,
        }
    }
}

fn hash_source(source: &str) -> String {
    format!("blake3:{}", blake3::hash(source.as_bytes()))
}
