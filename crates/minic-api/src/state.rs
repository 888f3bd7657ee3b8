//! Shared server state: the session table and what every session needs.
use crate::error::ApiError;
use crate::metrics::Metrics;
use minic_core::{AnalyzerAdapter, Session};
use minic_out::Transcripts;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SessionHandle = Arc<Mutex<Session>>;

/// Open sessions held at once unless `MINIC_MAX_SESSIONS` says otherwise.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

pub struct AppState {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    max_sessions: usize,
    adapter: Arc<dyn AnalyzerAdapter>,
    pub transcripts: Transcripts,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(adapter: Arc<dyn AnalyzerAdapter>, transcripts: Transcripts, metrics: Metrics) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: DEFAULT_MAX_SESSIONS,
            adapter,
            transcripts,
            metrics,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Opens a session, or fails once `max_sessions` are already open.
    pub async fn open(&self) -> Result<(Uuid, SessionHandle), ApiError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(ApiError::SessionLimit(self.max_sessions));
        }
        let session = Session::new(self.adapter.clone());
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id, handle.clone());
        self.metrics.session_opened();
        Ok((id, handle))
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, ApiError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::SessionNotFound(id))
    }

    pub async fn close(&self, id: Uuid) -> Result<(), ApiError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .ok_or(ApiError::SessionNotFound(id))?;
        self.metrics.session_closed();
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
