//! Prometheus metrics exposed at `/metrics`.
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    phase_invocations: IntCounterVec,
    sessions_active: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let phase_invocations = IntCounterVec::new(
            Opts::new("minic_phase_invocations_total", "Phase run requests by outcome"),
            &["phase", "outcome"],
        )?;
        let sessions_active = IntGauge::new("minic_sessions_active", "Sessions currently held by the server")?;
        registry.register(Box::new(phase_invocations.clone()))?;
        registry.register(Box::new(sessions_active.clone()))?;
        Ok(Self { registry, phase_invocations, sessions_active })
    }

    /// `outcome` is `success`, `failure` or `rejected` (not runnable).
    pub fn phase_invoked(&self, phase: &str, outcome: &str) {
        self.phase_invocations.with_label_values(&[phase, outcome]).inc();
    }

    pub fn session_opened(&self) {
        self.sessions_active.inc();
    }

    pub fn session_closed(&self) {
        self.sessions_active.dec();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
