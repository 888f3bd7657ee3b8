//! Output Log: append-only transcript of phase invocations.
use crate::data_model::{AnalysisOutcome, LogEntry};
use crate::phase::Phase;
use chrono::Utc;

#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    entries: Vec<LogEntry>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry and returns it.
    pub fn append(
        &mut self,
        phase: Phase,
        outcome: AnalysisOutcome,
        source_hash: String,
        latency_ms: u64,
    ) -> &LogEntry {
        self.entries.push(LogEntry {
            seq: self.entries.len() + 1,
            phase,
            outcome,
            source_hash,
            latency_ms,
            at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Full ordered transcript text.
    pub fn snapshot(&self) -> String {
        self.entries.iter().map(LogEntry::render).collect()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> AnalysisOutcome {
        AnalysisOutcome::Success { text: text.to_string() }
    }

    #[test]
    fn test_snapshot_formats_labeled_blocks() {
        let mut log = OutputLog::new();
        log.append(Phase::Lexical, ok("3 tokens"), "blake3:00".into(), 1);
        log.append(
            Phase::Syntax,
            AnalysisOutcome::Failure { message: "1:3: expected expression".into() },
            "blake3:00".into(),
            2,
        );

        assert_eq!(
            log.snapshot(),
            "=== Lexical Analysis ===\n3 tokens\n\nERROR in Syntax Analysis:\n1:3: expected expression\n\n"
        );
    }

    #[test]
    fn test_blank_payload_prints_placeholder() {
        let mut log = OutputLog::new();
        log.append(Phase::Semantic, ok("  \n"), String::new(), 0);
        assert_eq!(log.snapshot(), "=== Semantic Analysis ===\nNo output\n\n");
    }

    #[test]
    fn test_sequence_numbers_and_clear() {
        let mut log = OutputLog::new();
        assert_eq!(log.append(Phase::Lexical, ok("a"), String::new(), 0).seq, 1);
        assert_eq!(log.append(Phase::Lexical, ok("b"), String::new(), 0).seq, 2);
        assert_eq!(log.len(), 2);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.snapshot(), "");
    }
}
