//! Integration tests for the phase-gated session.
//!
//! A scripted adapter lets each test decide which phases fail, so the
//! gating rules can be checked independently of any real analyzer.

use minic_core::{
    AnalysisResult, AnalyzerAdapter, AnalyzerError, Event, Phase, PipelineError, Session, Stage,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Scripted {
    failing: Mutex<HashSet<Phase>>,
    calls: Mutex<Vec<(Phase, String)>>,
}

impl Scripted {
    fn fail(&self, phase: Phase) {
        self.failing.lock().unwrap().insert(phase);
    }

    fn heal(&self, phase: Phase) {
        self.failing.lock().unwrap().remove(&phase);
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl AnalyzerAdapter for Scripted {
    fn invoke(&self, phase: Phase, source: &str) -> AnalysisResult {
        self.calls.lock().unwrap().push((phase, source.to_string()));
        if self.failing.lock().unwrap().contains(&phase) {
            Err(AnalyzerError::Rejected(format!("{} rejected the source", phase)))
        } else {
            Ok(format!("{} ok ({} bytes)", phase, source.len()))
        }
    }
}

fn session() -> (Session, Arc<Scripted>) {
    let adapter = Arc::new(Scripted::default());
    (Session::new(adapter.clone()), adapter)
}

fn runnable_set(s: &Session) -> Vec<Phase> {
    Phase::ALL.iter().copied().filter(|p| s.is_runnable(*p)).collect()
}

// =============================================================================
// Load / Edit
// =============================================================================

#[test]
fn test_load_non_empty_enables_only_lexical() {
    for text in ["x = 1", "  y = 2  ", "print \"hi\"\n", "\n\nz"] {
        let (mut s, _) = session();
        s.load(text);
        assert_eq!(s.stage(), Stage::Idle, "stage after load of {:?}", text);
        assert_eq!(runnable_set(&s), vec![Phase::Lexical], "runnable after load of {:?}", text);
    }
}

#[test]
fn test_load_blank_enables_nothing() {
    let (mut s, _) = session();
    s.load(" \t\n ");
    assert_eq!(s.stage(), Stage::Idle);
    assert!(runnable_set(&s).is_empty());
}

#[test]
fn test_edit_after_completed_stage_resets_even_if_unchanged() {
    let (mut s, _) = session();
    s.load("x = 1");
    s.run_lexical().unwrap();
    s.run_syntax().unwrap();
    assert_eq!(s.stage(), Stage::SyntaxDone);

    s.edit("x = 1");
    assert_eq!(s.stage(), Stage::Idle);
    assert_eq!(runnable_set(&s), vec![Phase::Lexical]);
    assert_eq!(s.log().len(), 2);
}

#[test]
fn test_edit_from_terminal_stage() {
    let (mut s, _) = session();
    s.load("x = 1");
    s.run_through(Phase::Semantic).unwrap();
    assert_eq!(s.stage(), Stage::SemanticDone);
    assert!(runnable_set(&s).is_empty());

    s.edit("x = 2");
    assert_eq!(s.stage(), Stage::Idle);
    assert_eq!(runnable_set(&s), vec![Phase::Lexical]);
}

// =============================================================================
// Phase progression
// =============================================================================

#[test]
fn test_successful_runs_advance_strictly() {
    let (mut s, _) = session();
    s.load("x = 1");

    let expected = [
        (Phase::Lexical, Stage::LexicalDone, Some(Phase::Syntax)),
        (Phase::Syntax, Stage::SyntaxDone, Some(Phase::Semantic)),
        (Phase::Semantic, Stage::SemanticDone, None),
    ];

    for (phase, stage, next) in expected {
        let entry = s.run(phase).unwrap();
        assert!(entry.outcome.is_success());
        assert_eq!(s.stage(), stage);
        assert_eq!(s.runnable(), next);
        assert_eq!(runnable_set(&s).len(), next.map_or(0, |_| 1));
    }
}

#[test]
fn test_failure_in_any_phase_returns_to_idle() {
    for failing in Phase::ALL {
        let (mut s, adapter) = session();
        adapter.fail(failing);
        s.load("x = 1");

        let entries = s.run_through(Phase::Semantic).unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.phase, failing);
        assert!(!last.outcome.is_success());
        assert_eq!(s.stage(), Stage::Idle, "after {} failure", failing);
        assert_eq!(runnable_set(&s), vec![Phase::Lexical], "after {} failure", failing);
    }
}

#[test]
fn test_repeated_failure_is_idempotent() {
    let (mut s, adapter) = session();
    adapter.fail(Phase::Lexical);
    s.load("x = 1");

    for n in 1..=3 {
        s.run_lexical().unwrap();
        assert_eq!(s.stage(), Stage::Idle);
        assert_eq!(runnable_set(&s), vec![Phase::Lexical]);
        assert_eq!(s.log().len(), n);
    }
}

#[test]
fn test_out_of_order_requests_are_rejected_without_side_effects() {
    let (mut s, adapter) = session();
    s.load("x = 1");

    for phase in [Phase::Syntax, Phase::Semantic] {
        let err = s.run(phase).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidStageTransition { stage: Stage::Idle, .. }
        ));
    }

    s.run_lexical().unwrap();
    let err = s.run_lexical().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidStageTransition { phase: Phase::Lexical, stage: Stage::LexicalDone }
    ));

    assert_eq!(s.stage(), Stage::LexicalDone);
    assert_eq!(s.log().len(), 1);
    assert_eq!(adapter.calls(), 1);
}

#[test]
fn test_adapter_receives_full_unmodified_source() {
    let (mut s, adapter) = session();
    let text = "  let x = 1;\n\tprint x\n";
    s.load(text);
    s.run_lexical().unwrap();
    assert_eq!(s.source(), text);
    assert_eq!(adapter.calls.lock().unwrap()[0], (Phase::Lexical, text.to_string()));
}

// =============================================================================
// Output Log
// =============================================================================

#[test]
fn test_log_length_equals_invocations() {
    let (mut s, adapter) = session();
    s.load("x = 1");
    s.run_lexical().unwrap();
    adapter.fail(Phase::Syntax);
    s.run_syntax().unwrap();
    s.run_lexical().unwrap();
    adapter.heal(Phase::Syntax);
    s.run_syntax().unwrap();
    s.run_semantic().unwrap();

    assert_eq!(s.log().len(), 5);
    let seqs: Vec<usize> = s.log().entries().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_log_is_never_rewritten() {
    let (mut s, adapter) = session();
    s.load("x = 1");
    s.run_lexical().unwrap();
    let first = s.transcript();

    adapter.fail(Phase::Syntax);
    s.run_syntax().unwrap();
    s.edit("x = 2");
    s.run_lexical().unwrap();

    assert!(s.transcript().starts_with(&first));
    assert!(s.transcript().contains("ERROR in Syntax Analysis:\nsyntax rejected the source\n"));
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_from_every_stage() {
    for steps in 0..=3 {
        let (mut s, _) = session();
        s.load("x = 1");
        for phase in Phase::ALL.iter().take(steps) {
            s.run(*phase).unwrap();
        }

        s.reset();
        assert_eq!(s.stage(), Stage::Idle);
        assert_eq!(s.source(), "");
        assert!(s.log().is_empty());
        assert!(!s.is_runnable(Phase::Lexical));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_syntax_failure_then_recovery() {
    let (mut s, adapter) = session();
    s.load("x = 1");

    s.run_lexical().unwrap();
    assert_eq!(s.stage(), Stage::LexicalDone);
    assert_eq!(s.log().len(), 1);

    adapter.fail(Phase::Syntax);
    let entry = s.run_syntax().unwrap();
    assert!(!entry.outcome.is_success());
    assert_eq!(s.stage(), Stage::Idle);
    assert_eq!(s.log().len(), 2);
    assert!(s.is_runnable(Phase::Lexical));
    assert!(!s.is_runnable(Phase::Syntax));

    s.run_lexical().unwrap();
    assert_eq!(s.stage(), Stage::LexicalDone);

    s.edit("x = 2");
    assert_eq!(s.stage(), Stage::Idle);
    assert_eq!(s.log().len(), 3);
    assert!(s.is_runnable(Phase::Lexical));
}

#[test]
fn test_scenario_lexical_rejected_after_reset() {
    let (mut s, adapter) = session();
    s.load("x = 1");
    s.run_lexical().unwrap();
    s.reset();

    let err = s.run_lexical().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidStageTransition { phase: Phase::Lexical, stage: Stage::Idle }
    ));
    assert_eq!(s.log().len(), 0);
    assert_eq!(adapter.calls(), 1);
}

#[test]
fn test_dispatch_covers_all_events() {
    let (mut s, _) = session();
    assert!(s.dispatch(Event::Load("x = 1".into())).unwrap().is_none());
    let entry = s.dispatch(Event::Run(Phase::Lexical)).unwrap().unwrap();
    assert_eq!(entry.phase, Phase::Lexical);
    s.dispatch(Event::Edit("x = 3".into())).unwrap();
    assert_eq!(s.stage(), Stage::Idle);
    s.dispatch(Event::Reset).unwrap();
    assert_eq!(s.source(), "");
    assert!(s.dispatch(Event::Run(Phase::Lexical)).is_err());
}

#[test]
fn test_load_file_reads_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.mc");
    std::fs::write(&path, "let a = 4\nprint a\n").unwrap();

    let (mut s, _) = session();
    s.load_file(&path).unwrap();
    assert_eq!(s.source(), "let a = 4\nprint a\n");
    assert_eq!(s.runnable(), Some(Phase::Lexical));
}

#[test]
fn test_snapshot_serializes() {
    let (mut s, _) = session();
    s.load("x = 1");
    s.run_lexical().unwrap();

    let json = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(json["stage"], "lexical_done");
    assert_eq!(json["runnable"], "syntax");
    assert_eq!(json["entries"][0]["phase"], "lexical");
    assert_eq!(json["entries"][0]["outcome"]["status"], "success");
}
