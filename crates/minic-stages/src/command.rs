//! Analyzer backed by an external program.
//!
//! The source is written to the child's stdin and its stdout becomes the
//! phase payload. A non-zero exit status is a rejection, reported with the
//! child's stderr (or stdout when stderr is empty).
use minic_core::{AnalysisResult, Analyzer, AnalyzerError, Phase};
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    phase: Phase,
    program: String,
    args: Vec<String>,
    id: String,
}

impl CommandAnalyzer {
    pub fn new(phase: Phase, program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        let id = format!("command.{}:{}", phase, program);
        Self { phase, program, args, id }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Analyzer for CommandAnalyzer {
    fn id(&self) -> &str {
        &self.id
    }

    fn analyze(&self, source: &str) -> AnalysisResult {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("MINIC_PHASE", self.phase.name())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnalyzerError::Execution(format!("cannot start '{}': {}", self.program, e)))?;

        // Feed stdin from a separate thread so a chatty child cannot
        // deadlock against a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| AnalyzerError::Execution(format!("'{}' did not complete: {}", self.program, e)))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(AnalyzerError::Execution(format!(
                        "cannot write source to '{}': {}",
                        self.program, e
                    )));
                }
                Err(_) => {
                    return Err(AnalyzerError::Execution("stdin writer thread panicked".to_string()));
                }
                _ => {}
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("'{}' exited with {}", self.program, output.status));
        tracing::debug!(program = %self.program, status = %output.status, "external analyzer rejected source");
        Err(AnalyzerError::Rejected(detail))
    }
}
