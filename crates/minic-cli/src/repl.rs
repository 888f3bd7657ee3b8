//! Line-oriented interactive session.
//!
//! Every command maps onto one session event or query. Input and output are
//! generic so the loop can be driven from tests.

use minic_core::{AnalyzerAdapter, Phase, Session};
use minic_out::Transcripts;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub const HELP: &str = "\
Commands:
  :load PATH     replace the source with the contents of PATH
  :set TEXT      replace the source with TEXT (\\n starts a new line)
  :edit          type new source, end with a line containing only '.'
  :lex           run lexical analysis
  :syntax        run syntax analysis
  :semantic      run semantic analysis
  :run PHASE     run the named phase
  :reset         clear source and output
  :status        show the pipeline stage
  :log           show the output log
  :source        show the current source
  :help          show this help
  :quit          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Load(PathBuf),
    Set(String),
    Edit,
    Run(Phase),
    Reset,
    Status,
    Log,
    Source,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Err(format!("expected a command, got '{}' (try :help)", line));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let require = |what: &str| {
            if arg.is_empty() {
                Err(format!(":{} needs {}", name, what))
            } else {
                Ok(arg)
            }
        };

        match name {
            "load" | "l" => Ok(ReplCommand::Load(PathBuf::from(require("a path")?))),
            "set" => Ok(ReplCommand::Set(require("source text")?.replace("\\n", "\n"))),
            "edit" | "e" => Ok(ReplCommand::Edit),
            "lex" | "lexical" => Ok(ReplCommand::Run(Phase::Lexical)),
            "syntax" | "parse" => Ok(ReplCommand::Run(Phase::Syntax)),
            "semantic" | "sema" => Ok(ReplCommand::Run(Phase::Semantic)),
            "run" | "r" => require("a phase name")?
                .parse()
                .map(ReplCommand::Run)
                .map_err(|e: minic_core::UnknownPhase| e.to_string()),
            "reset" => Ok(ReplCommand::Reset),
            "status" | "s" => Ok(ReplCommand::Status),
            "log" => Ok(ReplCommand::Log),
            "source" | "src" => Ok(ReplCommand::Source),
            "help" | "h" | "?" => Ok(ReplCommand::Help),
            "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
            other => Err(format!("unknown command ':{}' (try :help)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    session: Session,
    transcripts: Transcripts,
}

impl Repl {
    pub fn new(adapter: Arc<dyn AnalyzerAdapter>, transcripts: Transcripts) -> Self {
        Self { session: Session::new(adapter), transcripts }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn prompt(&self) -> String {
        format!("minic[{}]> ", self.session.stage())
    }

    /// Read commands from `input` until `:quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        writeln!(out, "MiniC {} (type :help for commands)", minic_core::MINIC_VERSION)?;
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ReplCommand>() {
                Ok(command) => {
                    if self.execute(command, input, out)? == Flow::Quit {
                        return Ok(());
                    }
                }
                Err(message) => writeln!(out, "error: {}", message)?,
            }
        }
    }

    /// Apply one command. Pipeline errors are reported on `out`, not returned.
    pub fn execute<R: BufRead, W: Write>(
        &mut self,
        command: ReplCommand,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<Flow> {
        match command {
            ReplCommand::Load(path) => match self.session.load_file(&path) {
                Ok(()) => writeln!(out, "loaded {} ({} bytes)", path.display(), self.session.source().len())?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            ReplCommand::Set(text) => {
                self.session.load(text);
                self.report_runnable(out)?;
            }
            ReplCommand::Edit => {
                writeln!(out, "enter source, finish with '.' on its own line")?;
                let text = read_block(input)?;
                self.session.edit(text);
                self.report_runnable(out)?;
            }
            ReplCommand::Run(phase) => match self.session.run(phase) {
                Ok(entry) => write!(out, "{}", entry.render())?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            ReplCommand::Reset => {
                self.session.reset();
                writeln!(out, "session reset")?;
            }
            ReplCommand::Status => match self.transcripts.status_line(&self.session.snapshot()) {
                Ok(line) => writeln!(out, "{}", line)?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            ReplCommand::Log => {
                if self.session.log().is_empty() {
                    writeln!(out, "(log is empty)")?;
                } else {
                    write!(out, "{}", self.session.transcript())?;
                }
            }
            ReplCommand::Source => {
                if self.session.source().is_empty() {
                    writeln!(out, "(no source)")?;
                }
                for (n, line) in self.session.source().lines().enumerate() {
                    writeln!(out, "{:>4} | {}", n + 1, line)?;
                }
            }
            ReplCommand::Help => writeln!(out, "{}", HELP)?,
            ReplCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn report_runnable<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.session.runnable() {
            Some(phase) => writeln!(out, "source set; next: {}", phase),
            None => writeln!(out, "source is empty; nothing to run"),
        }
    }
}

fn read_block<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut text = String::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 || line.trim_end_matches(['\r', '\n']) == "." {
            return Ok(text);
        }
        text.push_str(&line);
    }
}
