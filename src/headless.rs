//! Headless runner: one execution session over a line reader and a writer
//!
//! Console entries are written as they appear, one per line. When the script
//! waits for input a line is read; end of input acts as the stop command.

use crate::session::{ExecutionSession, RunError, SessionState};
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeadlessError {
    #[error("{0}")]
    Run(#[from] RunError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub state: SessionState,
    pub failed: bool,
}

impl RunSummary {
    /// Process exit status: 0 when finished cleanly, 130 when stopped, 1 on a
    /// script fault. A fault after a stop is still a fault.
    pub fn exit_status(&self) -> u8 {
        match (self.state, self.failed) {
            (_, true) => 1,
            (SessionState::Finished, false) => 0,
            (SessionState::Stopped, false) => 130,
            (SessionState::Idle | SessionState::Running | SessionState::WaitingForInput, false) => 1,
        }
    }
}

/// Run `source` to completion, reading input lines from `input` and
/// writing the console transcript to `output`
pub fn run<R: BufRead, W: Write>(
    source: &str,
    path: &Path,
    mut input: R,
    mut output: W,
) -> Result<RunSummary, HeadlessError> {
    let mut session = ExecutionSession::new();
    session.start(source, Some(path))?;

    let mut written = 0;
    loop {
        written = write_new_entries(&session, written, &mut output)?;
        match session.state() {
            SessionState::Running => {
                session.pump();
            }
            SessionState::WaitingForInput => {
                output.flush()?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    tracing::info!("end of input while waiting, stopping");
                    session.stop();
                } else {
                    let text = line.strip_suffix('\n').unwrap_or(&line);
                    let text = text.strip_suffix('\r').unwrap_or(text);
                    session.submit_input(text);
                }
            }
            state @ (SessionState::Finished | SessionState::Stopped | SessionState::Idle) => {
                output.flush()?;
                return Ok(RunSummary {
                    state,
                    failed: session.last_error().is_some(),
                });
            }
        }
    }
}

fn write_new_entries<W: Write>(session: &ExecutionSession, from: usize, output: &mut W) -> io::Result<usize> {
    let entries = session.console().entries();
    for entry in &entries[from..] {
        writeln!(output, "{}", entry.text)?;
    }
    Ok(entries.len())
}
