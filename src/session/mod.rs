//! Execution session: runs a buffer snapshot and bridges it to the console
//!
//! The session owns the console log and the input channel. It drives the
//! interpreter coroutine from the UI loop: `pump` runs the script until it
//! asks for input, finishes, or uses up its time slice; `submit_input` and
//! `stop` answer a pending `input` call and keep going.

pub mod channel;

use crate::console::{ConsoleSink, Origin};
use crate::script::interpreter::{self, Interpreter, Resume, Step, Suspend, DEFAULT_TICK_INTERVAL};
use crate::script::ScriptError;
use channel::InputChannel;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Run state of the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    WaitingForInput,
    Stopped,
    Finished,
}

/// Why a run command was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("No code to run")]
    EmptySource,
    #[error("A script is already running")]
    AlreadyActive,
    #[error("Save the file before running")]
    Untitled,
}

/// The one live execution session
pub struct ExecutionSession {
    state: SessionState,
    console: ConsoleSink,
    channel: InputChannel,
    interpreter: Option<Interpreter>,
    source_id: Option<PathBuf>,
    started_at: Option<DateTime<Local>>,
    stop_requested: bool,
    tick_interval: Duration,
    last_error: Option<ScriptError>,
}

impl Default for ExecutionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSession {
    pub fn new() -> Self {
        Self::with_tick_interval(DEFAULT_TICK_INTERVAL)
    }

    /// Session whose scripts yield to the UI every `tick_interval`
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            console: ConsoleSink::new(),
            channel: InputChannel::new(),
            interpreter: None,
            source_id: None,
            started_at: None,
            stop_requested: false,
            tick_interval,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Running or waiting for input
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Running | SessionState::WaitingForInput)
    }

    pub fn console(&self) -> &ConsoleSink {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut ConsoleSink {
        &mut self.console
    }

    pub fn channel(&self) -> &InputChannel {
        &self.channel
    }

    pub fn source_id(&self) -> Option<&Path> {
        self.source_id.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    /// Error that ended the last run, if any
    pub fn last_error(&self) -> Option<&ScriptError> {
        self.last_error.as_ref()
    }

    /// Start running `source`, identified by `path` in the console header.
    ///
    /// Runs the script up to its first input request, time slice or end.
    /// A script that fails to compile still produces a header, one error line
    /// and a footer, and ends in `Finished`.
    pub fn start(&mut self, source: &str, path: Option<&Path>) -> Result<(), RunError> {
        if self.is_active() {
            tracing::warn!("run rejected: session already {:?}", self.state);
            return Err(RunError::AlreadyActive);
        }
        if source.trim().is_empty() {
            return Err(RunError::EmptySource);
        }
        let Some(path) = path else {
            return Err(RunError::Untitled);
        };

        let now = Local::now();
        self.console
            .append(format!("=== Running script: {} ===", path.display()), Origin::ProgramOutput);
        self.console.append(
            format!("Start time: {}", now.format("%Y-%m-%d %H:%M:%S")),
            Origin::ProgramOutput,
        );

        self.source_id = Some(path.to_path_buf());
        self.started_at = Some(now);
        self.stop_requested = false;
        self.last_error = None;
        self.channel.reset();
        tracing::info!("session started: {}", path.display());

        match interpreter::compile(source) {
            Ok(program) => {
                self.interpreter = Some(Interpreter::with_tick_interval(program, self.tick_interval));
                self.state = SessionState::Running;
                self.drive(None);
            }
            Err(err) => self.finish(Err(err)),
        }
        Ok(())
    }

    /// Give a running script its next time slice. No effect in other states.
    pub fn pump(&mut self) -> SessionState {
        if self.state == SessionState::Running {
            self.drive(None);
        }
        self.state
    }

    /// Answer the pending input request with `text`
    pub fn submit_input(&mut self, text: &str) -> bool {
        if self.state != SessionState::WaitingForInput || !self.channel.is_waiting() {
            tracing::warn!("input submitted while {:?}", self.state);
            return false;
        }
        self.channel.submit(text, &mut self.console);
        self.resume_from_channel();
        true
    }

    /// Stop command. Only effective while the script waits for input: the
    /// pending `input` call returns an empty string, the script runs on, and
    /// the session ends in `Stopped`.
    pub fn stop(&mut self) -> bool {
        match self.state {
            SessionState::WaitingForInput => {
                tracing::info!("stop requested while waiting for input");
                self.stop_requested = true;
                self.channel.stop(&mut self.console);
                self.resume_from_channel();
                true
            }
            state => {
                tracing::debug!("stop ignored while {:?}", state);
                false
            }
        }
    }

    fn resume_from_channel(&mut self) {
        let reply = self.channel.take_reply().map(|r| r.into_text());
        self.state = SessionState::Running;
        self.drive(reply);
    }

    /// Resume the interpreter until it suspends for something other than output
    fn drive(&mut self, mut reply: Resume) {
        loop {
            let Some(interpreter) = self.interpreter.as_mut() else {
                return;
            };
            match interpreter.resume(reply.take()) {
                Step::Suspended(Suspend::Output(text)) => {
                    self.console.append(text, Origin::ProgramOutput);
                }
                Step::Suspended(Suspend::Input(prompt)) => {
                    self.channel.request(&prompt, &mut self.console);
                    self.state = SessionState::WaitingForInput;
                    return;
                }
                Step::Suspended(Suspend::Tick) => return,
                Step::Finished(result) => {
                    self.finish(result);
                    return;
                }
            }
        }
    }

    fn finish(&mut self, result: Result<(), ScriptError>) {
        if let Err(err) = result {
            tracing::info!("script failed: {}", err);
            self.console.append(format!("Error: {}", err), Origin::ProgramOutput);
            self.last_error = Some(err);
        }
        self.console.append(
            format!("=== Execution finished at {} ===", Local::now().format("%H:%M:%S")),
            Origin::ProgramOutput,
        );
        self.interpreter = None;
        self.state = if self.stop_requested {
            SessionState::Stopped
        } else {
            SessionState::Finished
        };
        tracing::info!("session ended: {:?}", self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleEntry;

    const HEADER_LINES: usize = 2;

    fn session() -> ExecutionSession {
        ExecutionSession::with_tick_interval(Duration::from_secs(3600))
    }

    fn path() -> &'static Path {
        Path::new("/tmp/test.cmm")
    }

    /// Console entries between the header and the footer
    fn body(session: &ExecutionSession) -> Vec<ConsoleEntry> {
        let entries = session.console().entries();
        entries[HEADER_LINES..entries.len() - 1].to_vec()
    }

    fn out(text: &str) -> ConsoleEntry {
        ConsoleEntry {
            text: text.to_string(),
            origin: Origin::ProgramOutput,
        }
    }

    fn echo(text: &str) -> ConsoleEntry {
        ConsoleEntry {
            text: text.to_string(),
            origin: Origin::UserEcho,
        }
    }

    #[test]
    fn test_output_order() {
        let mut s = session();
        s.start("output(1); output(2);", Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(body(&s), vec![out("1"), out("2")]);
    }

    #[test]
    fn test_header_and_footer() {
        let mut s = session();
        s.start("print(1)", Some(path())).expect("Should run");
        let entries = s.console().entries();
        assert_eq!(entries[0].text, "=== Running script: /tmp/test.cmm ===");
        assert!(entries[1].text.starts_with("Start time: "));
        let footer = &entries[entries.len() - 1].text;
        assert!(footer.starts_with("=== Execution finished at "), "{}", footer);
        assert_eq!(s.source_id(), Some(path()));
    }

    #[test]
    fn test_input_round_trip() {
        let mut s = session();
        s.start("v = input(\"Q\"); output(v);", Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::WaitingForInput);
        assert_eq!(s.channel().prompt(), Some("Q"));

        assert!(s.submit_input("Bob"));
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(body(&s), vec![out("Q"), echo("> Bob"), out("Bob")]);
    }

    #[test]
    fn test_clear_while_waiting_keeps_the_request() {
        let mut s = session();
        s.start("v = input(\"Q\"); print(v)", Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::WaitingForInput);

        s.console_mut().clear();
        assert!(s.console().is_empty());
        assert_eq!(s.state(), SessionState::WaitingForInput);
        assert!(s.channel().is_waiting());

        assert!(s.submit_input("x"));
        assert_eq!(s.state(), SessionState::Finished);
        let entries = s.console().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[..2], [echo("> x"), out("x")]);
        assert!(entries[2].text.starts_with("=== Execution finished at "));
    }

    #[test]
    fn test_deep_nesting_is_a_script_fault() {
        let src = format!("x = {}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let mut s = session();
        s.start(&src, Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::Finished);

        let errors: Vec<_> = body(&s).into_iter().filter(|e| e.text.starts_with("Error: ")).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("nested too deeply"), "{}", errors[0].text);
        assert!(s.last_error().is_some());
    }

    #[test]
    fn test_stop_while_waiting_matches_empty_submission() {
        let src = "v = input(\"Q\"); output(\"got\", len(v));";

        let mut stopped = session();
        stopped.start(src, Some(path())).expect("Should run");
        assert!(stopped.stop());
        assert_eq!(stopped.state(), SessionState::Stopped);

        let mut submitted = session();
        submitted.start(src, Some(path())).expect("Should run");
        submitted.submit_input("");
        assert_eq!(submitted.state(), SessionState::Finished);

        assert_eq!(body(&stopped), body(&submitted));
        assert_eq!(body(&stopped).last(), Some(&out("got 0")));
    }

    #[test]
    fn test_stop_while_running_has_no_effect() {
        let src = "i = 0\nwhile (i < 50) { i++ }\nprint(i)";
        let mut s = ExecutionSession::with_tick_interval(Duration::ZERO);
        s.start(src, Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::Running);
        let before = s.console().entries().to_vec();

        assert!(!s.stop());
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.console().entries(), before.as_slice());

        while s.pump() == SessionState::Running {}
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(body(&s), vec![out("50")]);
    }

    #[test]
    fn test_fault_containment() {
        let mut s = session();
        s.start("print(\"a\")\nprint(\"b\")\nprint(1 / 0)\nprint(\"c\")", Some(path()))
            .expect("Should run");
        assert_eq!(s.state(), SessionState::Finished);
        let body = body(&s);
        assert_eq!(&body[..2], &[out("a"), out("b")]);
        assert_eq!(body.len(), 3);
        assert_eq!(body[2].text, "Error: line 3: division by zero");
        assert_eq!(s.last_error().map(|e| e.line()), Some(3));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let mut s = session();
        s.start("print(1)\nx = = 2", Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::Finished);
        let body = body(&s);
        assert_eq!(body.len(), 1);
        assert!(body[0].text.starts_with("Error: line 2: syntax error"), "{}", body[0].text);
    }

    #[test]
    fn test_empty_source_rejected() {
        let mut s = session();
        assert_eq!(s.start("  \n\t ", Some(path())), Err(RunError::EmptySource));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.console().is_empty());
    }

    #[test]
    fn test_untitled_rejected() {
        let mut s = session();
        assert_eq!(s.start("print(1)", None), Err(RunError::Untitled));
        assert!(s.console().is_empty());
    }

    #[test]
    fn test_single_active_session() {
        let mut s = session();
        s.start("x = input()", Some(path())).expect("Should run");
        assert_eq!(s.state(), SessionState::WaitingForInput);
        let before = s.console().len();

        assert_eq!(s.start("print(2)", Some(path())), Err(RunError::AlreadyActive));
        assert_eq!(s.state(), SessionState::WaitingForInput);
        assert_eq!(s.console().len(), before);

        s.submit_input("done");
        assert_eq!(s.state(), SessionState::Finished);
        s.start("print(2)", Some(path())).expect("Should run again");
        assert_eq!(s.state(), SessionState::Finished);
    }

    #[test]
    fn test_rerun_after_stop() {
        let mut s = session();
        s.start("input(\"?\")", Some(path())).expect("Should run");
        s.stop();
        assert_eq!(s.state(), SessionState::Stopped);
        s.start("print(1)", Some(path())).expect("Should run again");
        assert_eq!(s.state(), SessionState::Finished);
    }

    #[test]
    fn test_submit_without_request_is_ignored() {
        let mut s = session();
        assert!(!s.submit_input("stray"));
        assert!(s.console().is_empty());
    }
}
