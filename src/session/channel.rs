//! Single-slot handoff between a script waiting in `input` and the console input field

use crate::console::{ConsoleSink, Origin};

/// An outstanding `input` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub prompt: String,
}

/// How a request was fulfilled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text submitted through the input field
    Value(String),
    /// Stop command while waiting; reads as an empty line
    Stopped,
}

impl Reply {
    /// The string handed back to the script
    pub fn into_text(self) -> String {
        match self {
            Reply::Value(text) => text,
            Reply::Stopped => String::new(),
        }
    }
}

/// Holds at most one pending request and at most one reply
#[derive(Debug, Default)]
pub struct InputChannel {
    pending: Option<PendingRequest>,
    reply: Option<Reply>,
}

impl InputChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a request. A non-empty prompt is written to the console first.
    ///
    /// Panics if a request is already outstanding or its reply has not been
    /// taken yet.
    pub fn request(&mut self, prompt: &str, console: &mut ConsoleSink) {
        assert!(
            self.pending.is_none() && self.reply.is_none(),
            "input requested while another request is outstanding"
        );
        if !prompt.is_empty() {
            console.append(prompt, Origin::ProgramOutput);
        }
        tracing::debug!("input requested (prompt {:?})", prompt);
        self.pending = Some(PendingRequest {
            prompt: prompt.to_string(),
        });
    }

    /// Fulfil the pending request with user text, echoing it to the console.
    /// Returns false when nothing is waiting.
    pub fn submit(&mut self, text: &str, console: &mut ConsoleSink) -> bool {
        self.fulfil(Reply::Value(text.to_string()), text, console)
    }

    /// Fulfil the pending request with the stop sentinel. The console sees
    /// the same echo as an empty submission.
    pub fn stop(&mut self, console: &mut ConsoleSink) -> bool {
        self.fulfil(Reply::Stopped, "", console)
    }

    fn fulfil(&mut self, reply: Reply, echo: &str, console: &mut ConsoleSink) -> bool {
        if self.pending.take().is_none() {
            tracing::warn!("input channel fulfilled with no pending request");
            return false;
        }
        console.append(format!("> {}", echo), Origin::UserEcho);
        tracing::debug!("input fulfilled: {:?}", reply);
        self.reply = Some(reply);
        true
    }

    /// Take the reply, clearing the channel for the next request
    pub fn take_reply(&mut self) -> Option<Reply> {
        self.reply.take()
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.prompt.as_str())
    }

    /// Drop any request or reply left over from an aborted run
    pub fn reset(&mut self) {
        self.pending = None;
        self.reply = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_writes_prompt_and_waits() {
        let mut console = ConsoleSink::new();
        let mut channel = InputChannel::new();
        channel.request("Name?", &mut console);
        assert!(channel.is_waiting());
        assert_eq!(channel.prompt(), Some("Name?"));
        assert_eq!(console.entries()[0].text, "Name?");
        assert_eq!(console.entries()[0].origin, Origin::ProgramOutput);
    }

    #[test]
    fn test_empty_prompt_writes_nothing() {
        let mut console = ConsoleSink::new();
        let mut channel = InputChannel::new();
        channel.request("", &mut console);
        assert!(console.is_empty());
        assert!(channel.is_waiting());
    }

    #[test]
    fn test_submit_echoes_and_fulfils_once() {
        let mut console = ConsoleSink::new();
        let mut channel = InputChannel::new();
        channel.request("Q", &mut console);
        assert!(channel.submit("Bob", &mut console));
        assert!(!channel.submit("again", &mut console));
        assert_eq!(console.entries()[1].text, "> Bob");
        assert_eq!(console.entries()[1].origin, Origin::UserEcho);
        assert_eq!(channel.take_reply(), Some(Reply::Value("Bob".into())));
        assert_eq!(channel.take_reply(), None);
        assert!(!channel.is_waiting());
    }

    #[test]
    fn test_stop_matches_empty_submission() {
        let mut stopped = ConsoleSink::new();
        let mut channel = InputChannel::new();
        channel.request("Q", &mut stopped);
        channel.stop(&mut stopped);
        let reply = channel.take_reply().expect("Should have reply");
        assert_eq!(reply, Reply::Stopped);
        assert_eq!(reply.into_text(), "");

        let mut submitted = ConsoleSink::new();
        channel.request("Q", &mut submitted);
        channel.submit("", &mut submitted);
        assert_eq!(stopped.entries(), submitted.entries());
    }

    #[test]
    fn test_stop_without_request_is_ignored() {
        let mut console = ConsoleSink::new();
        let mut channel = InputChannel::new();
        assert!(!channel.stop(&mut console));
        assert!(console.is_empty());
    }

    #[test]
    #[should_panic(expected = "outstanding")]
    fn test_second_request_panics() {
        let mut console = ConsoleSink::new();
        let mut channel = InputChannel::new();
        channel.request("first", &mut console);
        channel.request("second", &mut console);
    }
}
