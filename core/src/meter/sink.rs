use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Text produced by the meter for a display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeterOutput {
    /// Summary of a completed fight, sent as a chat-style message.
    Report { sender: String, message: String },
    /// Live snapshot of all open fights, one line per fight.
    Overlay { message: String },
}

/// Receives formatted meter output. Knows nothing about fights.
pub trait DisplaySink {
    fn report(&mut self, sender: &str, message: &str);

    fn overlay(&mut self, message: &str);

    fn deliver(&mut self, output: &MeterOutput) {
        match output {
            MeterOutput::Report { sender, message } => self.report(sender, message),
            MeterOutput::Overlay { message } => self.overlay(message),
        }
    }
}

/// Writes reports as `[sender] message` lines and overlays as indented blocks.
pub struct StdoutSink<W: Write> {
    out: W,
    show_overlay: bool,
}

impl StdoutSink<std::io::Stdout> {
    pub fn stdout(show_overlay: bool) -> Self {
        Self::new(std::io::stdout(), show_overlay)
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn new(out: W, show_overlay: bool) -> Self {
        Self { out, show_overlay }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!(error = %e, "failed to write meter output");
        }
    }
}

impl<W: Write> DisplaySink for StdoutSink<W> {
    fn report(&mut self, sender: &str, message: &str) {
        self.write_line(&format!("[{sender}] {message}"));
    }

    fn overlay(&mut self, message: &str) {
        if !self.show_overlay || message.is_empty() {
            return;
        }
        for line in message.lines() {
            self.write_line(&format!("  | {line}"));
        }
    }
}
