//! Progress message sinks.
//!
//! The orchestrator narrates a run through a [`ProgressSink`]. The default
//! sink writes to stdout; runs with messages disabled get the null sink.
//! Tests install their own sink to capture the narration.

/// Receives one-line progress messages during a run.
pub trait ProgressSink: Send + Sync {
    fn message(&self, text: &str);
}

/// Prints each message to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ProgressSink for StdoutSink {
    fn message(&self, text: &str) {
        println!("{}", text);
    }
}

/// Discards every message.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn message(&self, _text: &str) {}
}
