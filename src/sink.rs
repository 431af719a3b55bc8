//! Progress and log reporting for the extraction pass.
//!
//! The writer only knows about [`ProgressSink`]. Sinks may be called from a
//! worker thread, so implementations must be `Send + Sync`; consumers that
//! own a single UI thread should use [`ChannelSink`] and apply the events
//! where they live.

use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub trait ProgressSink: Send + Sync {
    /// Structured progress: status text and cumulative percentage (0-100).
    fn update(&self, message: &str, percent: u8);

    /// Free-text log line.
    fn log(&self, message: &str);
}

/// A single sink call captured as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkEvent {
    Progress { message: String, percent: u8 },
    Log { message: String },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&self, _message: &str, _percent: u8) {}

    fn log(&self, _message: &str) {}
}

/// Records every call in order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    pub fn percentages(&self) -> Vec<u8> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Progress { percent, .. } => Some(*percent),
                SinkEvent::Log { .. } => None,
            })
            .collect()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Log { message } => Some(message.clone()),
                SinkEvent::Progress { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        // A poisoned lock still holds every event recorded before the panic.
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for CollectingSink {
    fn update(&self, message: &str, percent: u8) {
        self.push(SinkEvent::Progress {
            message: message.to_string(),
            percent,
        });
    }

    fn log(&self, message: &str) {
        self.push(SinkEvent::Log {
            message: message.to_string(),
        });
    }
}

/// Forwards sink calls to whoever holds the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<SinkEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: SinkEvent) {
        // The receiver going away means nobody is watching anymore; the
        // pass itself carries on.
        let _ = self.sender.send(event);
    }
}

impl ProgressSink for ChannelSink {
    fn update(&self, message: &str, percent: u8) {
        self.send(SinkEvent::Progress {
            message: message.to_string(),
            percent,
        });
    }

    fn log(&self, message: &str) {
        self.send(SinkEvent::Log {
            message: message.to_string(),
        });
    }
}
