//! Progress notifications for a batch: `{current, total}` after each item.

use serde::Serialize;
use std::cell::Cell;
use thiserror::Error;

/// Items settled so far out of the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub current: usize,
    pub total: usize,
}

/// A progress notification could not be delivered (receiver gone, buffer full).
#[derive(Debug, Error)]
#[error("progress channel unavailable: {reason}")]
pub struct ChannelUnavailable {
    pub reason: String,
}

impl ChannelUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Destination for progress events. Delivery is best effort: the archiver
/// logs a failed send and carries on.
pub trait ProgressSink {
    fn send(&self, event: ProgressEvent) -> Result<(), ChannelUnavailable>;
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn send(&self, _event: ProgressEvent) -> Result<(), ChannelUnavailable> {
        Ok(())
    }
}

impl ProgressSink for tokio::sync::mpsc::Sender<ProgressEvent> {
    fn send(&self, event: ProgressEvent) -> Result<(), ChannelUnavailable> {
        self.try_send(event)
            .map_err(|e| ChannelUnavailable::new(e.to_string()))
    }
}

impl ProgressSink for std::sync::mpsc::Sender<ProgressEvent> {
    fn send(&self, event: ProgressEvent) -> Result<(), ChannelUnavailable> {
        std::sync::mpsc::Sender::send(self, event)
            .map_err(|e| ChannelUnavailable::new(e.to_string()))
    }
}

impl<T: ProgressSink> ProgressSink for Option<T> {
    fn send(&self, event: ProgressEvent) -> Result<(), ChannelUnavailable> {
        match self {
            Some(sink) => sink.send(event),
            None => Ok(()),
        }
    }
}

/// Emits events for one batch and swallows delivery failures.
pub(crate) struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
    total: usize,
    warned: Cell<bool>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, total: usize) -> Self {
        Self {
            sink,
            total,
            warned: Cell::new(false),
        }
    }

    pub(crate) fn emit(&self, current: usize) {
        let event = ProgressEvent {
            current,
            total: self.total,
        };
        if let Err(e) = self.sink.send(event) {
            // Only the first failure per batch is a warning.
            if self.warned.replace(true) {
                tracing::debug!(current, total = self.total, "{}", e);
            } else {
                tracing::warn!(current, total = self.total, "{}", e);
            }
        }
    }
}
