//! Batch notifications: progress after each file, a failure record per failed
//! file, and the final tally.

use serde::Serialize;
use shared_utils::{BatchResult, ProgressEvent, VidGifError};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// ffmpeg
    Transcode,
    /// gifski
    Encode,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Transcode => f.write_str("transcode"),
            FailureStage::Encode => f.write_str("encode"),
        }
    }
}

/// One failed input, with whatever the failing tool printed.
#[derive(Debug)]
pub struct FailureEvent {
    pub input: PathBuf,
    pub stage: FailureStage,
    pub error: VidGifError,
    pub stdout: String,
    pub stderr: String,
}

type Listener<T> = Box<dyn FnMut(&T)>;

/// Registered listeners, called in registration order.
#[derive(Default)]
pub struct EventHub {
    progress: Vec<Listener<ProgressEvent>>,
    error: Vec<Listener<FailureEvent>>,
    end: Vec<Listener<BatchResult>>,
}

impl EventHub {
    pub fn on_progress(&mut self, listener: impl FnMut(&ProgressEvent) + 'static) {
        self.progress.push(Box::new(listener));
    }

    pub fn on_error(&mut self, listener: impl FnMut(&FailureEvent) + 'static) {
        self.error.push(Box::new(listener));
    }

    pub fn on_end(&mut self, listener: impl FnMut(&BatchResult) + 'static) {
        self.end.push(Box::new(listener));
    }

    pub fn emit_progress(&mut self, event: &ProgressEvent) {
        for listener in &mut self.progress {
            listener(event);
        }
    }

    pub fn emit_error(&mut self, event: &FailureEvent) {
        for listener in &mut self.error {
            listener(event);
        }
    }

    pub fn emit_end(&mut self, result: &BatchResult) {
        for listener in &mut self.end {
            listener(result);
        }
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("progress", &self.progress.len())
            .field("error", &self.error.len())
            .field("end", &self.end.len())
            .finish()
    }
}
