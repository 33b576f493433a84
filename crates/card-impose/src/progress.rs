//! Progress reporting
//!
//! The engine reports a percentage and a message through a plain callback.
//! How it is displayed (progress bar, log line, nothing) is up to the caller.

use crate::constants::{COMPLETE_PROGRESS, PREPROCESS_PROGRESS_END, SAVING_PROGRESS};

/// Receiver of progress updates
pub trait ProgressSink {
    /// `percent` is in `0.0..=100.0`
    fn report(&mut self, percent: f32, message: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(f32, &str),
{
    fn report(&mut self, percent: f32, message: &str) {
        self(percent, message)
    }
}

/// Sink that discards every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: f32, _message: &str) {}
}

/// Maps pipeline milestones onto the 0-100 range and keeps the reported
/// sequence non-decreasing.
pub struct Progress<'a> {
    sink: &'a mut (dyn ProgressSink + Send),
    last: f32,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a mut (dyn ProgressSink + Send)) -> Self {
        Self { sink, last: 0.0 }
    }

    /// Last percentage delivered to the sink
    pub fn last(&self) -> f32 {
        self.last
    }

    /// Report a raw percentage, clamped to the running maximum
    pub fn report(&mut self, percent: f32, message: &str) {
        let percent = percent.clamp(0.0, COMPLETE_PROGRESS).max(self.last);
        self.last = percent;
        self.sink.report(percent, message);
    }

    pub fn started(&mut self, total_images: usize) {
        self.report(0.0, &format!("Processing {} images...", total_images));
    }

    pub fn image_done(&mut self, done: usize, total: usize) {
        let percent = fraction(done, total) * PREPROCESS_PROGRESS_END;
        self.report(percent, &format!("Processed {}/{} images", done, total));
    }

    pub fn page_done(&mut self, done: usize, total: usize) {
        let span = SAVING_PROGRESS - PREPROCESS_PROGRESS_END;
        let percent = PREPROCESS_PROGRESS_END + fraction(done, total) * span;
        self.report(percent, &format!("Building PDF: page {}/{}", done, total));
    }

    pub fn saving(&mut self) {
        self.report(SAVING_PROGRESS, "Saving PDF...");
    }

    pub fn complete(&mut self) {
        self.report(COMPLETE_PROGRESS, "Done!");
    }
}

fn fraction(done: usize, total: usize) -> f32 {
    if total == 0 {
        1.0
    } else {
        (done.min(total)) as f32 / total as f32
    }
}
