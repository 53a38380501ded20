//! Progress reporting for the long-running pipeline stages.
//! Frontends pass a sink in; nothing here holds global state.

use std::sync::mpsc::Sender;

/// One discrete step of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// 0..=100
    pub percent: u8,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            message: message.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percent == 100
    }
}

pub trait ProgressSink {
    fn report(&mut self, event: ProgressEvent);
}

/// Discards every event.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _event: ProgressEvent) {}
}

/// Records events, mostly for tests.
impl ProgressSink for Vec<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Forwards events to another thread; a hung-up receiver is ignored.
impl ProgressSink for Sender<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Renders each event as a log line with a 50-slot bar.
pub struct LogProgress;

impl LogProgress {
    const WIDTH: usize = 50;

    pub fn bar(percent: u8) -> String {
        let filled = Self::WIDTH * percent as usize / 100;
        format!("|{}{}|", "█".repeat(filled), "-".repeat(Self::WIDTH - filled))
    }
}

impl ProgressSink for LogProgress {
    fn report(&mut self, event: ProgressEvent) {
        tracing::info!("{:.<40}{}", event.message, Self::bar(event.percent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn percent_is_clamped() {
        assert_eq!(ProgressEvent::new(250, "x").percent, 100);
        assert!(ProgressEvent::new(100, "done").is_complete());
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(LogProgress::bar(0).matches('█').count(), 0);
        assert_eq!(LogProgress::bar(40).matches('█').count(), 20);
        assert_eq!(LogProgress::bar(100).matches('-').count(), 0);
    }

    #[test]
    fn sender_sink_survives_dropped_receiver() {
        let (mut tx, rx) = channel();
        tx.report(ProgressEvent::new(10, "loading"));
        assert_eq!(rx.recv().unwrap().message, "loading");
        drop(rx);
        tx.report(ProgressEvent::new(20, "ignored"));
    }
}
