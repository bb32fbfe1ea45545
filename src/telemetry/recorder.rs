use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

pub const MAX_EVENTS: usize = 10_000;

/// Ring buffer of turn events. Counters in a snapshot cover the retained window only.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
    limit: usize,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_limit(MAX_EVENTS)
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            buffer: VecDeque::with_capacity(limit.min(MAX_EVENTS)),
            limit,
        }
    }

    /// Appends, evicting the oldest event once the limit is reached.
    pub fn record(&mut self, event: TelemetryEvent) {
        while self.buffer.len() >= self.limit {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::event::DispatchOutcome;

    #[test]
    fn test_buffer_is_bounded() {
        let mut recorder = TelemetryRecorder::new();
        for _ in 0..(MAX_EVENTS + 5) {
            recorder.record(TelemetryEvent::Dispatch(DispatchOutcome::Succeeded));
        }
        assert_eq!(recorder.len(), MAX_EVENTS);
    }

    #[test]
    fn test_snapshot_covers_retained_window() {
        let mut recorder = TelemetryRecorder::with_limit(3);
        recorder.record(TelemetryEvent::Dispatch(DispatchOutcome::Failed));
        for _ in 0..3 {
            recorder.record(TelemetryEvent::Dispatch(DispatchOutcome::Succeeded));
        }
        let snap = recorder.snapshot();
        assert_eq!(snap.dispatch.failed, 0);
        assert_eq!(snap.dispatch.succeeded, 3);

        recorder.clear();
        assert!(recorder.is_empty());
    }
}
