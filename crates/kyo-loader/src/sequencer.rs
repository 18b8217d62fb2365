use kyo_core::entities::{LoadEvent, PendingEvent};

use crate::sink::EventSink;

/// Sole owner of the sequence counter and the append-only event log.
///
/// Producers hand over [`PendingEvent`]s. The sequencer stamps them with the
/// next number, appends them, and fans them out to sinks, so numbering is
/// gap-free and every consumer sees the same order.
pub struct Sequencer {
    next: u64,
    log: Vec<LoadEvent>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Sequencer {
    #[must_use]
    pub fn new(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self {
            next: 0,
            log: Vec::new(),
            sinks,
        }
    }

    /// Stamp, record, and deliver one event. Returns its sequence number.
    pub fn emit(&mut self, pending: PendingEvent) -> u64 {
        let sequence_number = self.next;
        self.next += 1;
        let event = pending.stamp(sequence_number);
        for sink in &mut self.sinks {
            sink.accept(&event);
        }
        self.log.push(event);
        sequence_number
    }

    #[must_use]
    pub fn events(&self) -> &[LoadEvent] {
        &self.log
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.next
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.next == 0
    }

    /// Close every sink and hand back the log.
    #[must_use]
    pub fn finish(mut self) -> Vec<LoadEvent> {
        for sink in &mut self.sinks {
            sink.finish();
        }
        self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;
    use kyo_core::enums::LoadEventType;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_are_gap_free_and_shared_with_sinks() {
        let sink = VecSink::new();
        let mut sequencer = Sequencer::new(vec![Box::new(sink.clone())]);
        assert!(sequencer.is_empty());

        for kind in [
            LoadEventType::StartedWalk,
            LoadEventType::FoundDir,
            LoadEventType::FinishedWalk,
        ] {
            sequencer.emit(PendingEvent::new(kind, "/p"));
        }
        assert_eq!(sequencer.len(), 3);

        let log = sequencer.finish();
        let numbers: Vec<u64> = log.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(sink.snapshot(), log);
    }
}
