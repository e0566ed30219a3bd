//! Event reporting for the ingestion pipeline.
//!
//! Components report through an [`EventSink`] passed in by the caller, so
//! the console commands and the background worker can each supply their own
//! sink: [`ConsoleSink`] forwards to the `log` facade, [`ChannelSink`]
//! forwards [`WorkerEvent`]s over an mpsc channel to whatever drives the
//! worker (the CLI here; an interactive shell in the original deployment).

use std::sync::mpsc::Sender;

use log::Level;

pub trait EventSink {
    fn log(&self, level: Level, message: &str);
    fn progress(&self, percent: u8);
}

/// Sink for foreground commands: log lines go to the logger, progress is
/// dropped (the console already sees per-file log lines).
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(level, "{message}");
    }

    fn progress(&self, _percent: u8) {}
}

/// Events the worker thread emits to its driver. Strictly one-directional;
/// the worker never waits on the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Progress(u8),
    Log(Level, String),
    Done { processed: usize, failed: usize },
    Failed(String),
}

pub struct ChannelSink {
    sender: Sender<WorkerEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<WorkerEvent>) -> Self {
        Self { sender }
    }

    pub fn send(&self, event: WorkerEvent) {
        // A closed receiver means the driver went away; nothing useful to do.
        let _ = self.sender.send(event);
    }
}

impl EventSink for ChannelSink {
    fn log(&self, level: Level, message: &str) {
        self.send(WorkerEvent::Log(level, message.to_string()));
    }

    fn progress(&self, percent: u8) {
        self.send(WorkerEvent::Progress(percent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn channel_sink_forwards_events_in_order() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.log(Level::Info, "reading bill.xlsx");
        sink.progress(50);

        assert_eq!(
            rx.recv().unwrap(),
            WorkerEvent::Log(Level::Info, "reading bill.xlsx".to_string())
        );
        assert_eq!(rx.recv().unwrap(), WorkerEvent::Progress(50));
    }

    #[test]
    fn channel_sink_survives_a_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = ChannelSink::new(tx);
        sink.log(Level::Warn, "nobody listening");
        sink.progress(100);
    }
}
