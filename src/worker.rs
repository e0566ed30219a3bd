//! Background conversion worker: exactly one thread, processing files
//! strictly in list order and emitting [`WorkerEvent`]s over a channel.
//!
//! Cancellation is cooperative and coarse: the keep-running flag is checked
//! between files only, so an in-flight ingestion always runs to completion
//! or failure first.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, channel},
    },
    thread::{self, JoinHandle},
};

use log::Level;

use crate::{
    config::Config,
    events::{ChannelSink, EventSink, WorkerEvent},
    ingest,
};

pub struct WorkerHandle {
    pub events: Receiver<WorkerEvent>,
    keep_running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Ask the worker to stop after the file currently in flight.
    pub fn cancel(&self) {
        self.keep_running.store(false, Ordering::Relaxed);
    }

    pub fn join(self) {
        let _ = self.handle.join();
    }
}

/// Spawn the worker over `files`. Events arrive on the returned handle's
/// receiver; the worker never blocks waiting on the consumer.
pub fn spawn(files: Vec<PathBuf>, config: Config) -> WorkerHandle {
    spawn_with_flag(files, config, Arc::new(AtomicBool::new(true)))
}

/// Like [`spawn`], with a caller-owned keep-running flag (the interactive
/// shell owns the flag in the original deployment).
pub fn spawn_with_flag(
    files: Vec<PathBuf>,
    config: Config,
    keep_running: Arc<AtomicBool>,
) -> WorkerHandle {
    let (sender, events) = channel();
    let flag = Arc::clone(&keep_running);

    let handle = thread::spawn(move || {
        let sink = ChannelSink::new(sender);
        let total = files.len();
        let mut processed = 0usize;
        let mut failed = 0usize;

        for (index, path) in files.iter().enumerate() {
            if !flag.load(Ordering::Relaxed) {
                sink.send(WorkerEvent::Failed(format!(
                    "conversion cancelled after {processed} of {total} file(s)"
                )));
                return;
            }
            match ingest::ingest_file(&config, path, &sink) {
                Ok(_) => processed += 1,
                Err(err) => {
                    failed += 1;
                    sink.log(Level::Error, &format!("{}: {err}", path.display()));
                }
            }
            let percent = ((index + 1) * 100 / total.max(1)) as u8;
            sink.progress(percent);
        }
        sink.send(WorkerEvent::Done { processed, failed });
    });

    WorkerHandle {
        events,
        keep_running,
        handle,
    }
}
