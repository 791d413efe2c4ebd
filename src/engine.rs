// src/engine.rs
use std::collections::HashMap;
use std::io::Write;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use log::{info, warn};
use crate::recorder::DataRecorder;
use crate::signal::{DeviceStream, SampleBatch};
use crate::types::{IngestStats, StreamEvent};
/// Power readings go out once every this many accepted batches per group.
const POWER_EVERY: u64 = 5;
/// Starts the single writer for `device`. The worker drains `rx` until every
/// sender is gone, so dropping the producer side is the teardown path.
/// Malformed batches are logged, reported and skipped.
pub fn spawn_ingest<W>(
    mut device: DeviceStream,
    rx: Receiver<SampleBatch>,
    tx: Sender<StreamEvent>,
    mut recorder: Option<DataRecorder<W>>,
) -> JoinHandle<IngestStats>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        let mut stats = IngestStats::default();
        let mut accepted_per_group: HashMap<String, u64> = HashMap::new();
        tx.send(StreamEvent::Log(format!("ingest started for `{}`", device.name())))
            .ok();
        for batch in rx {
            match device.ingest(&batch) {
                Ok(ingested) => {
                    stats.accepted += 1;
                    stats.samples += batch.num_samples() as u64;
                    let failed = recorder
                        .as_mut()
                        .and_then(|rec| rec.write_batch(&ingested).err());
                    if let Some(err) = failed {
                        warn!("recorder disabled: {err}");
                        recorder = None;
                    }
                    let group_count = accepted_per_group.entry(batch.group.clone()).or_insert(0);
                    *group_count += 1;
                    if *group_count % POWER_EVERY == 0 {
                        if let Ok(Some(reading)) = device.power(&batch.group) {
                            tx.send(StreamEvent::Power {
                                group: batch.group.clone(),
                                reading,
                            })
                            .ok();
                        }
                    }
                }
                Err(err) => {
                    stats.dropped += 1;
                    warn!("{}: dropping batch for `{}`: {err}", device.name(), batch.group);
                    tx.send(StreamEvent::Dropped {
                        group: batch.group.clone(),
                        reason: err.to_string(),
                    })
                    .ok();
                }
            }
        }
        if let Some(rec) = recorder.take() {
            if let Err(err) = rec.finish() {
                warn!("failed to flush recording: {err}");
            }
        }
        info!(
            "ingest for `{}` stopped: {} accepted, {} dropped",
            device.name(),
            stats.accepted,
            stats.dropped
        );
        tx.send(StreamEvent::Stopped(stats)).ok();
        stats
    })
}
/// What the render side learned from one poll of the ingest worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerStatus {
    Running,
    Stopped(IngestStats),
    /// The thread is gone without reporting, e.g. it panicked.
    Exited,
}
/// Drains pending events into `on_event` and reports whether the worker is
/// still alive. Never blocks.
pub fn poll_worker<T>(
    worker: &JoinHandle<T>,
    rx: &Receiver<StreamEvent>,
    mut on_event: impl FnMut(&StreamEvent),
) -> WorkerStatus {
    // Sampled before draining so a final `Stopped` is never missed.
    let finished = worker.is_finished();
    let mut status = WorkerStatus::Running;
    for event in rx.try_iter() {
        if let StreamEvent::Stopped(stats) = event {
            status = WorkerStatus::Stopped(stats);
        }
        on_event(&event);
    }
    match status {
        WorkerStatus::Running if finished => WorkerStatus::Exited,
        other => other,
    }
}
