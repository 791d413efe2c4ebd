// src/main.rs
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;
use anyhow::{Context, Result};
use emg_stream::signal::{BatchSource, DeviceStream, SimulatedSource, StreamConfig};
use emg_stream::engine::{poll_worker, WorkerStatus};
use emg_stream::{spawn_ingest, DataRecorder, StreamEvent};
use log::{info, warn};
const DEMO_RATE_HZ: f64 = 500.0;
const SAMPLES_PER_BATCH: usize = 10;
const DEMO_BATCHES: usize = 250;
const RENDER_POINTS: usize = 200;
fn load_config() -> Result<StreamConfig> {
    match std::env::args().nth(1) {
        Some(path) => StreamConfig::load(&path).with_context(|| format!("loading config {path}")),
        None => Ok(StreamConfig::default()),
    }
}
fn log_event(event: &StreamEvent) {
    match event {
        StreamEvent::Log(msg) => info!("{msg}"),
        StreamEvent::Dropped { group, reason } => warn!("dropped `{group}` batch: {reason}"),
        StreamEvent::Power { group, reading } => {
            info!("{group} rms: {:?}", reading.rms);
        }
        StreamEvent::Stopped(stats) => info!("ingest reported {} batch(es)", stats.accepted),
    }
}
fn main() -> Result<()> {
    env_logger::init();
    let config = load_config()?;
    let device = DeviceStream::new(&config).context("device configuration rejected")?;
    let readers = config
        .groups
        .iter()
        .map(|g| device.reader(&g.name).map(|r| (g.name.clone(), r)))
        .collect::<Result<Vec<_>, _>>()?;
    let widest = config.groups.iter().map(|g| g.channels).max().unwrap_or(0);
    let recorder = match &config.record_path {
        Some(path) => Some(
            DataRecorder::create(path, widest)
                .with_context(|| format!("creating recording {}", path.display()))?,
        ),
        None => None,
    };
    let (tx_batch, rx_batch) = channel();
    let (tx_event, rx_event) = channel();
    let worker = spawn_ingest(device, rx_batch, tx_event, recorder);
    // Producer: stands in for the sensor notification callback.
    let groups: Vec<_> = config.groups.iter().map(|g| (g.name.clone(), g.channels)).collect();
    let producer = thread::spawn(move || {
        let period = Duration::from_secs_f64(SAMPLES_PER_BATCH as f64 / DEMO_RATE_HZ);
        let mut sources: Vec<SimulatedSource> = groups
            .iter()
            .enumerate()
            .map(|(i, (name, channels))| {
                SimulatedSource::new(name.clone(), *channels, DEMO_RATE_HZ, SAMPLES_PER_BATCH)
                    .with_limit(DEMO_BATCHES)
                    .with_seed(i as u64)
            })
            .collect();
        loop {
            let mut produced = false;
            for source in &mut sources {
                if let Ok(Some(batch)) = source.next_batch() {
                    produced = true;
                    if tx_batch.send(batch).is_err() {
                        return;
                    }
                }
            }
            if !produced {
                return;
            }
            thread::sleep(period);
        }
    });
    // Render side: snapshot at its own cadence until the worker stops.
    loop {
        thread::sleep(Duration::from_millis(250));
        let status = poll_worker(&worker, &rx_event, log_event);
        for (name, reader) in &readers {
            let view = reader.snapshot().decimate(RENDER_POINTS);
            if let Some((t, values)) = view.latest() {
                info!(
                    "{name}: {} point(s) over {:.0} ms, latest t={t:.0} {:?}",
                    view.len(),
                    t - view.timestamps[0],
                    values
                );
            }
        }
        match status {
            WorkerStatus::Running => {}
            WorkerStatus::Stopped(_) => break,
            WorkerStatus::Exited => {
                warn!("ingest worker exited without reporting");
                break;
            }
        }
    }
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;
    let stats = worker
        .join()
        .map_err(|_| anyhow::anyhow!("ingest thread panicked"))?;
    info!(
        "done: {} batch(es), {} sample(s), {} dropped",
        stats.accepted, stats.samples, stats.dropped
    );
    Ok(())
}
