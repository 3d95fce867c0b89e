//! The batch runner.
//!
//! Walks the configured sources one at a time, converting each into its slot's
//! temp file and publishing successes. Each item moves
//! `Idle -> Converting -> {Published, Discarded}`; after the last slot the
//! pass restarts from slot 1 until stopped.

use crate::config::Config;
use crate::convert::Converter;
use crate::publish::{discard, publish};
use gifloop_av::ClipRequest;
use gifloop_common::{Artifact, Slot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Poll interval for the stop signal while waiting between passes.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Fixed inputs of the batch loop.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub sources: Vec<String>,
    pub duration_secs: u32,
    pub cycle_delay: Duration,
}

impl RunnerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output.dir.clone(),
            prefix: config.output.prefix.clone(),
            sources: config.batch.sources.clone(),
            duration_secs: config.batch.duration_secs,
            cycle_delay: Duration::from_secs(config.batch.cycle_delay_secs),
        }
    }
}

/// Lifecycle of one slot within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Converting,
    Published,
    Discarded,
}

impl std::fmt::Display for SlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotState::Idle => "idle",
            SlotState::Converting => "converting",
            SlotState::Published => "published",
            SlotState::Discarded => "discarded",
        };
        f.write_str(s)
    }
}

/// Outcome of one slot.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub slot: Slot,
    pub source: String,
    pub state: SlotState,
    /// Conversion failure, set when `state` is `Discarded`.
    pub error: Option<String>,
    /// Publish failure; the item still counts as published.
    pub publish_error: Option<String>,
}

/// Outcome of one full pass over the sources.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    pub pass: u64,
    pub items: Vec<ItemReport>,
}

impl PassReport {
    pub fn published(&self) -> usize {
        self.count(SlotState::Published)
    }

    pub fn discarded(&self) -> usize {
        self.count(SlotState::Discarded)
    }

    fn count(&self, state: SlotState) -> usize {
        self.items.iter().filter(|i| i.state == state).count()
    }
}

/// Serial convert-and-publish loop.
pub struct BatchRunner {
    settings: RunnerSettings,
    converter: Arc<dyn Converter>,
    artifacts: Vec<Artifact>,
    passes: u64,
    stop_signal: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(settings: RunnerSettings, converter: Arc<dyn Converter>) -> Self {
        let artifacts = Artifact::plan(
            &settings.output_dir,
            &settings.prefix,
            settings.sources.as_slice(),
        );
        Self {
            settings,
            converter,
            artifacts,
            passes: 0,
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the stop signal for external control.
    ///
    /// The signal is checked between items; a conversion already running is
    /// allowed to finish.
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Number of passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    fn stopped(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }

    /// Process every slot once, in order.
    ///
    /// Stops early, before the next item, once the stop signal is set; the
    /// report then holds only the items that ran.
    pub async fn run_pass(&mut self) -> PassReport {
        self.passes += 1;
        let mut report = PassReport {
            pass: self.passes,
            items: Vec::with_capacity(self.artifacts.len()),
        };

        for i in 0..self.artifacts.len() {
            if self.stopped() {
                debug!("Stop requested, ending pass {} early", report.pass);
                break;
            }
            report.items.push(self.process_item(i).await);
        }

        report
    }

    /// Run passes until the stop signal is set.
    pub async fn run(mut self) {
        info!(
            "Batch runner started: {} sources, {}s clips, output {:?}",
            self.artifacts.len(),
            self.settings.duration_secs,
            self.settings.output_dir
        );

        if self.artifacts.is_empty() {
            warn!("No sources configured, batch runner exiting");
            return;
        }

        while !self.stopped() {
            let report = self.run_pass().await;
            if report.items.len() < self.artifacts.len() {
                break;
            }

            info!(
                "Pass {} complete: {} published, {} discarded",
                report.pass,
                report.published(),
                report.discarded()
            );
            info!("Looping again...");

            if !self.pause().await {
                break;
            }
        }

        info!("Batch runner stopped after {} passes", self.passes);
    }

    /// Wait out the cycle delay. Returns false if stopped meanwhile.
    async fn pause(&self) -> bool {
        let mut remaining = self.settings.cycle_delay;
        if remaining.is_zero() {
            tokio::task::yield_now().await;
        }
        while !remaining.is_zero() {
            if self.stopped() {
                return false;
            }
            let step = remaining.min(STOP_POLL);
            tokio::time::sleep(step).await;
            remaining -= step;
        }
        !self.stopped()
    }

    async fn process_item(&self, index: usize) -> ItemReport {
        let artifact = &self.artifacts[index];
        let slot = artifact.slot;
        let paths = &artifact.paths;

        debug!("Slot {}: {} -> {}", slot, SlotState::Idle, SlotState::Converting);

        // Leftover from a crashed or killed attempt
        discard(&paths.temporary);

        info!("Processing slot {}: {}", slot, artifact.source);

        let request = ClipRequest::new(
            artifact.source.clone(),
            paths.temporary.clone(),
            self.settings.duration_secs,
        );

        match self.converter.convert(&request).await {
            Ok(()) => {
                let publish_error = match publish(&paths.temporary, &paths.final_path) {
                    Ok(()) => {
                        info!("Processed slot {}: {:?}", slot, paths.final_path);
                        None
                    }
                    Err(e) => {
                        warn!("Slot {} converted but not published: {}", slot, e);
                        discard(&paths.temporary);
                        Some(e.to_string())
                    }
                };

                debug!("Slot {}: {} -> {}", slot, SlotState::Converting, SlotState::Published);
                ItemReport {
                    slot,
                    source: artifact.source.clone(),
                    state: SlotState::Published,
                    error: None,
                    publish_error,
                }
            }
            Err(e) => {
                error!("Failed to convert slot {}: {}", slot, e);
                discard(&paths.temporary);

                debug!("Slot {}: {} -> {}", slot, SlotState::Converting, SlotState::Discarded);
                ItemReport {
                    slot,
                    source: artifact.source.clone(),
                    state: SlotState::Discarded,
                    error: Some(e.to_string()),
                    publish_error: None,
                }
            }
        }
    }
}

/// Raise `stop` and give the spawned [`BatchRunner::run`] task `grace` to
/// return. Returns false if the task had to be aborted.
///
/// Aborting drops the in-flight conversion future; the ffmpeg child is
/// spawned with `kill_on_drop`, so that also kills the process.
pub async fn stop_runner(stop: &AtomicBool, mut handle: JoinHandle<()>, grace: Duration) -> bool {
    stop.store(true, Ordering::Relaxed);
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(_) => true,
        Err(_) => {
            warn!("Conversion still running after {:?}, aborting it", grace);
            handle.abort();
            false
        }
    }
}
