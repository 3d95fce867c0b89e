//! Shared test harness for integration tests.
//!
//! Provides [`ScriptedConverter`], a [`Converter`] whose result per source is
//! fixed up front, and helpers to build a [`BatchRunner`] over a temp dir.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gifloop::convert::Converter;
use gifloop::runner::{BatchRunner, RunnerSettings};
use gifloop_av::ClipRequest;

/// What the fake converter does for a given source.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Write these bytes to the temp path and succeed.
    Succeed(Vec<u8>),
    /// Write a partial file, then fail like a dropped stream.
    FailPartial,
    /// Fail without writing anything.
    Fail,
    /// Report success without producing a file.
    SucceedEmpty,
}

#[derive(Default)]
pub struct ScriptedConverter {
    behaviors: Mutex<HashMap<String, Behavior>>,
    pub calls: Mutex<Vec<ClipRequest>>,
    /// Whether the temp path already existed when each call started.
    pub temp_existed: Mutex<Vec<bool>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    delay: Duration,
    stop_after: Mutex<Option<(usize, Arc<AtomicBool>)>>,
}

impl ScriptedConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each conversion open for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Raise `stop` once `calls` conversions have finished.
    pub fn stop_after(&self, calls: usize, stop: Arc<AtomicBool>) {
        *self.stop_after.lock().unwrap() = Some((calls, stop));
    }

    pub fn set(&self, source: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(source.to_string(), behavior);
    }

    pub fn sources_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.source.clone())
            .collect()
    }
}

#[async_trait]
impl Converter for ScriptedConverter {
    async fn convert(&self, request: &ClipRequest) -> gifloop_av::Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().unwrap().push(request.clone());
        self.temp_existed
            .lock()
            .unwrap()
            .push(request.output.exists());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(&request.source)
            .cloned()
            .unwrap_or_else(|| Behavior::Succeed(request.source.as_bytes().to_vec()));

        let result: gifloop_av::Result<()> = match behavior {
            Behavior::Succeed(bytes) => std::fs::write(&request.output, bytes).map_err(Into::into),
            Behavior::FailPartial => match std::fs::write(&request.output, b"GIF8") {
                Ok(()) => Err(gifloop_av::Error::tool_failed("ffmpeg", "connection reset")),
                Err(e) => Err(e.into()),
            },
            Behavior::Fail => Err(gifloop_av::Error::tool_failed("ffmpeg", "404 Not Found")),
            Behavior::SucceedEmpty => Ok(()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let stop_after = self.stop_after.lock().unwrap().clone();
        if let Some((limit, stop)) = stop_after {
            if self.calls.lock().unwrap().len() >= limit {
                stop.store(true, Ordering::Relaxed);
            }
        }

        result
    }
}

pub fn settings(dir: &Path, sources: &[&str]) -> RunnerSettings {
    RunnerSettings {
        output_dir: dir.to_path_buf(),
        prefix: "item".to_string(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
        duration_secs: 20,
        cycle_delay: Duration::ZERO,
    }
}

pub fn runner(dir: &Path, sources: &[&str], converter: Arc<ScriptedConverter>) -> BatchRunner {
    BatchRunner::new(settings(dir, sources), converter)
}

/// Sorted file names in `dir`.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
