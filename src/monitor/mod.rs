//! Store Health Monitor
//!
//! A background task that samples store statistics on a fixed interval
//! and emits the difference from the previous sample.
//!
//! States: `Idle -> Sampling -> (Sampling | Done)`.
//!
//! - Tick 1 samples immediately and only stores the sample
//! - Every later tick waits the interval, samples, emits `sample - previous`
//!   and keeps the new sample as previous
//! - Once the tick counter passes `max_ticks` the monitor reports
//!   `TickBoundReached` on its completion channel and the task returns
//! - The shutdown signal is checked at every tick boundary and while
//!   waiting; it ends the monitor with `Cancelled`
//! - A failed sample ends the monitor with `SampleFailed`

mod errors;

pub use errors::{MonitorError, MonitorExit, MonitorResult};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::observability::{log_event_at, log_event_with_fields, record_type, Event, Logger, RecordSink};
use crate::store::{ChainStore, StatsSample, StoreError, StoreResult};

/// Anything that can produce a statistics sample.
///
/// Sampling may block on file I/O; the monitor runs it off the async
/// worker threads.
pub trait StatsSource: Send + Sync + 'static {
    fn sample(&self) -> StoreResult<StatsSample>;
}

impl StatsSource for ChainStore {
    fn sample(&self) -> StoreResult<StatsSample> {
        self.stats()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Wait between ticks
    pub interval: Duration,
    /// Tick bound; `None` runs until cancelled
    pub max_ticks: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_ticks: Some(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Sampling,
    Done,
}

pub struct HealthMonitor<S: StatsSource> {
    source: Arc<S>,
    sink: Arc<dyn RecordSink>,
    config: MonitorConfig,
    state: MonitorState,
    ticks: u64,
    deltas: u64,
    previous: Option<StatsSample>,
}

impl<S: StatsSource> HealthMonitor<S> {
    pub fn new(source: Arc<S>, sink: Arc<dyn RecordSink>, config: MonitorConfig) -> Self {
        Self {
            source,
            sink,
            config,
            state: MonitorState::Idle,
            ticks: 0,
            deltas: 0,
            previous: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn deltas_emitted(&self) -> u64 {
        self.deltas
    }

    /// Run one tick. Returns `Some(exit)` once the monitor has stopped.
    pub async fn tick(&mut self, shutdown: &mut watch::Receiver<bool>) -> Option<MonitorExit> {
        if self.state == MonitorState::Done {
            return None;
        }
        self.state = MonitorState::Sampling;
        self.ticks += 1;

        if let Some(bound) = self.config.max_ticks {
            if self.ticks > bound {
                return Some(self.finish(MonitorExit::TickBoundReached {
                    ticks: self.ticks,
                    deltas: self.deltas,
                }));
            }
        }

        if *shutdown.borrow() {
            return Some(self.cancelled());
        }

        if self.ticks > 1 && wait_or_cancel(self.config.interval, shutdown).await {
            return Some(self.cancelled());
        }

        let sample = match self.take_sample().await {
            Ok(sample) => sample,
            Err(error) => {
                return Some(self.finish(MonitorExit::SampleFailed {
                    tick: self.ticks,
                    error,
                }));
            }
        };

        if let Some(previous) = &self.previous {
            self.emit_delta(&sample, previous);
            self.deltas += 1;
        }
        self.previous = Some(sample);
        None
    }

    /// Tick until the monitor stops.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> MonitorExit {
        let interval_ms = self.config.interval.as_millis().to_string();
        let max_ticks = self
            .config
            .max_ticks
            .map(|b| b.to_string())
            .unwrap_or_else(|| "unbounded".to_string());
        log_event_with_fields(
            Event::MonitorStart,
            &[
                ("interval_ms", interval_ms.as_str()),
                ("max_ticks", max_ticks.as_str()),
            ],
        );

        loop {
            if let Some(exit) = self.tick(&mut shutdown).await {
                return exit;
            }
        }
    }

    /// Run on a tokio task. The task reports on the returned handle's
    /// completion channel and then returns.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> MonitorHandle {
        let (done_tx, done_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let exit = self.run(shutdown).await;
            let _ = done_tx.send(exit);
        });
        MonitorHandle {
            completion: done_rx,
            task,
        }
    }

    async fn take_sample(&self) -> StoreResult<StatsSample> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.sample())
            .await
            .unwrap_or_else(|e| Err(StoreError::IoFailure(format!("sampler task failed: {}", e))))
    }

    fn emit_delta(&self, sample: &StatsSample, previous: &StatsSample) {
        let delta = sample.delta(previous);
        let result = serde_json::to_value(&delta)
            .map_err(|e| e.to_string())
            .and_then(|mut fields| {
                if let Some(map) = fields.as_object_mut() {
                    map.insert("tick".to_string(), self.ticks.into());
                }
                self.sink
                    .emit(record_type::STATS_DELTA, fields)
                    .map_err(|e| e.to_string())
            });
        if let Err(reason) = result {
            Logger::error("STATS_EMIT_FAILED", &[("reason", reason.as_str())]);
        }
    }

    fn cancelled(&mut self) -> MonitorExit {
        self.finish(MonitorExit::Cancelled {
            ticks: self.ticks,
            deltas: self.deltas,
        })
    }

    fn finish(&mut self, exit: MonitorExit) -> MonitorExit {
        self.state = MonitorState::Done;
        self.previous = None;

        let ticks = self.ticks.to_string();
        let deltas = self.deltas.to_string();
        match &exit {
            MonitorExit::TickBoundReached { .. } => log_event_with_fields(
                Event::MonitorComplete,
                &[("ticks", ticks.as_str()), ("deltas", deltas.as_str())],
            ),
            MonitorExit::Cancelled { .. } => log_event_with_fields(
                Event::MonitorCancelled,
                &[("ticks", ticks.as_str()), ("deltas", deltas.as_str())],
            ),
            MonitorExit::SampleFailed { error, .. } => {
                let reason = error.to_string();
                log_event_at(
                    Event::MonitorSampleFailed,
                    error.severity(),
                    &[
                        ("tick", ticks.as_str()),
                        ("code", error.code()),
                        ("reason", reason.as_str()),
                    ],
                )
            }
        }
        exit
    }
}

/// Sleep for `interval` unless the shutdown signal fires first.
/// Returns true if cancelled.
async fn wait_or_cancel(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) => {
                    if *shutdown.borrow() {
                        return true;
                    }
                }
                // Sender gone: nobody can cancel any more, finish the wait.
                Err(_) => {
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}

/// Handle to a spawned monitor.
pub struct MonitorHandle {
    completion: oneshot::Receiver<MonitorExit>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Wait for the monitor to report how it stopped, then for its task
    /// to return.
    pub async fn wait(self) -> MonitorResult<MonitorExit> {
        let exit = self
            .completion
            .await
            .map_err(|_| MonitorError::CompletionDropped);
        self.task
            .await
            .map_err(|e| MonitorError::TaskFailed(e.to_string()))?;
        exit
    }
}
