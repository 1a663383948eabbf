use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::store::{CatalogStore, LedgerStore};

use super::job::PriceCorrectionJob;

/// Config for the background price correction runner.
#[derive(Debug, Clone)]
pub struct PriceCorrectionRunner {
    pub interval: Duration,
}

impl Default for PriceCorrectionRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Handle for the running correction thread (shutdown + trigger hook).
#[derive(Debug)]
pub struct PriceCorrectionRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    runs: Arc<AtomicU64>,
    join: Option<thread::JoinHandle<()>>,
}

impl PriceCorrectionRunnerHandle {
    /// Request an extra pass. Triggers are coalesced: if one is already
    /// pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Completed passes since spawn.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Stop the runner and wait for the current pass to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl PriceCorrectionRunner {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            interval: config.correction_interval,
        }
    }

    /// Spawn the runner thread.
    ///
    /// - Schedule: one pass on startup, then every `interval`
    /// - Trigger: `handle.trigger()` requests an extra pass
    /// - Failures: counted and logged by the job; never stop the loop
    pub fn spawn<C, L>(
        &self,
        name: &'static str,
        job: Arc<PriceCorrectionJob<C, L>>,
        clock: Arc<dyn Clock>,
    ) -> io::Result<PriceCorrectionRunnerHandle>
    where
        C: CatalogStore + 'static,
        L: LedgerStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);
        let runs = Arc::new(AtomicU64::new(0));

        let interval = self.interval;
        let counter = runs.clone();
        let join = thread::Builder::new().name(name.to_string()).spawn(move || {
            runner_loop(name, interval, shutdown_rx, trigger_rx, job, clock, counter)
        })?;

        Ok(PriceCorrectionRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            runs,
            join: Some(join),
        })
    }
}

const POLL_CAP: Duration = Duration::from_millis(250);

/// First deadline after `now` on the `interval` grid anchored at `due`.
/// Missed deadlines are skipped rather than replayed.
fn next_deadline(due: Instant, now: Instant, interval: Duration) -> Instant {
    if interval.is_zero() {
        return now;
    }
    let mut next = due + interval;
    while next <= now {
        next += interval;
    }
    next
}

fn runner_loop<C, L>(
    name: &'static str,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    job: Arc<PriceCorrectionJob<C, L>>,
    clock: Arc<dyn Clock>,
    runs: Arc<AtomicU64>,
) where
    C: CatalogStore + 'static,
    L: LedgerStore + 'static,
{
    info!(runner = name, interval_secs = interval.as_secs(), "price correction runner started");

    let mut due = Instant::now();
    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Instant::now();
        let mut run = now >= due;
        if run {
            due = next_deadline(due, now, interval);
        } else {
            // Wake early for shutdown checks.
            let wait = due.saturating_duration_since(now).min(POLL_CAP);
            match trigger_rx.recv_timeout(wait) {
                Ok(()) => run = true,
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        if !run {
            continue;
        }
        // Triggers queued during the previous pass fold into this one.
        while trigger_rx.try_recv().is_ok() {}

        let summary = job.run_at(clock.now());
        runs.fetch_add(1, Ordering::SeqCst);
        info!(
            runner = name,
            updated = summary.updated,
            failed = summary.failed,
            "price correction tick"
        );
    }

    info!(runner = name, "price correction runner stopped");
}
