use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::runner::run::{ExperimentRun, Paradigm};
use crate::runner::state::{ResponseOutcome, RunnerPhase, TimerOutcome};
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub phase: RunnerPhase,
    pub trial_index: usize,
    pub trial_count: usize,
}

fn snapshot_of<P: Paradigm>(run: &ExperimentRun<P>) -> RunSnapshot {
    RunSnapshot {
        phase: run.phase(),
        trial_index: run.trial_index(),
        trial_count: run.trial_count(),
    }
}

/// Tokio's clock, so paused-time tests measure exact reaction times.
fn now() -> std::time::Instant {
    time::Instant::now().into_std()
}

/// Drives an [`ExperimentRun`] on real time.
///
/// One background task sleeps through each timed phase and advances the
/// run. Leaving the phase (`teardown` or drop) cancels the task so no
/// transition fires afterwards.
pub struct RunController<P: Paradigm> {
    run: Arc<Mutex<ExperimentRun<P>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    cancel_token: CancellationToken,
    snapshot_tx: Arc<watch::Sender<RunSnapshot>>,
}

impl<P> RunController<P>
where
    P: Paradigm + Send + 'static,
    P::Trial: Send + 'static,
    P::Response: Send + 'static,
{
    pub fn new(run: ExperimentRun<P>) -> Self {
        let (snapshot_tx, _) = watch::channel(snapshot_of(&run));
        Self {
            run: Arc::new(Mutex::new(run)),
            ticker: Arc::new(Mutex::new(None)),
            cancel_token: CancellationToken::new(),
            snapshot_tx: Arc::new(snapshot_tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn snapshot(&self) -> RunSnapshot {
        snapshot_of(&*self.run.lock().await)
    }

    pub async fn current_trial(&self) -> Option<P::Trial> {
        self.run.lock().await.current_trial().cloned()
    }

    pub async fn start(&self) {
        {
            let mut run = self.run.lock().await;
            run.start(now());
            log_info!("Run started with {} trials", run.trial_count());
            self.snapshot_tx.send_replace(snapshot_of(&run));
        }
        self.spawn_ticker().await;
    }

    pub async fn respond(&self, response: P::Response) -> ResponseOutcome {
        let outcome = {
            let mut run = self.run.lock().await;
            let outcome = run.respond(response, now());
            if matches!(
                outcome,
                ResponseOutcome::Scored(_) | ResponseOutcome::AwaitingConfidence
            ) {
                self.snapshot_tx.send_replace(snapshot_of(&run));
            }
            outcome
        };

        if matches!(outcome, ResponseOutcome::Scored(_)) {
            self.spawn_ticker().await;
        }
        outcome
    }

    pub async fn rate_confidence(&self, confidence: u8) -> ResponseOutcome {
        let outcome = {
            let mut run = self.run.lock().await;
            let outcome = run.rate_confidence(confidence, now());
            if matches!(outcome, ResponseOutcome::Scored(_)) {
                self.snapshot_tx.send_replace(snapshot_of(&run));
            }
            outcome
        };

        if matches!(outcome, ResponseOutcome::Scored(_)) {
            self.spawn_ticker().await;
        }
        outcome
    }

    /// Stores everything answered so far. Failed batches stay queued.
    pub async fn flush(&self, db: &Database) -> Result<usize> {
        let mut run = self.run.lock().await;
        run.outbox_mut().flush(db).await
    }

    pub async fn pending_results(&self) -> usize {
        self.run.lock().await.outbox().len()
    }

    pub async fn teardown(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
            log_info!("Run torn down with a timer pending");
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }
        if self.cancel_token.is_cancelled() {
            return;
        }

        let run = self.run.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let cancel_token = self.cancel_token.child_token();

        let handle = tokio::spawn(async move {
            loop {
                let (delay, generation) = {
                    let guard = run.lock().await;
                    match guard.pending_delay() {
                        Some(delay) => (delay, guard.generation()),
                        None => break,
                    }
                };

                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = time::sleep(delay) => {}
                }

                let mut guard = run.lock().await;
                match guard.on_timer_elapsed(generation, now()) {
                    TimerOutcome::Stale => break,
                    TimerOutcome::StimulusElapsed { trial_index } => {
                        log_debug!("Stimulus {} timed out", trial_index);
                    }
                    TimerOutcome::Advanced => {}
                }
                snapshot_tx.send_replace(snapshot_of(&guard));
            }
        });

        *ticker_guard = Some(handle);
    }
}

impl<P: Paradigm> Drop for RunController<P> {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Ok(mut guard) = self.ticker.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}
