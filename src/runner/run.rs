use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::db::{ResultOutbox, ResultRecord};
use crate::runner::state::{
    ResponseOutcome, RunnerConfig, RunnerPhase, ScoredResponse, TimerOutcome, TrialRunner,
};

/// One experiment phase: which trials it shows, how answers are scored and
/// what gets stored.
pub trait Paradigm {
    type Trial: Clone;
    type Response: Copy;
    type Record: ResultRecord;

    fn runner_config(&self) -> RunnerConfig;

    /// `None` when the response does not apply to this trial.
    fn score(&self, trial: &Self::Trial, response: Self::Response) -> Option<bool>;

    /// `None` for phases that are not stored.
    fn record(
        &self,
        meta: RecordMeta<'_>,
        trial: &Self::Trial,
        response: Self::Response,
        scored: &ScoredResponse,
    ) -> Option<Self::Record>;
}

#[derive(Debug, Clone, Copy)]
pub struct RecordMeta<'a> {
    pub session_id: &'a str,
    /// 1-based position within the phase.
    pub trial_number: u32,
    pub created_at: DateTime<Utc>,
}

/// A paradigm, its trial sequence and the results it has produced so far.
pub struct ExperimentRun<P: Paradigm> {
    paradigm: P,
    trials: Vec<P::Trial>,
    runner: TrialRunner,
    session_id: String,
    awaiting: Option<P::Response>,
    outbox: ResultOutbox<P::Record>,
}

impl<P: Paradigm> ExperimentRun<P> {
    pub fn new(paradigm: P, trials: Vec<P::Trial>, session_id: impl Into<String>) -> Self {
        let runner = TrialRunner::new(paradigm.runner_config(), trials.len());
        Self {
            paradigm,
            trials,
            runner,
            session_id: session_id.into(),
            awaiting: None,
            outbox: ResultOutbox::new(),
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.runner.start(now);
    }

    pub fn phase(&self) -> RunnerPhase {
        self.runner.phase()
    }

    pub fn trial_index(&self) -> usize {
        self.runner.trial_index()
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    pub fn generation(&self) -> u64 {
        self.runner.generation()
    }

    pub fn pending_delay(&self) -> Option<Duration> {
        self.runner.pending_delay()
    }

    pub fn is_complete(&self) -> bool {
        self.runner.is_complete()
    }

    pub fn current_trial(&self) -> Option<&P::Trial> {
        if self.runner.phase() == RunnerPhase::Complete {
            return None;
        }
        self.trials.get(self.runner.trial_index())
    }

    pub fn on_timer_elapsed(&mut self, generation: u64, now: Instant) -> TimerOutcome {
        self.runner.on_timer_elapsed(generation, now)
    }

    pub fn respond(&mut self, response: P::Response, now: Instant) -> ResponseOutcome {
        if !self.runner.accepts_response() {
            return ResponseOutcome::Ignored;
        }
        let Some(trial) = self.trials.get(self.runner.trial_index()) else {
            return ResponseOutcome::Ignored;
        };
        let Some(is_correct) = self.paradigm.score(trial, response) else {
            return ResponseOutcome::Ignored;
        };

        let outcome = self.runner.respond(is_correct, now);
        match outcome {
            ResponseOutcome::AwaitingConfidence => self.awaiting = Some(response),
            ResponseOutcome::Scored(scored) => self.store(response, &scored),
            ResponseOutcome::Ignored | ResponseOutcome::Retry => {}
        }
        outcome
    }

    pub fn rate_confidence(&mut self, confidence: u8, now: Instant) -> ResponseOutcome {
        let outcome = self.runner.rate_confidence(confidence, now);
        if let ResponseOutcome::Scored(scored) = outcome {
            if let Some(response) = self.awaiting.take() {
                self.store(response, &scored);
            }
        }
        outcome
    }

    pub fn outbox(&self) -> &ResultOutbox<P::Record> {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut ResultOutbox<P::Record> {
        &mut self.outbox
    }

    pub fn into_outbox(self) -> ResultOutbox<P::Record> {
        self.outbox
    }

    fn store(&mut self, response: P::Response, scored: &ScoredResponse) {
        let Some(trial) = self.trials.get(scored.trial_index) else {
            return;
        };
        let meta = RecordMeta {
            session_id: &self.session_id,
            trial_number: scored.trial_index as u32 + 1,
            created_at: Utc::now(),
        };
        if let Some(record) = self.paradigm.record(meta, trial, response, scored) {
            self.outbox.push(record);
        }
    }
}
