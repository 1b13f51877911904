//! Per-trial state machine shared by every experiment.
//!
//! The machine never sleeps. It reports how long the current phase should
//! last ([`TrialRunner::pending_delay`]) and the owner calls
//! [`TrialRunner::on_timer_elapsed`] when that time has passed. Each phase
//! change bumps a generation counter; a timer armed for an older generation
//! is ignored when it fires.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::trials::drm::CONFIDENCE_SCALE;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunnerPhase {
    #[default]
    Idle,
    Fixation,
    Ready,
    Stimulus,
    AwaitingConfidence,
    Feedback,
    InterTrial,
    Complete,
}

/// Phase durations in milliseconds. Zero skips the phase; a zero stimulus
/// duration waits for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseTiming {
    pub fixation_ms: u64,
    pub ready_ms: u64,
    pub stimulus_ms: u64,
    pub feedback_ms: u64,
    pub inter_trial_ms: u64,
}

impl PhaseTiming {
    pub fn stroop() -> Self {
        Self {
            inter_trial_ms: 500,
            ..Self::default()
        }
    }

    pub fn bouba_kiki() -> Self {
        Self {
            fixation_ms: 500,
            ..Self::default()
        }
    }

    pub fn drm_study() -> Self {
        Self {
            stimulus_ms: 2000,
            inter_trial_ms: 500,
            ..Self::default()
        }
    }

    pub fn drm_test() -> Self {
        Self::default()
    }

    pub fn scanning() -> Self {
        Self {
            fixation_ms: 500,
            ready_ms: 1500,
            ..Self::default()
        }
    }

    pub fn rotation_practice() -> Self {
        Self {
            fixation_ms: 500,
            feedback_ms: 1500,
            ..Self::default()
        }
    }

    pub fn rotation_main() -> Self {
        Self {
            fixation_ms: 500,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorPolicy {
    /// Score the answer and move on.
    #[default]
    Record,
    /// Keep the trial on screen until answered correctly; the RT clock restarts.
    RetryUntilCorrect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    pub timing: PhaseTiming,
    pub error_policy: ErrorPolicy,
    /// Ask for a 1-4 confidence rating after each answer.
    pub collect_confidence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResponse {
    pub trial_index: usize,
    /// Stimulus onset to the scored answer, not to the confidence rating.
    pub reaction_time_ms: f64,
    pub is_correct: bool,
    pub confidence: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseOutcome {
    /// Not accepting input right now, or the input does not apply.
    Ignored,
    /// Wrong practice answer; the same trial stays up.
    Retry,
    AwaitingConfidence,
    Scored(ScoredResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Stale,
    Advanced,
    /// A timed stimulus ran out without a response.
    StimulusElapsed { trial_index: usize },
}

#[derive(Debug, Clone, Copy)]
struct PendingScore {
    reaction_time_ms: f64,
    is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct TrialRunner {
    config: RunnerConfig,
    trial_count: usize,
    index: usize,
    phase: RunnerPhase,
    stimulus_onset: Option<Instant>,
    pending: Option<PendingScore>,
    generation: u64,
}

impl TrialRunner {
    pub fn new(config: RunnerConfig, trial_count: usize) -> Self {
        Self {
            config,
            trial_count,
            index: 0,
            phase: RunnerPhase::Idle,
            stimulus_onset: None,
            pending: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    pub fn trial_index(&self) -> usize {
        self.index
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RunnerPhase::Complete
    }

    /// Responses are only taken while the stimulus is up.
    pub fn accepts_response(&self) -> bool {
        self.phase == RunnerPhase::Stimulus
    }

    pub fn start(&mut self, now: Instant) {
        if self.phase != RunnerPhase::Idle {
            return;
        }
        if self.trial_count == 0 {
            self.set_phase(RunnerPhase::Complete);
            return;
        }
        self.enter_trial(now);
    }

    /// How long the current phase lasts, or `None` if it waits for input.
    pub fn pending_delay(&self) -> Option<Duration> {
        let timing = &self.config.timing;
        let ms = match self.phase {
            RunnerPhase::Fixation => timing.fixation_ms,
            RunnerPhase::Ready => timing.ready_ms,
            RunnerPhase::Stimulus => timing.stimulus_ms,
            RunnerPhase::Feedback => timing.feedback_ms,
            RunnerPhase::InterTrial => timing.inter_trial_ms,
            RunnerPhase::Idle | RunnerPhase::AwaitingConfidence | RunnerPhase::Complete => 0,
        };
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    pub fn on_timer_elapsed(&mut self, generation: u64, now: Instant) -> TimerOutcome {
        if generation != self.generation || self.pending_delay().is_none() {
            return TimerOutcome::Stale;
        }

        match self.phase {
            RunnerPhase::Fixation => {
                if self.config.timing.ready_ms > 0 {
                    self.set_phase(RunnerPhase::Ready);
                } else {
                    self.show_stimulus(now);
                }
                TimerOutcome::Advanced
            }
            RunnerPhase::Ready => {
                self.show_stimulus(now);
                TimerOutcome::Advanced
            }
            RunnerPhase::Stimulus => {
                let trial_index = self.index;
                self.after_trial(now);
                TimerOutcome::StimulusElapsed { trial_index }
            }
            RunnerPhase::Feedback | RunnerPhase::InterTrial => {
                self.advance(now);
                TimerOutcome::Advanced
            }
            RunnerPhase::Idle | RunnerPhase::AwaitingConfidence | RunnerPhase::Complete => {
                TimerOutcome::Stale
            }
        }
    }

    pub fn respond(&mut self, is_correct: bool, now: Instant) -> ResponseOutcome {
        if !self.accepts_response() {
            return ResponseOutcome::Ignored;
        }

        if !is_correct && self.config.error_policy == ErrorPolicy::RetryUntilCorrect {
            self.stimulus_onset = Some(now);
            return ResponseOutcome::Retry;
        }

        let reaction_time_ms = self.elapsed_since_onset(now);
        if self.config.collect_confidence {
            self.pending = Some(PendingScore {
                reaction_time_ms,
                is_correct,
            });
            self.set_phase(RunnerPhase::AwaitingConfidence);
            return ResponseOutcome::AwaitingConfidence;
        }

        let scored = ScoredResponse {
            trial_index: self.index,
            reaction_time_ms,
            is_correct,
            confidence: None,
        };
        self.after_trial(now);
        ResponseOutcome::Scored(scored)
    }

    /// Out-of-scale ratings are ignored and the prompt stays up.
    pub fn rate_confidence(&mut self, confidence: u8, now: Instant) -> ResponseOutcome {
        if self.phase != RunnerPhase::AwaitingConfidence
            || !CONFIDENCE_SCALE.contains(&confidence)
        {
            return ResponseOutcome::Ignored;
        }
        let Some(pending) = self.pending.take() else {
            return ResponseOutcome::Ignored;
        };

        let scored = ScoredResponse {
            trial_index: self.index,
            reaction_time_ms: pending.reaction_time_ms,
            is_correct: pending.is_correct,
            confidence: Some(confidence),
        };
        self.after_trial(now);
        ResponseOutcome::Scored(scored)
    }

    fn elapsed_since_onset(&self, now: Instant) -> f64 {
        self.stimulus_onset
            .map(|onset| now.saturating_duration_since(onset).as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    fn set_phase(&mut self, phase: RunnerPhase) {
        self.phase = phase;
        self.generation = self.generation.wrapping_add(1);
    }

    fn enter_trial(&mut self, now: Instant) {
        let timing = self.config.timing;
        if timing.fixation_ms > 0 {
            self.set_phase(RunnerPhase::Fixation);
        } else if timing.ready_ms > 0 {
            self.set_phase(RunnerPhase::Ready);
        } else {
            self.show_stimulus(now);
        }
    }

    fn show_stimulus(&mut self, now: Instant) {
        self.stimulus_onset = Some(now);
        self.set_phase(RunnerPhase::Stimulus);
    }

    fn after_trial(&mut self, now: Instant) {
        let timing = self.config.timing;
        if timing.feedback_ms > 0 {
            self.set_phase(RunnerPhase::Feedback);
        } else if timing.inter_trial_ms > 0 {
            self.set_phase(RunnerPhase::InterTrial);
        } else {
            self.advance(now);
        }
    }

    fn advance(&mut self, now: Instant) {
        self.stimulus_onset = None;
        self.index += 1;
        if self.index >= self.trial_count {
            self.set_phase(RunnerPhase::Complete);
        } else {
            self.enter_trial(now);
        }
    }
}
