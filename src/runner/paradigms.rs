use crate::db::{BoubaKikiResult, DrmResult, RotationResult, ScanningResult, StroopResult};
use crate::runner::run::{Paradigm, RecordMeta};
use crate::runner::state::{ErrorPolicy, PhaseTiming, RunnerConfig, ScoredResponse};
use crate::trials::bouba_kiki::{self, BoubaKikiResponse, BoubaKikiTrial, CONTROL_WORD};
use crate::trials::drm::{self, OldNew, StudyTrial, TestItem};
use crate::trials::rotation::{self, RotationTrial, SameDifferent};
use crate::trials::scanning::ScanningTrial;
use crate::trials::stroop::{self, ColorKey, StroopTrial};

/// Practice retries until correct and is not stored.
#[derive(Debug, Clone, Copy)]
pub struct StroopParadigm {
    pub practice: bool,
}

impl Paradigm for StroopParadigm {
    type Trial = StroopTrial;
    type Response = ColorKey;
    type Record = StroopResult;

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            timing: PhaseTiming::stroop(),
            error_policy: if self.practice {
                ErrorPolicy::RetryUntilCorrect
            } else {
                ErrorPolicy::Record
            },
            collect_confidence: false,
        }
    }

    fn score(&self, trial: &StroopTrial, response: ColorKey) -> Option<bool> {
        Some(stroop::is_correct_response(trial, response))
    }

    fn record(
        &self,
        meta: RecordMeta<'_>,
        trial: &StroopTrial,
        response: ColorKey,
        scored: &ScoredResponse,
    ) -> Option<StroopResult> {
        if self.practice {
            return None;
        }
        Some(StroopResult {
            session_id: meta.session_id.to_string(),
            trial_number: meta.trial_number,
            word_text: trial.word_text.to_string(),
            font_color: trial.font_color.to_string(),
            is_congruent: trial.is_congruent,
            user_response: response.as_str().to_string(),
            is_correct: scored.is_correct,
            reaction_time_ms: scored.reaction_time_ms,
            created_at: meta.created_at,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoubaKikiParadigm;

impl Paradigm for BoubaKikiParadigm {
    type Trial = BoubaKikiTrial;
    type Response = BoubaKikiResponse;
    type Record = BoubaKikiResult;

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            timing: PhaseTiming::bouba_kiki(),
            ..RunnerConfig::default()
        }
    }

    fn score(&self, trial: &BoubaKikiTrial, response: BoubaKikiResponse) -> Option<bool> {
        bouba_kiki::is_correct_response(trial, response)
    }

    fn record(
        &self,
        meta: RecordMeta<'_>,
        trial: &BoubaKikiTrial,
        response: BoubaKikiResponse,
        scored: &ScoredResponse,
    ) -> Option<BoubaKikiResult> {
        let result = match (trial, response) {
            (BoubaKikiTrial::Main(main), BoubaKikiResponse::Choice(side)) => BoubaKikiResult {
                session_id: meta.session_id.to_string(),
                trial_number: meta.trial_number,
                word: main.word.to_string(),
                word_type: main.word_type,
                left_shape: main.left_shape.to_string(),
                right_shape: main.right_shape.to_string(),
                response_type: main.shape_type_at(side),
                response: side,
                is_correct: scored.is_correct,
                reaction_time_ms: scored.reaction_time_ms,
                is_control: false,
                created_at: meta.created_at,
            },
            (BoubaKikiTrial::Control(control), BoubaKikiResponse::Name(name)) => BoubaKikiResult {
                session_id: meta.session_id.to_string(),
                trial_number: meta.trial_number,
                word: CONTROL_WORD.to_string(),
                word_type: control.shape_type,
                left_shape: control.shape.to_string(),
                right_shape: String::new(),
                response_type: name.category(),
                response: name.legacy_side(),
                is_correct: scored.is_correct,
                reaction_time_ms: scored.reaction_time_ms,
                is_control: true,
                created_at: meta.created_at,
            },
            _ => return None,
        };
        Some(result)
    }
}

/// Passive presentation: each word is shown for a fixed time and key
/// presses are ignored. Nothing is stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrmStudyParadigm;

impl Paradigm for DrmStudyParadigm {
    type Trial = StudyTrial;
    type Response = ();
    type Record = DrmResult;

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            timing: PhaseTiming::drm_study(),
            ..RunnerConfig::default()
        }
    }

    fn score(&self, _trial: &StudyTrial, _response: ()) -> Option<bool> {
        None
    }

    fn record(
        &self,
        _meta: RecordMeta<'_>,
        _trial: &StudyTrial,
        _response: (),
        _scored: &ScoredResponse,
    ) -> Option<DrmResult> {
        None
    }
}

/// Old/new recognition followed by a 1-4 confidence rating.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrmTestParadigm;

impl Paradigm for DrmTestParadigm {
    type Trial = TestItem;
    type Response = OldNew;
    type Record = DrmResult;

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            timing: PhaseTiming::drm_test(),
            error_policy: ErrorPolicy::Record,
            collect_confidence: true,
        }
    }

    fn score(&self, item: &TestItem, response: OldNew) -> Option<bool> {
        Some(drm::is_correct_response(item, response))
    }

    fn record(
        &self,
        meta: RecordMeta<'_>,
        item: &TestItem,
        response: OldNew,
        scored: &ScoredResponse,
    ) -> Option<DrmResult> {
        Some(DrmResult {
            session_id: meta.session_id.to_string(),
            trial_number: meta.trial_number,
            word: item.word.to_string(),
            item_type: item.item_type,
            list_theme: item.list_theme.to_string(),
            response,
            is_correct: scored.is_correct,
            reaction_time_ms: scored.reaction_time_ms,
            serial_position: item.serial_position,
            confidence: scored.confidence,
            created_at: meta.created_at,
        })
    }
}

/// The only response is "found it", so every answered trial counts as found.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanningParadigm;

impl Paradigm for ScanningParadigm {
    type Trial = ScanningTrial;
    type Response = ();
    type Record = ScanningResult;

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            timing: PhaseTiming::scanning(),
            ..RunnerConfig::default()
        }
    }

    fn score(&self, _trial: &ScanningTrial, _response: ()) -> Option<bool> {
        Some(true)
    }

    fn record(
        &self,
        meta: RecordMeta<'_>,
        trial: &ScanningTrial,
        _response: (),
        scored: &ScoredResponse,
    ) -> Option<ScanningResult> {
        Some(ScanningResult {
            session_id: meta.session_id.to_string(),
            trial_number: meta.trial_number,
            from_landmark: trial.from_landmark.id.to_string(),
            to_landmark: trial.to_landmark.id.to_string(),
            distance: trial.distance,
            found_target: scored.is_correct,
            reaction_time_ms: scored.reaction_time_ms,
            created_at: meta.created_at,
        })
    }
}

/// Practice shows 1.5 s of feedback; both blocks are stored, tagged by `is_practice`.
#[derive(Debug, Clone, Copy)]
pub struct RotationParadigm {
    pub practice: bool,
}

impl Paradigm for RotationParadigm {
    type Trial = RotationTrial;
    type Response = SameDifferent;
    type Record = RotationResult;

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            timing: if self.practice {
                PhaseTiming::rotation_practice()
            } else {
                PhaseTiming::rotation_main()
            },
            ..RunnerConfig::default()
        }
    }

    fn score(&self, trial: &RotationTrial, response: SameDifferent) -> Option<bool> {
        Some(rotation::is_correct_response(trial, response))
    }

    fn record(
        &self,
        meta: RecordMeta<'_>,
        trial: &RotationTrial,
        response: SameDifferent,
        scored: &ScoredResponse,
    ) -> Option<RotationResult> {
        Some(RotationResult {
            session_id: meta.session_id.to_string(),
            trial_number: meta.trial_number,
            figure_id: trial.figure_id.clone(),
            left_angle: trial.left_angle,
            right_angle: trial.right_angle,
            is_same: trial.is_same,
            rotation_difference: trial.rotation_difference,
            response,
            is_correct: scored.is_correct,
            reaction_time_ms: scored.reaction_time_ms,
            is_practice: trial.is_practice,
            created_at: meta.created_at,
        })
    }
}
