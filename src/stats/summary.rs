//! Per-experiment summaries over stored result rows.
//!
//! The participant view summarises one session; the teacher view takes the
//! unfiltered rows of every session.

use std::collections::HashSet;

use serde::Serialize;

use crate::db::models::{BoubaKikiResult, DrmResult, RotationResult, ScanningResult, StroopResult};
use crate::stats::descriptive::{
    bin_means, group_means, mean, pearson, percent, quartiles, sem, BinMean, GroupMean, Quartiles,
};
use crate::trials::bouba_kiki::ShapeType;
use crate::trials::drm::{ItemType, OldNew};
use crate::trials::stroop::{LanguageGroup, LANGUAGE_GROUPS, WORDS};

pub const SCANNING_DISTANCE_BINS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StroopSummary {
    /// Means over correct trials only.
    pub congruent_mean: f64,
    pub incongruent_mean: f64,
    pub stroop_effect: f64,
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy: f64,
    pub congruent_distribution: Quartiles,
    pub incongruent_distribution: Quartiles,
}

fn correct_rts(results: &[StroopResult], congruent: bool) -> Vec<f64> {
    results
        .iter()
        .filter(|r| r.is_correct && r.is_congruent == congruent)
        .map(|r| r.reaction_time_ms)
        .collect()
}

pub fn stroop_summary(results: &[StroopResult]) -> StroopSummary {
    let congruent = correct_rts(results, true);
    let incongruent = correct_rts(results, false);
    let congruent_mean = mean(&congruent);
    let incongruent_mean = mean(&incongruent);
    let correct_trials = results.iter().filter(|r| r.is_correct).count();

    StroopSummary {
        congruent_mean,
        incongruent_mean,
        stroop_effect: incongruent_mean - congruent_mean,
        total_trials: results.len(),
        correct_trials,
        accuracy: percent(correct_trials, results.len()),
        congruent_distribution: quartiles(&congruent),
        incongruent_distribution: quartiles(&incongruent),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageGroupAggregate {
    pub language_group: LanguageGroup,
    pub congruent_mean: f64,
    pub congruent_sem: f64,
    pub incongruent_mean: f64,
    pub incongruent_sem: f64,
    pub congruent_count: usize,
    pub incongruent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGroupMeans {
    pub session_id: String,
    pub language_group: LanguageGroup,
    /// Means over every trial of the group, correct or not.
    pub congruent_mean: f64,
    pub incongruent_mean: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StroopClassView {
    pub total_trials: usize,
    pub total_sessions: usize,
    pub groups: Vec<LanguageGroupAggregate>,
    pub subjects: Vec<SubjectGroupMeans>,
    pub words: Vec<StroopWordSummary>,
}

/// Session ids in order of first appearance.
fn session_order<'a, I: IntoIterator<Item = &'a str>>(ids: I) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn group_aggregate(results: &[StroopResult], group: LanguageGroup) -> LanguageGroupAggregate {
    let in_group: Vec<StroopResult> = results
        .iter()
        .filter(|r| LanguageGroup::of(&r.word_text) == group)
        .cloned()
        .collect();
    let congruent = correct_rts(&in_group, true);
    let incongruent = correct_rts(&in_group, false);

    LanguageGroupAggregate {
        language_group: group,
        congruent_mean: mean(&congruent),
        congruent_sem: sem(&congruent),
        incongruent_mean: mean(&incongruent),
        incongruent_sem: sem(&incongruent),
        congruent_count: congruent.len(),
        incongruent_count: incongruent.len(),
    }
}

pub fn stroop_class_view(results: &[StroopResult]) -> StroopClassView {
    let sessions = session_order(results.iter().map(|r| r.session_id.as_str()));

    let groups = LANGUAGE_GROUPS
        .iter()
        .map(|group| group_aggregate(results, *group))
        .collect();

    let mut subjects = Vec::new();
    for session_id in &sessions {
        for group in LANGUAGE_GROUPS {
            let rows: Vec<&StroopResult> = results
                .iter()
                .filter(|r| r.session_id == *session_id && LanguageGroup::of(&r.word_text) == group)
                .collect();
            if rows.is_empty() {
                continue;
            }

            let rts = |congruent: bool| -> Vec<f64> {
                rows.iter()
                    .filter(|r| r.is_congruent == congruent)
                    .map(|r| r.reaction_time_ms)
                    .collect()
            };
            let correct = rows.iter().filter(|r| r.is_correct).count();

            subjects.push(SubjectGroupMeans {
                session_id: session_id.to_string(),
                language_group: group,
                congruent_mean: mean(&rts(true)),
                incongruent_mean: mean(&rts(false)),
                accuracy: percent(correct, rows.len()),
            });
        }
    }

    StroopClassView {
        total_trials: results.len(),
        total_sessions: sessions.len(),
        groups,
        subjects,
        words: stroop_word_summaries(results),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StroopWordSummary {
    pub word: String,
    /// Means over correct trials only.
    pub congruent_mean: f64,
    pub incongruent_mean: f64,
    /// `incongruent_mean - congruent_mean`.
    pub difference: f64,
    /// Means over every trial of the condition, errors included.
    pub congruent_rt: f64,
    pub incongruent_rt: f64,
    pub congruent_error_rate: f64,
    pub incongruent_error_rate: f64,
    pub congruent_trials: usize,
    pub incongruent_trials: usize,
}

/// One entry per stimulus word, in word-table order. Words without trials
/// report zeros.
pub fn stroop_word_summaries(results: &[StroopResult]) -> Vec<StroopWordSummary> {
    WORDS
        .iter()
        .map(|word| {
            let condition = |congruent: bool| -> Vec<&StroopResult> {
                results
                    .iter()
                    .filter(|r| r.word_text == *word && r.is_congruent == congruent)
                    .collect()
            };
            let congruent = condition(true);
            let incongruent = condition(false);

            let correct_mean = |rows: &[&StroopResult]| {
                let rts: Vec<f64> = rows
                    .iter()
                    .filter(|r| r.is_correct)
                    .map(|r| r.reaction_time_ms)
                    .collect();
                mean(&rts)
            };
            let all_mean = |rows: &[&StroopResult]| {
                let rts: Vec<f64> = rows.iter().map(|r| r.reaction_time_ms).collect();
                mean(&rts)
            };
            let error_rate = |rows: &[&StroopResult]| {
                percent(rows.iter().filter(|r| !r.is_correct).count(), rows.len())
            };

            let congruent_mean = correct_mean(&congruent);
            let incongruent_mean = correct_mean(&incongruent);

            StroopWordSummary {
                word: word.to_string(),
                congruent_mean,
                incongruent_mean,
                difference: incongruent_mean - congruent_mean,
                congruent_rt: all_mean(&congruent),
                incongruent_rt: all_mean(&incongruent),
                congruent_error_rate: error_rate(&congruent),
                incongruent_error_rate: error_rate(&incongruent),
                congruent_trials: congruent.len(),
                incongruent_trials: incongruent.len(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoubaKikiSummary {
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy: f64,
    /// Main trials with a rounded (bouba-type) word.
    pub bouba_accuracy: f64,
    /// Main trials with a spiky (kiki-type) word.
    pub kiki_accuracy: f64,
    pub control_accuracy: f64,
    pub mean_rt: f64,
}

fn accuracy_of<'a, I: IntoIterator<Item = &'a BoubaKikiResult>>(rows: I) -> f64 {
    let (correct, total) = rows
        .into_iter()
        .fold((0, 0), |(c, t), r| (c + usize::from(r.is_correct), t + 1));
    percent(correct, total)
}

pub fn bouba_kiki_summary(results: &[BoubaKikiResult]) -> BoubaKikiSummary {
    let main = || results.iter().filter(|r| !r.is_control);
    let correct_trials = results.iter().filter(|r| r.is_correct).count();
    let rts: Vec<f64> = results.iter().map(|r| r.reaction_time_ms).collect();

    BoubaKikiSummary {
        total_trials: results.len(),
        correct_trials,
        accuracy: percent(correct_trials, results.len()),
        bouba_accuracy: accuracy_of(main().filter(|r| r.word_type == ShapeType::Rounded)),
        kiki_accuracy: accuracy_of(main().filter(|r| r.word_type == ShapeType::Spiky)),
        control_accuracy: accuracy_of(results.iter().filter(|r| r.is_control)),
        mean_rt: mean(&rts),
    }
}

/// Per-session summaries, in order of first appearance.
pub fn bouba_kiki_by_session(results: &[BoubaKikiResult]) -> Vec<(String, BoubaKikiSummary)> {
    session_order(results.iter().map(|r| r.session_id.as_str()))
        .into_iter()
        .map(|session_id| {
            let rows: Vec<BoubaKikiResult> = results
                .iter()
                .filter(|r| r.session_id == session_id)
                .cloned()
                .collect();
            (session_id.to_string(), bouba_kiki_summary(&rows))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoubaKikiSession {
    pub session_id: String,
    pub summary: BoubaKikiSummary,
}

/// Class figures are means of the per-session percentages, so a short
/// session weighs as much as a complete one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoubaKikiClassView {
    pub participant_count: usize,
    pub accuracy: f64,
    pub bouba_accuracy: f64,
    pub kiki_accuracy: f64,
    pub control_accuracy: f64,
    pub sessions: Vec<BoubaKikiSession>,
}

pub fn bouba_kiki_class_view(results: &[BoubaKikiResult]) -> BoubaKikiClassView {
    let sessions: Vec<BoubaKikiSession> = bouba_kiki_by_session(results)
        .into_iter()
        .map(|(session_id, summary)| BoubaKikiSession {
            session_id,
            summary,
        })
        .collect();
    let average = |field: fn(&BoubaKikiSummary) -> f64| {
        let values: Vec<f64> = sessions.iter().map(|s| field(&s.summary)).collect();
        mean(&values)
    };

    BoubaKikiClassView {
        participant_count: sessions.len(),
        accuracy: average(|s| s.accuracy),
        bouba_accuracy: average(|s| s.bouba_accuracy),
        kiki_accuracy: average(|s| s.kiki_accuracy),
        control_accuracy: average(|s| s.control_accuracy),
        sessions,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialPositionPoint {
    pub position: u32,
    /// Share of studied probes at this position called "old", in percent.
    pub recall_rate: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrmSummary {
    pub hit_rate: f64,
    pub critical_lure_rate: f64,
    pub related_fa_rate: f64,
    pub unrelated_fa_rate: f64,
    pub correct_rejection_rate: f64,
    pub total_responses: usize,
    pub participant_count: usize,
    pub serial_positions: Vec<SerialPositionPoint>,
}

fn old_rate<'a, I: IntoIterator<Item = &'a DrmResult>>(rows: I) -> f64 {
    let (old, total) = rows
        .into_iter()
        .fold((0, 0), |(o, t), r| (o + usize::from(r.response == OldNew::Old), t + 1));
    percent(old, total)
}

pub fn drm_summary(results: &[DrmResult]) -> DrmSummary {
    let of_type = |item_type: ItemType| results.iter().filter(move |r| r.item_type == item_type);

    let new_items: Vec<&DrmResult> = results
        .iter()
        .filter(|r| r.item_type != ItemType::Studied)
        .collect();
    let rejected = new_items.iter().filter(|r| r.response == OldNew::New).count();

    let max_position = of_type(ItemType::Studied)
        .filter_map(|r| r.serial_position)
        .max()
        .unwrap_or(0);
    let serial_positions = (1..=max_position)
        .map(|position| {
            let at_position: Vec<&DrmResult> = of_type(ItemType::Studied)
                .filter(|r| r.serial_position == Some(position))
                .collect();
            SerialPositionPoint {
                position,
                recall_rate: old_rate(at_position.iter().copied()),
                count: at_position.len(),
            }
        })
        .collect();

    DrmSummary {
        hit_rate: old_rate(of_type(ItemType::Studied)),
        critical_lure_rate: old_rate(of_type(ItemType::CriticalLure)),
        related_fa_rate: old_rate(of_type(ItemType::RelatedDistractor)),
        unrelated_fa_rate: old_rate(of_type(ItemType::UnrelatedDistractor)),
        correct_rejection_rate: percent(rejected, new_items.len()),
        total_responses: results.len(),
        participant_count: session_order(results.iter().map(|r| r.session_id.as_str())).len(),
        serial_positions,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanningStats {
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy: f64,
    pub mean_rt: f64,
    pub rt_by_distance: Vec<BinMean>,
    pub correlation: f64,
}

pub fn scanning_stats(results: &[ScanningResult]) -> ScanningStats {
    let found = results.iter().filter(|r| r.found_target).count();
    let rts: Vec<f64> = results.iter().map(|r| r.reaction_time_ms).collect();
    let points: Vec<(f64, f64)> = results
        .iter()
        .map(|r| (r.distance, r.reaction_time_ms))
        .collect();

    ScanningStats {
        total_trials: results.len(),
        correct_trials: found,
        accuracy: percent(found, results.len()),
        mean_rt: mean(&rts),
        rt_by_distance: bin_means(&points, SCANNING_DISTANCE_BINS),
        correlation: pearson(&points),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationStats {
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy: f64,
    pub mean_rt: f64,
    /// Correct trials only.
    pub rt_by_angle: Vec<GroupMean<u16>>,
    pub correlation: f64,
}

/// Practice rows are ignored.
pub fn rotation_stats(results: &[RotationResult]) -> RotationStats {
    let main: Vec<&RotationResult> = results.iter().filter(|r| !r.is_practice).collect();
    let rts: Vec<f64> = main.iter().map(|r| r.reaction_time_ms).collect();
    let correct: Vec<(u16, f64)> = main
        .iter()
        .filter(|r| r.is_correct)
        .map(|r| (r.rotation_difference, r.reaction_time_ms))
        .collect();
    let pairs: Vec<(f64, f64)> = correct.iter().map(|&(a, rt)| (f64::from(a), rt)).collect();

    RotationStats {
        total_trials: main.len(),
        correct_trials: correct.len(),
        accuracy: percent(correct.len(), main.len()),
        mean_rt: mean(&rts),
        rt_by_angle: group_means(&correct),
        correlation: pearson(&pairs),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalRepSummary {
    pub scanning: ScanningStats,
    pub rotation: RotationStats,
}

pub fn mental_rep_summary(
    scanning: &[ScanningResult],
    rotation: &[RotationResult],
) -> MentalRepSummary {
    MentalRepSummary {
        scanning: scanning_stats(scanning),
        rotation: rotation_stats(rotation),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalRepParticipant {
    pub session_id: String,
    pub scanning_trials: usize,
    pub scanning_mean_rt: f64,
    pub scanning_correlation: f64,
    /// Main trials only.
    pub rotation_trials: usize,
    pub rotation_accuracy: f64,
    pub rotation_mean_rt: f64,
    pub rotation_correlation: f64,
}

/// One entry per session, scanning sessions first in order of appearance.
pub fn mental_rep_by_session(
    scanning: &[ScanningResult],
    rotation: &[RotationResult],
) -> Vec<MentalRepParticipant> {
    let ids = session_order(
        scanning
            .iter()
            .map(|r| r.session_id.as_str())
            .chain(rotation.iter().map(|r| r.session_id.as_str())),
    );

    ids.into_iter()
        .map(|session_id| {
            let scans: Vec<ScanningResult> = scanning
                .iter()
                .filter(|r| r.session_id == session_id)
                .cloned()
                .collect();
            let rotations: Vec<RotationResult> = rotation
                .iter()
                .filter(|r| r.session_id == session_id)
                .cloned()
                .collect();
            let scan = scanning_stats(&scans);
            let rot = rotation_stats(&rotations);

            MentalRepParticipant {
                session_id: session_id.to_string(),
                scanning_trials: scan.total_trials,
                scanning_mean_rt: scan.mean_rt,
                scanning_correlation: scan.correlation,
                rotation_trials: rot.total_trials,
                rotation_accuracy: rot.accuracy,
                rotation_mean_rt: rot.mean_rt,
                rotation_correlation: rot.correlation,
            }
        })
        .collect()
}

/// Pooled stats for the charts plus per-participant values and their means.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalRepClassView {
    pub scanning: ScanningStats,
    pub rotation: RotationStats,
    pub participants: Vec<MentalRepParticipant>,
    pub average_scanning_correlation: f64,
    pub average_rotation_correlation: f64,
    pub average_rotation_accuracy: f64,
}

pub fn mental_rep_class_view(
    scanning: &[ScanningResult],
    rotation: &[RotationResult],
) -> MentalRepClassView {
    let participants = mental_rep_by_session(scanning, rotation);
    let average = |field: fn(&MentalRepParticipant) -> f64| {
        let values: Vec<f64> = participants.iter().map(field).collect();
        mean(&values)
    };

    MentalRepClassView {
        scanning: scanning_stats(scanning),
        rotation: rotation_stats(rotation),
        average_scanning_correlation: average(|p| p.scanning_correlation),
        average_rotation_correlation: average(|p| p.rotation_correlation),
        average_rotation_accuracy: average(|p| p.rotation_accuracy),
        participants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trials::bouba_kiki::Side;
    use crate::trials::rotation::SameDifferent;
    use chrono::Utc;

    fn stroop(session: &str, word: &str, congruent: bool, correct: bool, rt: f64) -> StroopResult {
        StroopResult {
            session_id: session.into(),
            trial_number: 0,
            word_text: word.into(),
            font_color: "#f43f5e".into(),
            is_congruent: congruent,
            user_response: "red".into(),
            is_correct: correct,
            reaction_time_ms: rt,
            created_at: Utc::now(),
        }
    }

    fn drm(item_type: ItemType, response: OldNew, position: Option<u32>) -> DrmResult {
        DrmResult {
            session_id: "s1".into(),
            trial_number: 0,
            word: "bed".into(),
            item_type,
            list_theme: "Sleep".into(),
            response,
            is_correct: false,
            reaction_time_ms: 800.0,
            serial_position: position,
            confidence: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stroop_means_ignore_errors() {
        let results = vec![
            stroop("s", "red", true, true, 400.0),
            stroop("s", "adom", true, true, 600.0),
            stroop("s", "verde", false, true, 700.0),
            stroop("s", "flurg", false, false, 5000.0),
        ];
        let summary = stroop_summary(&results);
        assert_eq!(summary.congruent_mean, 500.0);
        assert_eq!(summary.incongruent_mean, 700.0);
        assert_eq!(summary.stroop_effect, 200.0);
        assert_eq!(summary.accuracy, 75.0);
    }

    #[test]
    fn empty_stroop_summary_is_all_zero() {
        let summary = stroop_summary(&[]);
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.stroop_effect, 0.0);
    }

    #[test]
    fn class_view_covers_every_group() {
        let results = vec![
            stroop("a", "red", true, true, 400.0),
            stroop("a", "rojo", false, true, 600.0),
            stroop("b", "red", true, true, 500.0),
            stroop("b", "red", false, false, 900.0),
        ];
        let view = stroop_class_view(&results);
        assert_eq!(view.total_sessions, 2);
        assert_eq!(view.groups.len(), 4);

        let english = &view.groups[0];
        assert_eq!(english.language_group, LanguageGroup::English);
        assert_eq!(english.congruent_count, 2);
        assert_eq!(english.congruent_mean, 450.0);
        assert_eq!(english.congruent_sem, 50.0 / 2f64.sqrt());
        assert_eq!(english.incongruent_count, 0);

        // a: English + Spanish, b: English
        assert_eq!(view.subjects.len(), 3);
        let b = view.subjects.iter().find(|s| s.session_id == "b").unwrap();
        assert_eq!(b.incongruent_mean, 900.0);
        assert_eq!(b.accuracy, 50.0);
    }

    #[test]
    fn bouba_kiki_accuracy_splits() {
        let row = |word_type, is_control, is_correct| BoubaKikiResult {
            session_id: "s".into(),
            trial_number: 1,
            word: "BOUBA".into(),
            word_type,
            left_shape: "rounded_01.png".into(),
            right_shape: "spiky_01.png".into(),
            response_type: word_type,
            response: Side::Left,
            is_correct,
            reaction_time_ms: 1000.0,
            is_control,
            created_at: Utc::now(),
        };
        let results = vec![
            row(ShapeType::Rounded, false, true),
            row(ShapeType::Rounded, false, false),
            row(ShapeType::Spiky, false, true),
            row(ShapeType::Spiky, true, false),
        ];
        let summary = bouba_kiki_summary(&results);
        assert_eq!(summary.bouba_accuracy, 50.0);
        assert_eq!(summary.kiki_accuracy, 100.0);
        assert_eq!(summary.control_accuracy, 0.0);
        assert_eq!(summary.accuracy, 50.0);
        assert_eq!(summary.mean_rt, 1000.0);
        assert_eq!(bouba_kiki_by_session(&results).len(), 1);
    }

    #[test]
    fn drm_rates_and_serial_curve() {
        let results = vec![
            drm(ItemType::Studied, OldNew::Old, Some(1)),
            drm(ItemType::Studied, OldNew::New, Some(1)),
            drm(ItemType::Studied, OldNew::Old, Some(3)),
            drm(ItemType::CriticalLure, OldNew::Old, None),
            drm(ItemType::UnrelatedDistractor, OldNew::New, None),
            drm(ItemType::UnrelatedDistractor, OldNew::New, None),
        ];
        let summary = drm_summary(&results);
        assert!((summary.hit_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.critical_lure_rate, 100.0);
        assert_eq!(summary.unrelated_fa_rate, 0.0);
        assert_eq!(summary.related_fa_rate, 0.0);
        assert!((summary.correct_rejection_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.participant_count, 1);

        assert_eq!(summary.serial_positions.len(), 3);
        assert_eq!(summary.serial_positions[0].recall_rate, 50.0);
        assert_eq!(summary.serial_positions[1].count, 0);
        assert_eq!(summary.serial_positions[2].recall_rate, 100.0);
    }

    #[test]
    fn scanning_stats_correlate_distance() {
        let row = |distance: f64, rt: f64| ScanningResult {
            session_id: "s".into(),
            trial_number: 1,
            from_landmark: "hut".into(),
            to_landmark: "tree".into(),
            distance,
            found_target: true,
            reaction_time_ms: rt,
            created_at: Utc::now(),
        };
        let stats = scanning_stats(&[row(10.0, 1000.0), row(20.0, 1200.0), row(30.0, 1400.0)]);
        assert!((stats.correlation - 1.0).abs() < 1e-9);
        assert_eq!(stats.mean_rt, 1200.0);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.rt_by_distance.len(), 3);
    }

    #[test]
    fn rotation_stats_skip_practice_and_errors() {
        let row = |difference: u16, correct: bool, practice: bool, rt: f64| RotationResult {
            session_id: "s".into(),
            trial_number: 1,
            figure_id: "figure_1".into(),
            left_angle: 0,
            right_angle: difference,
            is_same: true,
            rotation_difference: difference,
            response: SameDifferent::Same,
            is_correct: correct,
            reaction_time_ms: rt,
            is_practice: practice,
            created_at: Utc::now(),
        };
        let results = vec![
            row(0, true, true, 9000.0),
            row(0, true, false, 800.0),
            row(60, true, false, 1000.0),
            row(120, false, false, 3000.0),
            row(120, true, false, 1400.0),
        ];
        let stats = rotation_stats(&results);
        assert_eq!(stats.total_trials, 4);
        assert_eq!(stats.correct_trials, 3);
        assert_eq!(stats.accuracy, 75.0);
        assert_eq!(stats.mean_rt, 1550.0);
        let angles: Vec<u16> = stats.rt_by_angle.iter().map(|g| g.key).collect();
        assert_eq!(angles, vec![0, 60, 120]);
        assert_eq!(stats.rt_by_angle[2].mean, 1400.0);
        assert!(stats.correlation > 0.95);
    }

    #[test]
    fn word_breakdown_separates_conditions() {
        let results = vec![
            stroop("s", "red", true, true, 400.0),
            stroop("s", "red", true, true, 500.0),
            stroop("s", "red", true, false, 900.0),
            stroop("s", "red", false, true, 700.0),
            stroop("s", "red", false, false, 300.0),
            stroop("s", "rojo", false, true, 650.0),
        ];
        let words = stroop_word_summaries(&results);
        assert_eq!(words.len(), WORDS.len());

        let red = &words[0];
        assert_eq!(red.word, "red");
        assert_eq!(red.congruent_mean, 450.0);
        assert_eq!(red.incongruent_mean, 700.0);
        assert_eq!(red.difference, 250.0);
        assert_eq!(red.congruent_rt, 600.0);
        assert_eq!(red.incongruent_rt, 500.0);
        assert!((red.congruent_error_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(red.incongruent_error_rate, 50.0);
        assert_eq!((red.congruent_trials, red.incongruent_trials), (3, 2));

        let rojo = words.iter().find(|w| w.word == "rojo").unwrap();
        assert_eq!(rojo.difference, 650.0);
        assert_eq!(rojo.congruent_trials, 0);

        let verde = words.iter().find(|w| w.word == "verde").unwrap();
        assert_eq!(verde.difference, 0.0);
        assert_eq!(verde.incongruent_error_rate, 0.0);

        assert_eq!(stroop_class_view(&results).words, words);
    }

    #[test]
    fn bouba_kiki_class_averages_participants() {
        let row = |session: &str, is_correct| BoubaKikiResult {
            session_id: session.into(),
            trial_number: 1,
            word: "KIKI".into(),
            word_type: ShapeType::Spiky,
            left_shape: "rounded_01.png".into(),
            right_shape: "spiky_01.png".into(),
            response_type: ShapeType::Spiky,
            response: Side::Right,
            is_correct,
            reaction_time_ms: 900.0,
            is_control: false,
            created_at: Utc::now(),
        };
        let results = vec![
            row("a", true),
            row("a", true),
            row("a", true),
            row("a", false),
            row("b", false),
        ];

        assert_eq!(bouba_kiki_summary(&results).accuracy, 40.0);
        let view = bouba_kiki_class_view(&results);
        assert_eq!(view.participant_count, 2);
        assert_eq!(view.accuracy, 37.5);
        assert_eq!(view.kiki_accuracy, 37.5);
        assert_eq!(view.bouba_accuracy, 0.0);
        assert_eq!(view.sessions[0].session_id, "a");
        assert_eq!(view.sessions[0].summary.accuracy, 75.0);
    }

    #[test]
    fn mental_rep_class_averages_participants() {
        let scan = |session: &str, distance: f64, rt: f64| ScanningResult {
            session_id: session.into(),
            trial_number: 1,
            from_landmark: "hut".into(),
            to_landmark: "tree".into(),
            distance,
            found_target: true,
            reaction_time_ms: rt,
            created_at: Utc::now(),
        };
        let rotate = |session: &str, difference: u16, correct: bool, practice: bool, rt: f64| {
            RotationResult {
                session_id: session.into(),
                trial_number: 1,
                figure_id: "figure_1".into(),
                left_angle: 0,
                right_angle: difference,
                is_same: true,
                rotation_difference: difference,
                response: SameDifferent::Same,
                is_correct: correct,
                reaction_time_ms: rt,
                is_practice: practice,
                created_at: Utc::now(),
            }
        };
        let scanning = vec![
            scan("a", 10.0, 1000.0),
            scan("a", 20.0, 1200.0),
            scan("a", 30.0, 1400.0),
            scan("b", 10.0, 1400.0),
            scan("b", 20.0, 1200.0),
            scan("b", 30.0, 1000.0),
        ];
        let rotation = vec![
            rotate("a", 0, true, false, 800.0),
            rotate("a", 120, true, false, 1600.0),
            rotate("a", 60, false, false, 5000.0),
            rotate("b", 0, true, true, 9000.0),
            rotate("b", 0, true, false, 1000.0),
        ];

        let participants = mental_rep_by_session(&scanning, &rotation);
        assert_eq!(participants.len(), 2);
        let a = &participants[0];
        assert_eq!(a.session_id, "a");
        assert!((a.scanning_correlation - 1.0).abs() < 1e-9);
        assert!((a.rotation_correlation - 1.0).abs() < 1e-9);
        assert!((a.rotation_accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(a.scanning_mean_rt, 1200.0);
        let b = &participants[1];
        assert!((b.scanning_correlation + 1.0).abs() < 1e-9);
        assert_eq!(b.rotation_trials, 1);
        assert_eq!(b.rotation_accuracy, 100.0);
        assert_eq!(b.rotation_correlation, 0.0);

        let view = mental_rep_class_view(&scanning, &rotation);
        assert!(view.average_scanning_correlation.abs() < 1e-9);
        assert!((view.average_rotation_correlation - 0.5).abs() < 1e-9);
        assert!((view.average_rotation_accuracy - 250.0 / 3.0).abs() < 1e-9);
        assert_eq!(view.scanning.total_trials, 6);
        assert_eq!(view.rotation.total_trials, 4);
    }
}
