//! Full Stroop blocks driven on paused time, stored, and summarised.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;
use tokio::time;

use cognilab_lib::db::{Database, StroopResult};
use cognilab_lib::models::{enter_phase, Experiment, Phase, PhaseEntry};
use cognilab_lib::runner::{
    ExperimentRun, ResponseOutcome, RunController, RunnerPhase, StroopParadigm,
};
use cognilab_lib::settings::SettingsStore;
use cognilab_lib::stats::summary::stroop_summary;
use cognilab_lib::trials::stroop::{self, COLOR_KEYS};
use cognilab_lib::Lab;

#[tokio::test(start_paused = true)]
async fn stroop_block_end_to_end() {
    let dir = tempdir().unwrap();
    let lab = Lab::with_database(
        Database::open_in_memory().unwrap(),
        SettingsStore::new(dir.path().join("settings.json")),
    );

    assert_eq!(enter_phase(None, Experiment::Stroop, Phase::Main), PhaseEntry::RedirectToIntro);
    let context = lab.start_session(Experiment::Stroop, "Maya", None).await.unwrap();
    assert_eq!(
        enter_phase(Some(&context), Experiment::Stroop, Phase::Main),
        PhaseEntry::Proceed
    );

    let mut rng = StdRng::seed_from_u64(2024);
    let trials = stroop::main_trials(&mut rng);
    let total = trials.len();
    let controller = RunController::new(ExperimentRun::new(
        StroopParadigm { practice: false },
        trials,
        context.session_id.clone(),
    ));
    controller.start().await;

    for index in 0..total {
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.phase, RunnerPhase::Stimulus);
        assert_eq!(snapshot.trial_index, index);

        let trial = controller.current_trial().await.unwrap();
        let rt = if trial.is_congruent { 400 } else { 600 };
        time::sleep(Duration::from_millis(rt)).await;

        let answer = if index < 6 {
            COLOR_KEYS.into_iter().find(|key| *key != trial.color).unwrap()
        } else {
            trial.color
        };
        assert!(matches!(controller.respond(answer).await, ResponseOutcome::Scored(_)));
        assert_eq!(controller.respond(answer).await, ResponseOutcome::Ignored);

        time::sleep(Duration::from_millis(501)).await;
    }
    assert_eq!(controller.snapshot().await.phase, RunnerPhase::Complete);

    assert_eq!(controller.flush(lab.db()).await.unwrap(), total);
    assert_eq!(controller.pending_results().await, 0);

    let stored: Vec<StroopResult> =
        lab.db().results_for_session(&context.session_id).await.unwrap();
    assert_eq!(stored.len(), total);

    let summary = stroop_summary(&stored);
    assert_eq!(summary.total_trials, total);
    assert_eq!(summary.correct_trials, total - 6);
    assert!((summary.congruent_mean - 400.0).abs() < 1.0);
    assert!((summary.incongruent_mean - 600.0).abs() < 1.0);
    assert!((summary.stroop_effect - 200.0).abs() < 2.0);
}

#[tokio::test(start_paused = true)]
async fn correct_stroop_block_matches_condition_means() {
    let dir = tempdir().unwrap();
    let lab = Lab::with_database(
        Database::open_in_memory().unwrap(),
        SettingsStore::new(dir.path().join("settings.json")),
    );
    let context = lab.start_session(Experiment::Stroop, "Lior", None).await.unwrap();

    let trials = stroop::main_trials(&mut StdRng::seed_from_u64(36));
    assert_eq!(trials.len(), 36);
    let rt_for = |index: usize| 350 + 7 * index as u64;

    let condition_mean = |congruent: bool| {
        let rts: Vec<f64> = trials
            .iter()
            .enumerate()
            .filter(|(_, trial)| trial.is_congruent == congruent)
            .map(|(index, _)| rt_for(index) as f64)
            .collect();
        rts.iter().sum::<f64>() / rts.len() as f64
    };
    let expected_congruent = condition_mean(true);
    let expected_incongruent = condition_mean(false);

    let controller = RunController::new(ExperimentRun::new(
        StroopParadigm { practice: false },
        trials.clone(),
        context.session_id.clone(),
    ));
    let mut rx = controller.subscribe();
    controller.start().await;

    for (index, trial) in trials.iter().enumerate() {
        rx.wait_for(|s| s.phase == RunnerPhase::Stimulus && s.trial_index == index)
            .await
            .unwrap();
        time::sleep(Duration::from_millis(rt_for(index))).await;
        match controller.respond(trial.color).await {
            ResponseOutcome::Scored(scored) => assert!(scored.is_correct),
            other => panic!("trial {index}: unexpected {other:?}"),
        }
    }
    rx.wait_for(|s| s.phase == RunnerPhase::Complete).await.unwrap();

    assert_eq!(controller.flush(lab.db()).await.unwrap(), 36);
    let stored: Vec<StroopResult> =
        lab.db().results_for_session(&context.session_id).await.unwrap();
    assert_eq!(stored.len(), 36);
    assert!(stored.iter().all(|r| r.is_correct));

    let summary = stroop_summary(&stored);
    assert_eq!(summary.accuracy, 100.0);
    assert_eq!(summary.correct_trials, 36);
    assert!((summary.congruent_mean - expected_congruent).abs() < 1e-6);
    assert!((summary.incongruent_mean - expected_incongruent).abs() < 1e-6);
    assert!(
        (summary.stroop_effect - (expected_incongruent - expected_congruent)).abs() < 1e-6
    );
}
