//! Session context and phase sequencing.
//!
//! A `SessionContext` is created once, when the participant submits the
//! intro form, and handed to every later phase. It is never mutated in
//! place; phases that need to carry data forward return an updated copy.

use anyhow::{bail, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::db::models::ScanningResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Experiment {
    Stroop,
    BoubaKiki,
    Drm,
    MentalRep,
}

pub const EXPERIMENTS: [Experiment; 4] = [
    Experiment::Stroop,
    Experiment::BoubaKiki,
    Experiment::Drm,
    Experiment::MentalRep,
];

impl Experiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Experiment::Stroop => "stroop",
            Experiment::BoubaKiki => "bouba_kiki",
            Experiment::Drm => "drm",
            Experiment::MentalRep => "mental_rep",
        }
    }

    /// Accepts the stored form plus the dashed spelling used on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        EXPERIMENTS
            .into_iter()
            .find(|experiment| experiment.as_str() == normalized)
    }

    pub fn phases(&self) -> &'static [Phase] {
        match self {
            Experiment::Stroop => &[Phase::Intro, Phase::Practice, Phase::Main, Phase::Thanks],
            Experiment::BoubaKiki => &[Phase::Intro, Phase::Main, Phase::Results, Phase::Thanks],
            Experiment::Drm => &[Phase::Intro, Phase::Study, Phase::Test, Phase::Thanks],
            Experiment::MentalRep => &[
                Phase::Intro,
                Phase::ScanningStudy,
                Phase::ScanningTest,
                Phase::RotationPractice,
                Phase::RotationMain,
                Phase::Results,
                Phase::Thanks,
            ],
        }
    }

    pub fn next_phase(&self, current: Phase) -> Option<Phase> {
        let phases = self.phases();
        phases
            .iter()
            .position(|phase| *phase == current)
            .and_then(|index| phases.get(index + 1))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    He,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::He => "he",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "he" => Some(Language::He),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Intro,
    Practice,
    Main,
    Study,
    Test,
    ScanningStudy,
    ScanningTest,
    RotationPractice,
    RotationMain,
    Results,
    Thanks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub session_id: String,
    pub experiment: Experiment,
    pub participant_name: String,
    pub language: Language,
    /// Mental-rep only: scanning rows held back until rotation finishes.
    #[serde(default)]
    pub pending_scanning: Vec<ScanningResult>,
}

impl SessionContext {
    pub fn new(
        session_id: String,
        experiment: Experiment,
        participant_name: String,
        language: Language,
    ) -> Self {
        Self {
            session_id,
            experiment,
            participant_name,
            language,
            pending_scanning: Vec::new(),
        }
    }

    pub fn with_scanning_results(&self, results: Vec<ScanningResult>) -> Self {
        Self {
            pending_scanning: results,
            ..self.clone()
        }
    }

    pub fn with_language(&self, language: Language) -> Self {
        Self {
            language,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEntry {
    Proceed,
    RedirectToIntro,
}

/// Every phase past the intro needs a session for the same experiment.
pub fn enter_phase(
    context: Option<&SessionContext>,
    experiment: Experiment,
    phase: Phase,
) -> PhaseEntry {
    if phase == Phase::Intro {
        return PhaseEntry::Proceed;
    }

    match context {
        Some(ctx) if ctx.experiment == experiment && !ctx.session_id.is_empty() => {
            PhaseEntry::Proceed
        }
        _ => {
            warn!(
                "No {} session for {:?}, redirecting to intro",
                experiment.as_str(),
                phase
            );
            PhaseEntry::RedirectToIntro
        }
    }
}

/// Trims the name and rejects blanks.
pub fn normalize_participant_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("participant name must not be empty");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(experiment: Experiment) -> SessionContext {
        SessionContext::new("abc".into(), experiment, "Dana".into(), Language::He)
    }

    #[test]
    fn intro_is_always_reachable() {
        assert_eq!(enter_phase(None, Experiment::Drm, Phase::Intro), PhaseEntry::Proceed);
    }

    #[test]
    fn missing_session_redirects() {
        assert_eq!(
            enter_phase(None, Experiment::Stroop, Phase::Main),
            PhaseEntry::RedirectToIntro
        );
        let ctx = context(Experiment::Stroop);
        assert_eq!(
            enter_phase(Some(&ctx), Experiment::Drm, Phase::Test),
            PhaseEntry::RedirectToIntro
        );
        assert_eq!(
            enter_phase(Some(&ctx), Experiment::Stroop, Phase::Main),
            PhaseEntry::Proceed
        );
    }

    #[test]
    fn empty_session_id_redirects() {
        let ctx = SessionContext::new(String::new(), Experiment::Drm, "x".into(), Language::En);
        assert_eq!(
            enter_phase(Some(&ctx), Experiment::Drm, Phase::Study),
            PhaseEntry::RedirectToIntro
        );
    }

    #[test]
    fn phase_sequences() {
        assert_eq!(Experiment::Stroop.next_phase(Phase::Practice), Some(Phase::Main));
        assert_eq!(
            Experiment::MentalRep.next_phase(Phase::ScanningTest),
            Some(Phase::RotationPractice)
        );
        assert_eq!(Experiment::Drm.next_phase(Phase::Thanks), None);
        assert_eq!(Experiment::Drm.next_phase(Phase::Practice), None);
    }

    #[test]
    fn context_updates_return_copies() {
        let ctx = context(Experiment::MentalRep);
        let updated = ctx.with_language(Language::En);
        assert_eq!(ctx.language, Language::He);
        assert_eq!(updated.language, Language::En);
        assert_eq!(updated.session_id, ctx.session_id);
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(normalize_participant_name("  Noa ").unwrap(), "Noa");
        assert!(normalize_participant_name("   ").is_err());
    }

    #[test]
    fn experiment_names_round_trip() {
        for experiment in EXPERIMENTS {
            assert_eq!(Experiment::parse(experiment.as_str()), Some(experiment));
        }
        assert_eq!(Experiment::parse("bouba-kiki"), Some(Experiment::BoubaKiki));
        assert_eq!(Experiment::parse("nope"), None);
        assert_eq!(Language::parse("HE"), Some(Language::He));
    }
}
