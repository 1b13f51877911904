pub mod bouba_kiki;
pub mod config;
pub mod drm;
pub mod rotation;
pub mod scanning;
pub mod stroop;

use anyhow::Result;
use log::debug;
use rand::Rng;
use serde_json::Value;

pub use config::TrialConfig;

/// Every sequence a generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    StroopPractice,
    StroopMain,
    BoubaKiki,
    DrmStudy,
    DrmTest,
    Scanning,
    RotationPractice,
    RotationMain,
}

pub const SEQUENCE_KINDS: [SequenceKind; 8] = [
    SequenceKind::StroopPractice,
    SequenceKind::StroopMain,
    SequenceKind::BoubaKiki,
    SequenceKind::DrmStudy,
    SequenceKind::DrmTest,
    SequenceKind::Scanning,
    SequenceKind::RotationPractice,
    SequenceKind::RotationMain,
];

impl SequenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::StroopPractice => "stroop-practice",
            SequenceKind::StroopMain => "stroop",
            SequenceKind::BoubaKiki => "bouba-kiki",
            SequenceKind::DrmStudy => "drm-study",
            SequenceKind::DrmTest => "drm-test",
            SequenceKind::Scanning => "scanning",
            SequenceKind::RotationPractice => "rotation-practice",
            SequenceKind::RotationMain => "rotation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        SEQUENCE_KINDS
            .into_iter()
            .find(|kind| kind.as_str() == value)
    }
}

/// Builds one sequence and returns it as JSON.
pub fn generate_json<R: Rng + ?Sized>(
    kind: SequenceKind,
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Value> {
    let value = match kind {
        SequenceKind::StroopPractice => serde_json::to_value(stroop::practice_trials())?,
        SequenceKind::StroopMain => serde_json::to_value(stroop::main_trials(rng))?,
        SequenceKind::BoubaKiki => serde_json::to_value(bouba_kiki::all_trials(config, rng)?)?,
        SequenceKind::DrmStudy => {
            serde_json::to_value(drm::study_sequence(&drm::WORD_LISTS, rng))?
        }
        SequenceKind::DrmTest => serde_json::to_value(drm::test_sequence(
            &drm::WORD_LISTS,
            &drm::UNRELATED_POOL,
            config,
            rng,
        )?)?,
        SequenceKind::Scanning => {
            serde_json::to_value(scanning::generate_trials(&scanning::LANDMARKS, config, rng)?)?
        }
        SequenceKind::RotationPractice => serde_json::to_value(rotation::practice_trials(rng))?,
        SequenceKind::RotationMain => serde_json::to_value(rotation::main_trials(config, rng)?)?,
    };

    let count = value.as_array().map(Vec::len).unwrap_or(0);
    debug!("Generated {} sequence with {} trials", kind.as_str(), count);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn kinds_round_trip_through_their_names() {
        for kind in SEQUENCE_KINDS {
            assert_eq!(SequenceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SequenceKind::parse("stroop-main"), None);
    }

    #[test]
    fn every_kind_generates_a_non_empty_array() {
        let config = TrialConfig::default();
        for kind in SEQUENCE_KINDS {
            let mut rng = StdRng::seed_from_u64(11);
            let value = generate_json(kind, &config, &mut rng).unwrap();
            let trials = value.as_array().unwrap();
            assert!(!trials.is_empty(), "{} was empty", kind.as_str());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let config = TrialConfig::default();
        let run = |seed| {
            generate_json(SequenceKind::RotationMain, &config, &mut StdRng::seed_from_u64(seed))
                .unwrap()
        };
        let a = run(4);
        let b = run(4);
        assert_eq!(a, b);
    }
}
