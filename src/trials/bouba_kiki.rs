//! Bouba-Kiki sound symbolism.
//!
//! Main trials pair a pseudo-word with one rounded and one spiky shape; the
//! participant picks the shape that fits the word. Control trials show a
//! single shape and ask which name fits it.

use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampling::{cycle_to, shuffle};
use crate::trials::config::TrialConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ShapeType {
    Rounded,
    Spiky,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rounded => "rounded",
            ShapeType::Spiky => "spiky",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rounded" => Some(ShapeType::Rounded),
            "spiky" => Some(ShapeType::Spiky),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

/// Answer to a control question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ShapeName {
    Bouba,
    Kiki,
}

impl ShapeName {
    /// Bouba names rounded shapes, kiki names spiky ones.
    pub fn category(&self) -> ShapeType {
        match self {
            ShapeName::Bouba => ShapeType::Rounded,
            ShapeName::Kiki => ShapeType::Spiky,
        }
    }

    /// Legacy column encoding: bouba is stored as left, kiki as right.
    pub fn legacy_side(&self) -> Side {
        match self {
            ShapeName::Bouba => Side::Left,
            ShapeName::Kiki => Side::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusWord {
    pub text: &'static str,
    pub hebrew_text: &'static str,
    pub shape_type: ShapeType,
}

pub const WORDS: [StimulusWord; 4] = [
    StimulusWord { text: "BOUBA", hebrew_text: "בובה", shape_type: ShapeType::Rounded },
    StimulusWord { text: "KIKI", hebrew_text: "קיקי", shape_type: ShapeType::Spiky },
    StimulusWord { text: "MALUMA", hebrew_text: "מלומה", shape_type: ShapeType::Rounded },
    StimulusWord { text: "TAKETE", hebrew_text: "טקטה", shape_type: ShapeType::Spiky },
];

pub const ROUNDED_SHAPES: [&str; 6] = [
    "rounded_01.png",
    "rounded_02.png",
    "rounded_03.png",
    "rounded_04.png",
    "rounded_05.png",
    "rounded_06.png",
];

pub const SPIKY_SHAPES: [&str; 6] = [
    "spiky_01.png",
    "spiky_02.png",
    "spiky_03.png",
    "spiky_04.png",
    "spiky_05.png",
    "spiky_06.png",
];

pub const SHAPE_BASE_PATH: &str = "/bouba-kiki/shapes/";

/// Marker stored in the word column of control trials.
pub const CONTROL_WORD: &str = "CONTROL";

const CONTROL_ID_BASE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoubaKikiTrial {
    Main(MainTrial),
    Control(ControlTrial),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainTrial {
    pub id: u32,
    pub word: &'static str,
    pub word_type: ShapeType,
    pub left_shape: &'static str,
    pub right_shape: &'static str,
    pub left_shape_type: ShapeType,
    pub right_shape_type: ShapeType,
}

impl MainTrial {
    pub fn shape_type_at(&self, side: Side) -> ShapeType {
        match side {
            Side::Left => self.left_shape_type,
            Side::Right => self.right_shape_type,
        }
    }

    pub fn shape_at(&self, side: Side) -> &'static str {
        match side {
            Side::Left => self.left_shape,
            Side::Right => self.right_shape,
        }
    }
}

/// A single shape, shown in the left slot; the right slot stays empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlTrial {
    pub id: u32,
    pub shape: &'static str,
    pub shape_type: ShapeType,
}

impl BoubaKikiTrial {
    pub fn id(&self) -> u32 {
        match self {
            BoubaKikiTrial::Main(trial) => trial.id,
            BoubaKikiTrial::Control(trial) => trial.id,
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, BoubaKikiTrial::Control(_))
    }

    /// The category a correct answer points at.
    pub fn expected_type(&self) -> ShapeType {
        match self {
            BoubaKikiTrial::Main(trial) => trial.word_type,
            BoubaKikiTrial::Control(trial) => trial.shape_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoubaKikiResponse {
    /// Side picked on a main trial.
    Choice(Side),
    /// Name given on a control trial.
    Name(ShapeName),
}

pub fn main_trials<R: Rng + ?Sized>(config: &TrialConfig, rng: &mut R) -> Vec<MainTrial> {
    let words = shuffle(&cycle_to(&WORDS, config.bouba_main_trials), rng);
    let rounded_pool = cycle_to(&shuffle(&ROUNDED_SHAPES, rng), words.len());
    let spiky_pool = cycle_to(&shuffle(&SPIKY_SHAPES, rng), words.len());

    words
        .iter()
        .zip(rounded_pool.iter().zip(spiky_pool.iter()))
        .enumerate()
        .map(|(index, (word, (rounded, spiky)))| {
            let rounded_on_left = rng.gen_bool(0.5);
            let (left, right, left_type, right_type) = if rounded_on_left {
                (*rounded, *spiky, ShapeType::Rounded, ShapeType::Spiky)
            } else {
                (*spiky, *rounded, ShapeType::Spiky, ShapeType::Rounded)
            };

            MainTrial {
                id: index as u32 + 1,
                word: word.text,
                word_type: word.shape_type,
                left_shape: left,
                right_shape: right,
                left_shape_type: left_type,
                right_shape_type: right_type,
            }
        })
        .collect()
}

/// The first `bouba_control_per_type` shapes of each pool, shuffled.
pub fn control_trials<R: Rng + ?Sized>(
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Vec<ControlTrial>> {
    let per_type = config.bouba_control_per_type;
    if per_type > ROUNDED_SHAPES.len() || per_type > SPIKY_SHAPES.len() {
        bail!(
            "only {} control shapes available per type, asked for {per_type}",
            ROUNDED_SHAPES.len()
        );
    }

    let shapes: Vec<(&'static str, ShapeType)> = ROUNDED_SHAPES[..per_type]
        .iter()
        .map(|shape| (*shape, ShapeType::Rounded))
        .chain(SPIKY_SHAPES[..per_type].iter().map(|shape| (*shape, ShapeType::Spiky)))
        .collect();

    Ok(shuffle(&shapes, rng)
        .into_iter()
        .enumerate()
        .map(|(index, (shape, shape_type))| ControlTrial {
            id: CONTROL_ID_BASE + index as u32,
            shape,
            shape_type,
        })
        .collect())
}

/// Main and control trials interleaved by a single shuffle.
pub fn all_trials<R: Rng + ?Sized>(
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Vec<BoubaKikiTrial>> {
    let mut trials: Vec<BoubaKikiTrial> = main_trials(config, rng)
        .into_iter()
        .map(BoubaKikiTrial::Main)
        .collect();
    trials.extend(control_trials(config, rng)?.into_iter().map(BoubaKikiTrial::Control));

    Ok(shuffle(&trials, rng))
}

/// Scores by category. A side answer on a control trial (or a name answer on
/// a main trial) is a protocol mismatch and returns `None`.
pub fn is_correct_response(trial: &BoubaKikiTrial, response: BoubaKikiResponse) -> Option<bool> {
    match (trial, response) {
        (BoubaKikiTrial::Main(main), BoubaKikiResponse::Choice(side)) => {
            Some(main.shape_type_at(side) == main.word_type)
        }
        (BoubaKikiTrial::Control(control), BoubaKikiResponse::Name(name)) => {
            Some(name.category() == control.shape_type)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn main_trials_pair_one_shape_of_each_type() {
        let mut rng = StdRng::seed_from_u64(21);
        let trials = main_trials(&TrialConfig::default(), &mut rng);
        assert_eq!(trials.len(), 12);
        for trial in &trials {
            assert_ne!(trial.left_shape_type, trial.right_shape_type);
            assert!(trial.left_shape.starts_with(trial.left_shape_type.as_str()));
            assert!(trial.right_shape.starts_with(trial.right_shape_type.as_str()));
        }
    }

    #[test]
    fn words_are_cycled_evenly() {
        let mut rng = StdRng::seed_from_u64(2);
        let trials = main_trials(&TrialConfig::default(), &mut rng);
        for word in WORDS {
            assert_eq!(trials.iter().filter(|t| t.word == word.text).count(), 3);
        }
    }

    #[test]
    fn shapes_do_not_repeat_until_the_pool_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(8);
        let trials = main_trials(&TrialConfig::default(), &mut rng);
        let first_six: HashSet<&str> = trials[..6]
            .iter()
            .map(|t| {
                let side = if t.left_shape_type == ShapeType::Rounded {
                    Side::Left
                } else {
                    Side::Right
                };
                t.shape_at(side)
            })
            .collect();
        assert_eq!(first_six.len(), 6);
    }

    #[test]
    fn control_trials_use_the_first_shapes() {
        let mut rng = StdRng::seed_from_u64(4);
        let trials = control_trials(&TrialConfig::default(), &mut rng).unwrap();
        assert_eq!(trials.len(), 4);
        let shapes: HashSet<&str> = trials.iter().map(|t| t.shape).collect();
        let expected: HashSet<&str> =
            ["rounded_01.png", "rounded_02.png", "spiky_01.png", "spiky_02.png"].into();
        assert_eq!(shapes, expected);
        assert!(trials.iter().all(|t| t.id >= 100));
    }

    #[test]
    fn control_quota_cannot_exceed_pool() {
        let mut rng = StdRng::seed_from_u64(4);
        let config = TrialConfig {
            bouba_control_per_type: 7,
            ..TrialConfig::default()
        };
        assert!(control_trials(&config, &mut rng).is_err());
    }

    #[test]
    fn all_trials_interleave_both_kinds() {
        let mut rng = StdRng::seed_from_u64(13);
        let trials = all_trials(&TrialConfig::default(), &mut rng).unwrap();
        assert_eq!(trials.len(), 16);
        assert_eq!(trials.iter().filter(|t| t.is_control()).count(), 4);
    }

    #[test]
    fn main_trial_scoring_follows_the_word() {
        let trial = BoubaKikiTrial::Main(MainTrial {
            id: 1,
            word: "KIKI",
            word_type: ShapeType::Spiky,
            left_shape: "rounded_01.png",
            right_shape: "spiky_01.png",
            left_shape_type: ShapeType::Rounded,
            right_shape_type: ShapeType::Spiky,
        });
        assert_eq!(is_correct_response(&trial, BoubaKikiResponse::Choice(Side::Right)), Some(true));
        assert_eq!(is_correct_response(&trial, BoubaKikiResponse::Choice(Side::Left)), Some(false));
        assert_eq!(is_correct_response(&trial, BoubaKikiResponse::Name(ShapeName::Kiki)), None);
    }

    #[test]
    fn control_scoring_maps_names_to_categories() {
        let trial = BoubaKikiTrial::Control(ControlTrial {
            id: 100,
            shape: "rounded_02.png",
            shape_type: ShapeType::Rounded,
        });
        let named = |name| is_correct_response(&trial, BoubaKikiResponse::Name(name));
        assert_eq!(named(ShapeName::Bouba), Some(true));
        assert_eq!(named(ShapeName::Kiki), Some(false));
        assert_eq!(ShapeName::Kiki.legacy_side(), Side::Right);
    }
}
