//! Shepard-Metzler mental rotation.
//!
//! Each trial shows one figure twice at two canonical angles; "different"
//! trials render the right copy mirrored. Main trials are balanced over
//! rotation difference x same/different.

use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampling::{sample, shuffle};
use crate::trials::config::TrialConfig;

pub const ROTATION_ANGLES: [u16; 4] = [0, 60, 120, 180];
pub const NUM_FIGURES: usize = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SameDifferent {
    Same,
    Different,
}

impl SameDifferent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameDifferent::Same => "same",
            SameDifferent::Different => "different",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "same" => Some(SameDifferent::Same),
            "different" => Some(SameDifferent::Different),
            _ => None,
        }
    }

    /// `S` for same, `D` for different.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "s" => Some(SameDifferent::Same),
            "d" => Some(SameDifferent::Different),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationTrial {
    pub id: u32,
    pub figure_id: String,
    pub left_angle: u16,
    pub right_angle: u16,
    pub is_same: bool,
    pub rotation_difference: u16,
    pub is_practice: bool,
}

pub fn figure_ids() -> Vec<String> {
    (1..=NUM_FIGURES).map(|n| format!("figure_{n}")).collect()
}

/// Shortest angular distance between two orientations, in 0..=180.
pub fn rotation_difference(left: u16, right: u16) -> u16 {
    let diff = left.abs_diff(right) % 360;
    if diff > 180 {
        360 - diff
    } else {
        diff
    }
}

fn trial(
    id: u32,
    figure_id: &str,
    left: u16,
    right: u16,
    is_same: bool,
    is_practice: bool,
) -> RotationTrial {
    RotationTrial {
        id,
        figure_id: figure_id.to_string(),
        left_angle: left,
        right_angle: right,
        is_same,
        rotation_difference: rotation_difference(left, right),
        is_practice,
    }
}

/// Three same and two different trials from fixed configurations, shuffled.
pub fn practice_trials<R: Rng + ?Sized>(rng: &mut R) -> Vec<RotationTrial> {
    const SAME: [(u16, u16); 3] = [(0, 60), (0, 120), (60, 180)];
    const DIFFERENT: [(u16, u16); 2] = [(0, 60), (0, 120)];

    let figures = figure_ids();
    let mut trials = Vec::with_capacity(SAME.len() + DIFFERENT.len());

    for (i, (left, right)) in SAME.iter().enumerate() {
        let figure = &figures[i % figures.len()];
        trials.push(trial(i as u32 + 1, figure, *left, *right, true, true));
    }
    for (i, (left, right)) in DIFFERENT.iter().enumerate() {
        let figure = &figures[(i + SAME.len()) % figures.len()];
        let id = (SAME.len() + i) as u32 + 1;
        trials.push(trial(id, figure, *left, *right, false, true));
    }

    shuffle(&trials, rng)
}

/// Every (figure, left, right) combination except equal non-zero angles,
/// in a same and a different version.
pub fn candidate_trials() -> Vec<RotationTrial> {
    let mut candidates = Vec::new();
    for figure in figure_ids() {
        for left in ROTATION_ANGLES {
            for right in ROTATION_ANGLES {
                if left == right && left != 0 {
                    continue;
                }
                candidates.push(trial(0, &figure, left, right, true, false));
                candidates.push(trial(0, &figure, left, right, false, false));
            }
        }
    }
    candidates
}

/// `rotation_per_cell` trials from each of the 8 difference x same/different cells.
pub fn main_trials<R: Rng + ?Sized>(
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Vec<RotationTrial>> {
    let candidates = candidate_trials();

    let mut selected = Vec::with_capacity(config.rotation_per_cell * 8);
    for difference in ROTATION_ANGLES {
        for is_same in [true, false] {
            let cell: Vec<RotationTrial> = candidates
                .iter()
                .filter(|c| c.rotation_difference == difference && c.is_same == is_same)
                .cloned()
                .collect();
            selected.extend(sample(&cell, config.rotation_per_cell, rng)?);
        }
    }

    Ok(shuffle(&selected, rng)
        .into_iter()
        .enumerate()
        .map(|(index, trial)| RotationTrial {
            id: index as u32 + 1,
            ..trial
        })
        .collect())
}

pub fn is_correct_response(trial: &RotationTrial, response: SameDifferent) -> bool {
    trial.is_same == (response == SameDifferent::Same)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn differences_wrap_at_180() {
        assert_eq!(rotation_difference(0, 0), 0);
        assert_eq!(rotation_difference(180, 60), 120);
        assert_eq!(rotation_difference(0, 180), 180);
        assert_eq!(rotation_difference(300, 0), 60);
    }

    #[test]
    fn cell_sizes_per_figure() {
        let candidates = candidate_trials();
        // 13 angle pairs per figure, each in two versions
        assert_eq!(candidates.len(), NUM_FIGURES * 13 * 2);

        let count = |difference: u16| {
            candidates
                .iter()
                .filter(|c| c.rotation_difference == difference && c.is_same)
                .count()
        };
        assert_eq!(count(0), NUM_FIGURES);
        assert_eq!(count(60), NUM_FIGURES * 6);
        assert_eq!(count(120), NUM_FIGURES * 4);
        assert_eq!(count(180), NUM_FIGURES * 2);
    }

    #[test]
    fn main_block_is_balanced() {
        let mut rng = StdRng::seed_from_u64(1971);
        let trials = main_trials(&TrialConfig::default(), &mut rng).unwrap();
        assert_eq!(trials.len(), 40);

        for difference in ROTATION_ANGLES {
            for is_same in [true, false] {
                let cell = trials
                    .iter()
                    .filter(|t| t.rotation_difference == difference && t.is_same == is_same)
                    .count();
                assert_eq!(cell, 5, "cell {difference}/{is_same}");
            }
        }
        assert!(trials.iter().all(|t| !t.is_practice));
        assert!(trials.iter().enumerate().all(|(i, t)| t.id as usize == i + 1));
    }

    #[test]
    fn oversized_cells_fail() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = TrialConfig {
            rotation_per_cell: 9,
            ..TrialConfig::default()
        };
        // the zero-difference cell only has one candidate per figure
        assert!(main_trials(&config, &mut rng).is_err());
    }

    #[test]
    fn practice_block() {
        let mut rng = StdRng::seed_from_u64(8);
        let trials = practice_trials(&mut rng);
        assert_eq!(trials.len(), 5);
        assert_eq!(trials.iter().filter(|t| t.is_same).count(), 3);
        assert!(trials.iter().all(|t| t.is_practice));

        let different: Vec<&str> = trials
            .iter()
            .filter(|t| !t.is_same)
            .map(|t| t.figure_id.as_str())
            .collect();
        assert!(different.contains(&"figure_4"));
        assert!(different.contains(&"figure_5"));
    }

    #[test]
    fn scoring_and_keys() {
        let same = trial(1, "figure_1", 0, 60, true, false);
        assert!(is_correct_response(&same, SameDifferent::Same));
        assert!(!is_correct_response(&same, SameDifferent::Different));
        assert_eq!(SameDifferent::from_key("D"), Some(SameDifferent::Different));
        assert_eq!(SameDifferent::from_key("x"), None);
    }
}
