//! Kosslyn island-map scanning.
//!
//! Every ordered pair of distinct landmarks is a candidate trial. Pairs are
//! sorted by distance and split into short, medium and long terciles so the
//! selected set covers the whole distance range.

use anyhow::Result;
use rand::Rng;
use serde::Serialize;

use crate::sampling::{contiguous_strata, sample, shuffle};
use crate::trials::config::TrialConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub id: &'static str,
    pub name: &'static str,
    pub name_he: &'static str,
    /// Position on the 0-100 map grid.
    pub x: f64,
    pub y: f64,
}

pub const LANDMARKS: [Landmark; 7] = [
    Landmark { id: "hut", name: "Hut", name_he: "צריף", x: 15.0, y: 25.0 },
    Landmark { id: "tree", name: "Tree", name_he: "עץ", x: 40.0, y: 15.0 },
    Landmark { id: "well", name: "Well", name_he: "באר", x: 75.0, y: 20.0 },
    Landmark { id: "rock", name: "Rock", name_he: "סלע", x: 25.0, y: 55.0 },
    Landmark { id: "lake", name: "Lake", name_he: "אגם", x: 55.0, y: 50.0 },
    Landmark { id: "beach", name: "Beach", name_he: "חוף", x: 85.0, y: 60.0 },
    Landmark { id: "cave", name: "Cave", name_he: "מערה", x: 45.0, y: 80.0 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DistanceBand {
    Short,
    Medium,
    Long,
}

const BANDS: [DistanceBand; 3] = [DistanceBand::Short, DistanceBand::Medium, DistanceBand::Long];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanningTrial {
    pub id: u32,
    pub from_landmark: Landmark,
    pub to_landmark: Landmark,
    pub distance: f64,
    pub band: DistanceBand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkPair {
    pub from: Landmark,
    pub to: Landmark,
    pub distance: f64,
}

pub fn distance(from: &Landmark, to: &Landmark) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    (dx * dx + dy * dy).sqrt()
}

/// Ordered pairs of distinct landmarks, shortest first. Ties keep enumeration order.
pub fn sorted_pairs(landmarks: &[Landmark]) -> Vec<LandmarkPair> {
    let mut pairs: Vec<LandmarkPair> = landmarks
        .iter()
        .enumerate()
        .flat_map(|(i, from)| {
            landmarks
                .iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(move |(_, to)| LandmarkPair {
                    from: *from,
                    to: *to,
                    distance: distance(from, to),
                })
        })
        .collect();

    pairs.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    pairs
}

pub fn generate_trials<R: Rng + ?Sized>(
    landmarks: &[Landmark],
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Vec<ScanningTrial>> {
    let pairs = sorted_pairs(landmarks);

    let mut selected = Vec::with_capacity(config.scanning_per_tercile * 3);
    for (band, tercile) in BANDS.into_iter().zip(contiguous_strata(&pairs, 3)) {
        let drawn = sample(&tercile, config.scanning_per_tercile, rng)?;
        selected.extend(drawn.into_iter().map(|pair| (band, pair)));
    }

    Ok(shuffle(&selected, rng)
        .into_iter()
        .enumerate()
        .map(|(index, (band, pair))| ScanningTrial {
            id: index as u32 + 1,
            from_landmark: pair.from,
            to_landmark: pair.to,
            distance: pair.distance,
            band,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn forty_two_ordered_pairs() {
        let pairs = sorted_pairs(&LANDMARKS);
        assert_eq!(pairs.len(), 42);
        assert!(pairs.iter().all(|pair| pair.from.id != pair.to.id));
        assert!(pairs.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn distance_is_euclidean() {
        let hut = LANDMARKS[0];
        let rock = LANDMARKS[3];
        assert!((distance(&hut, &rock) - (10.0f64 * 10.0 + 30.0 * 30.0).sqrt()).abs() < 1e-9);
        assert_eq!(distance(&hut, &rock), distance(&rock, &hut));
    }

    #[test]
    fn twenty_one_trials_seven_per_band() {
        let mut rng = StdRng::seed_from_u64(1973);
        let trials = generate_trials(&LANDMARKS, &TrialConfig::default(), &mut rng).unwrap();
        assert_eq!(trials.len(), 21);
        for band in BANDS {
            assert_eq!(trials.iter().filter(|t| t.band == band).count(), 7);
        }
        for (index, trial) in trials.iter().enumerate() {
            assert_eq!(trial.id as usize, index + 1);
        }
    }

    #[test]
    fn bands_do_not_overlap_in_distance() {
        let mut rng = StdRng::seed_from_u64(4);
        let trials = generate_trials(&LANDMARKS, &TrialConfig::default(), &mut rng).unwrap();
        let max_of = |band: DistanceBand| {
            trials
                .iter()
                .filter(|t| t.band == band)
                .map(|t| t.distance)
                .fold(f64::MIN, f64::max)
        };
        let min_of = |band: DistanceBand| {
            trials
                .iter()
                .filter(|t| t.band == band)
                .map(|t| t.distance)
                .fold(f64::MAX, f64::min)
        };
        assert!(max_of(DistanceBand::Short) <= min_of(DistanceBand::Medium));
        assert!(max_of(DistanceBand::Medium) <= min_of(DistanceBand::Long));
    }

    #[test]
    fn selected_pairs_are_distinct() {
        let mut rng = StdRng::seed_from_u64(12);
        let trials = generate_trials(&LANDMARKS, &TrialConfig::default(), &mut rng).unwrap();
        let mut keys: Vec<(&str, &str)> = trials
            .iter()
            .map(|t| (t.from_landmark.id, t.to_landmark.id))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 21);
    }

    #[test]
    fn quota_above_tercile_size_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = TrialConfig {
            scanning_per_tercile: 15,
            ..TrialConfig::default()
        };
        assert!(generate_trials(&LANDMARKS, &config, &mut rng).is_err());
    }
}
