//! Deese-Roediger-McDermott false memory.
//!
//! Study: every list's words, flattened and shuffled so themes interleave.
//! Test: per list, studied probes drawn evenly from the early, middle and
//! late serial-position bands, the list's critical lure, and distractors;
//! then one shuffle over everything.

use std::collections::HashSet;

use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampling::{band_ranges, sample, shuffle};
use crate::trials::config::TrialConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordList {
    pub theme: &'static str,
    pub theme_he: &'static str,
    /// Never shown during study.
    pub critical_lure: &'static str,
    pub study_words: &'static [&'static str],
    pub related_distractors: &'static [&'static str],
}

pub const WORD_LISTS: [WordList; 6] = [
    WordList {
        theme: "Sleep",
        theme_he: "שינה",
        critical_lure: "sleep",
        study_words: &[
            "bed", "rest", "awake", "tired", "dream", "wake", "snooze", "blanket", "doze",
            "slumber", "snore", "nap",
        ],
        related_distractors: &["peace", "night", "comfort", "relax"],
    },
    WordList {
        theme: "Doctor",
        theme_he: "רופא",
        critical_lure: "doctor",
        study_words: &[
            "nurse", "sick", "medicine", "health", "hospital", "dentist", "physician", "ill",
            "patient", "office", "stethoscope", "surgeon",
        ],
        related_distractors: &["medical", "emergency", "prescription", "diagnosis"],
    },
    WordList {
        theme: "Chair",
        theme_he: "כיסא",
        critical_lure: "chair",
        study_words: &[
            "table", "sit", "legs", "seat", "couch", "desk", "recliner", "sofa", "wood",
            "cushion", "swivel", "stool",
        ],
        related_distractors: &["armchair", "armrest", "rocker", "leather"],
    },
    WordList {
        theme: "Sweet",
        theme_he: "מתוק",
        critical_lure: "sweet",
        study_words: &[
            "sour", "candy", "sugar", "bitter", "good", "taste", "tooth", "nice", "honey", "soda",
            "chocolate", "cake",
        ],
        related_distractors: &["delicious", "pie", "cookie", "cream"],
    },
    WordList {
        theme: "Mountain",
        theme_he: "הר",
        critical_lure: "mountain",
        study_words: &[
            "hill", "valley", "climb", "summit", "top", "molehill", "peak", "range", "altitude",
            "high", "cliff", "steep",
        ],
        related_distractors: &["everest", "elevation", "ridge", "alps"],
    },
    WordList {
        theme: "Cold",
        theme_he: "קר",
        critical_lure: "cold",
        study_words: &[
            "hot", "snow", "warm", "winter", "ice", "wet", "frigid", "chilly", "heat", "weather",
            "freeze", "air",
        ],
        related_distractors: &["glacier", "icy", "chill", "freezing"],
    },
];

/// Unrelated distractors, shared by all lists and unrelated to every theme.
pub const UNRELATED_POOL: [&str; 48] = [
    "pen", "cup", "door", "book", "tree", "phone", "shirt", "cloud", "fish", "lamp", "stone",
    "paper", "wind", "road", "keyboard", "mirror", "towel", "coin", "window", "orange", "grass",
    "wheel", "pencil", "hat", "boot", "notebook", "picture", "scissors", "balloon", "flower",
    "bottle", "brush", "candle", "leaf", "soap", "nail", "bucket", "ladder", "button", "spoon",
    "carpet", "wallet", "zipper", "ribbon", "kettle", "helmet", "envelope", "basket",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Studied,
    CriticalLure,
    RelatedDistractor,
    UnrelatedDistractor,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Studied => "studied",
            ItemType::CriticalLure => "critical_lure",
            ItemType::RelatedDistractor => "related_distractor",
            ItemType::UnrelatedDistractor => "unrelated_distractor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "studied" => Some(ItemType::Studied),
            "critical_lure" => Some(ItemType::CriticalLure),
            "related_distractor" => Some(ItemType::RelatedDistractor),
            "unrelated_distractor" => Some(ItemType::UnrelatedDistractor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OldNew {
    Old,
    New,
}

impl OldNew {
    pub fn as_str(&self) -> &'static str {
        match self {
            OldNew::Old => "old",
            OldNew::New => "new",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "old" => Some(OldNew::Old),
            "new" => Some(OldNew::New),
            _ => None,
        }
    }
}

pub const CONFIDENCE_SCALE: std::ops::RangeInclusive<u8> = 1..=4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTrial {
    pub word: &'static str,
    pub list_theme: &'static str,
    /// 1-based position within the original list.
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestItem {
    pub word: &'static str,
    pub item_type: ItemType,
    pub list_theme: &'static str,
    pub serial_position: Option<u32>,
}

/// Lures must stay unseen and the shared pool must not overlap any list.
pub fn validate_lists(lists: &[WordList], pool: &[&str]) -> Result<()> {
    let mut list_words: HashSet<&str> = HashSet::new();
    for list in lists {
        if list.study_words.contains(&list.critical_lure) {
            bail!(
                "critical lure '{}' appears in the {} study list",
                list.critical_lure,
                list.theme
            );
        }
        list_words.insert(list.critical_lure);
        list_words.extend(list.study_words.iter().copied());
        list_words.extend(list.related_distractors.iter().copied());
    }

    if let Some(word) = pool.iter().find(|word| list_words.contains(*word)) {
        bail!("unrelated distractor '{word}' belongs to a themed list");
    }

    Ok(())
}

pub fn study_sequence<R: Rng + ?Sized>(lists: &[WordList], rng: &mut R) -> Vec<StudyTrial> {
    let flattened: Vec<StudyTrial> = lists
        .iter()
        .flat_map(|list| {
            list.study_words
                .iter()
                .enumerate()
                .map(move |(index, word)| StudyTrial {
                    word: *word,
                    list_theme: list.theme,
                    position: index as u32 + 1,
                })
        })
        .collect();

    shuffle(&flattened, rng)
}

/// Studied probes for one list, `per_band` from each serial-position band.
fn studied_probes<R: Rng + ?Sized>(
    list: &WordList,
    per_band: usize,
    rng: &mut R,
) -> Result<Vec<TestItem>> {
    let with_positions: Vec<(u32, &'static str)> = list
        .study_words
        .iter()
        .enumerate()
        .map(|(index, word)| (index as u32 + 1, *word))
        .collect();

    let mut probes = Vec::with_capacity(per_band * 3);
    for band in band_ranges(with_positions.len()) {
        let band_words = &with_positions[band.clone()];
        if band_words.len() < per_band {
            bail!(
                "{} list: band {}..{} holds {} words, {per_band} needed",
                list.theme,
                band.start + 1,
                band.end,
                band_words.len()
            );
        }

        probes.extend(sample(band_words, per_band, rng)?.into_iter().map(
            |(position, word)| TestItem {
                word,
                item_type: ItemType::Studied,
                list_theme: list.theme,
                serial_position: Some(position),
            },
        ));
    }

    Ok(probes)
}

pub fn test_sequence<R: Rng + ?Sized>(
    lists: &[WordList],
    pool: &[&'static str],
    config: &TrialConfig,
    rng: &mut R,
) -> Result<Vec<TestItem>> {
    validate_lists(lists, pool)?;

    let unrelated_needed = lists.len() * config.drm_unrelated_per_list;
    let unrelated = sample(pool, unrelated_needed, rng)?;
    let mut unrelated = unrelated.into_iter();

    let mut items = Vec::new();
    for list in lists {
        items.extend(studied_probes(list, config.drm_probes_per_band, rng)?);

        items.push(TestItem {
            word: list.critical_lure,
            item_type: ItemType::CriticalLure,
            list_theme: list.theme,
            serial_position: None,
        });

        items.extend(
            sample(list.related_distractors, config.drm_related_per_list, rng)?
                .into_iter()
                .map(|word| TestItem {
                    word,
                    item_type: ItemType::RelatedDistractor,
                    list_theme: list.theme,
                    serial_position: None,
                }),
        );

        items.extend(
            unrelated
                .by_ref()
                .take(config.drm_unrelated_per_list)
                .map(|word| TestItem {
                    word,
                    item_type: ItemType::UnrelatedDistractor,
                    list_theme: list.theme,
                    serial_position: None,
                }),
        );
    }

    Ok(shuffle(&items, rng))
}

/// "Old" is right only for studied items; every other type should be called new.
pub fn is_correct_response(item: &TestItem, response: OldNew) -> bool {
    match item.item_type {
        ItemType::Studied => response == OldNew::Old,
        _ => response == OldNew::New,
    }
}

pub fn validate_confidence(confidence: u8) -> Result<u8> {
    if !CONFIDENCE_SCALE.contains(&confidence) {
        bail!(
            "confidence {confidence} outside {}..={}",
            CONFIDENCE_SCALE.start(),
            CONFIDENCE_SCALE.end()
        );
    }
    Ok(confidence)
}
