//! Stroop color-word interference.
//!
//! Practice runs five hand-picked neutral words in a fixed order; the main
//! block is the full crossing of twelve words with three font colors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampling::shuffle;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ColorKey {
    Red,
    Green,
    Yellow,
}

pub const COLOR_KEYS: [ColorKey; 3] = [ColorKey::Red, ColorKey::Green, ColorKey::Yellow];

impl ColorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorKey::Red => "red",
            ColorKey::Green => "green",
            ColorKey::Yellow => "yellow",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            ColorKey::Red => "#f43f5e",
            ColorKey::Green => "#34d399",
            ColorKey::Yellow => "#fbbf24",
        }
    }

    /// Color names in every language that count as congruent with this key.
    pub fn equivalents(&self) -> &'static [&'static str] {
        match self {
            ColorKey::Red => &["red", "adom", "rojo"],
            ColorKey::Green => &["green", "yarok", "verde"],
            ColorKey::Yellow => &["yellow", "tsahov", "amarillo"],
        }
    }

    /// Keyboard shortcut: `r`, `g`, `y` (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "r" => Some(ColorKey::Red),
            "g" => Some(ColorKey::Green),
            "y" => Some(ColorKey::Yellow),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        COLOR_KEYS
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value))
    }
}

/// The twelve main-block words: English, transliterated Hebrew, Spanish, non-words.
pub const WORDS: [&str; 12] = [
    "red", "green", "yellow", "adom", "yarok", "tsahov", "rojo", "verde", "amarillo", "flurg",
    "blaket", "zorphin",
];

pub const PRACTICE_WORDS: [(&str, ColorKey); 5] = [
    ("welcome", ColorKey::Red),
    ("cognition", ColorKey::Green),
    ("class", ColorKey::Yellow),
    ("enjoy", ColorKey::Green),
    ("experiment", ColorKey::Red),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LanguageGroup {
    English,
    Hebrew,
    Spanish,
    #[serde(rename = "Non-words")]
    NonWords,
}

pub const LANGUAGE_GROUPS: [LanguageGroup; 4] = [
    LanguageGroup::English,
    LanguageGroup::Hebrew,
    LanguageGroup::Spanish,
    LanguageGroup::NonWords,
];

impl LanguageGroup {
    /// Anything that is not a known color name falls into `NonWords`.
    pub fn of(word: &str) -> Self {
        match word.to_lowercase().as_str() {
            "red" | "green" | "yellow" => LanguageGroup::English,
            "adom" | "yarok" | "tsahov" => LanguageGroup::Hebrew,
            "rojo" | "verde" | "amarillo" => LanguageGroup::Spanish,
            _ => LanguageGroup::NonWords,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageGroup::English => "English",
            LanguageGroup::Hebrew => "Hebrew",
            LanguageGroup::Spanish => "Spanish",
            LanguageGroup::NonWords => "Non-words",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StroopTrial {
    pub id: u32,
    pub word_text: &'static str,
    pub font_color: &'static str,
    pub color: ColorKey,
    pub is_congruent: bool,
}

pub fn is_congruent(word: &str, color: ColorKey) -> bool {
    let lower = word.to_lowercase();
    color.equivalents().contains(&lower.as_str())
}

fn create_trial(id: u32, word_text: &'static str, color: ColorKey) -> StroopTrial {
    StroopTrial {
        id,
        word_text,
        font_color: color.hex(),
        color,
        is_congruent: is_congruent(word_text, color),
    }
}

pub fn practice_trials() -> Vec<StroopTrial> {
    PRACTICE_WORDS
        .iter()
        .enumerate()
        .map(|(index, (word, color))| create_trial(index as u32, word, *color))
        .collect()
}

/// 12 words x 3 colors, shuffled once, ids renumbered to presentation order.
pub fn main_trials<R: Rng + ?Sized>(rng: &mut R) -> Vec<StroopTrial> {
    let crossing: Vec<StroopTrial> = WORDS
        .iter()
        .flat_map(|word| COLOR_KEYS.iter().map(move |color| (*word, *color)))
        .enumerate()
        .map(|(index, (word, color))| create_trial(index as u32, word, color))
        .collect();

    shuffle(&crossing, rng)
        .into_iter()
        .enumerate()
        .map(|(index, trial)| StroopTrial {
            id: index as u32,
            ..trial
        })
        .collect()
}

/// The word is the distractor; only the font color counts.
pub fn is_correct_response(trial: &StroopTrial, response: ColorKey) -> bool {
    trial.color == response
}
