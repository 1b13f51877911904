//! Result rows, one struct per results table.
//!
//! Each row copies the trial tags needed for grouping so summaries never
//! have to re-join against the generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trials::bouba_kiki::{ShapeType, Side};
use crate::trials::drm::{ItemType, OldNew};
use crate::trials::rotation::SameDifferent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StroopResult {
    pub session_id: String,
    pub trial_number: u32,
    pub word_text: String,
    pub font_color: String,
    pub is_congruent: bool,
    pub user_response: String,
    pub is_correct: bool,
    pub reaction_time_ms: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoubaKikiResult {
    pub session_id: String,
    pub trial_number: u32,
    /// `CONTROL` on control trials.
    pub word: String,
    pub word_type: ShapeType,
    pub left_shape: String,
    /// Empty on control trials.
    pub right_shape: String,
    /// Category the participant picked. This is the scored field.
    pub response_type: ShapeType,
    /// Legacy encoding: chosen side, or bouba=left / kiki=right on control trials.
    pub response: Side,
    pub is_correct: bool,
    pub reaction_time_ms: f64,
    pub is_control: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrmResult {
    pub session_id: String,
    pub trial_number: u32,
    pub word: String,
    pub item_type: ItemType,
    pub list_theme: String,
    pub response: OldNew,
    pub is_correct: bool,
    pub reaction_time_ms: f64,
    pub serial_position: Option<u32>,
    pub confidence: Option<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanningResult {
    pub session_id: String,
    pub trial_number: u32,
    pub from_landmark: String,
    pub to_landmark: String,
    pub distance: f64,
    pub found_target: bool,
    pub reaction_time_ms: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationResult {
    pub session_id: String,
    pub trial_number: u32,
    pub figure_id: String,
    pub left_angle: u16,
    pub right_angle: u16,
    pub is_same: bool,
    pub rotation_difference: u16,
    pub response: SameDifferent,
    pub is_correct: bool,
    pub reaction_time_ms: f64,
    pub is_practice: bool,
    pub created_at: DateTime<Utc>,
}
