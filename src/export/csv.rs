use std::borrow::Cow;

use crate::db::{BoubaKikiResult, DrmResult, RotationResult, ScanningResult, StroopResult};

/// A result row that can be written as one CSV line.
pub trait CsvRow {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

/// Quotes a field only when it contains a separator, quote or line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_line(out: &mut String, fields: &[String]) {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|field| escape(field)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

pub fn to_csv<T: CsvRow>(rows: &[T]) -> String {
    let mut out = String::new();
    let header: Vec<String> = T::HEADER.iter().map(|name| name.to_string()).collect();
    write_line(&mut out, &header);
    for row in rows {
        write_line(&mut out, &row.fields());
    }
    out
}

/// Whole milliseconds, halves rounded up.
fn rt(value: f64) -> String {
    format!("{:.0}", value.round())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvRow for StroopResult {
    const HEADER: &'static [&'static str] = &[
        "session_id",
        "trial_number",
        "word_text",
        "font_color",
        "is_congruent",
        "user_response",
        "is_correct",
        "reaction_time_ms",
        "created_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.session_id.clone(),
            self.trial_number.to_string(),
            self.word_text.clone(),
            self.font_color.clone(),
            self.is_congruent.to_string(),
            self.user_response.clone(),
            self.is_correct.to_string(),
            rt(self.reaction_time_ms),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for BoubaKikiResult {
    const HEADER: &'static [&'static str] = &[
        "session_id",
        "trial_number",
        "word",
        "word_type",
        "left_shape",
        "right_shape",
        "response_type",
        "response",
        "is_correct",
        "reaction_time_ms",
        "is_control",
        "created_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.session_id.clone(),
            self.trial_number.to_string(),
            self.word.clone(),
            self.word_type.as_str().to_string(),
            self.left_shape.clone(),
            self.right_shape.clone(),
            self.response_type.as_str().to_string(),
            self.response.as_str().to_string(),
            self.is_correct.to_string(),
            rt(self.reaction_time_ms),
            self.is_control.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for DrmResult {
    const HEADER: &'static [&'static str] = &[
        "session_id",
        "trial_number",
        "word",
        "item_type",
        "list_theme",
        "response",
        "is_correct",
        "reaction_time_ms",
        "serial_position",
        "confidence",
        "created_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.session_id.clone(),
            self.trial_number.to_string(),
            self.word.clone(),
            self.item_type.as_str().to_string(),
            self.list_theme.clone(),
            self.response.as_str().to_string(),
            self.is_correct.to_string(),
            rt(self.reaction_time_ms),
            optional(self.serial_position),
            optional(self.confidence),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for ScanningResult {
    const HEADER: &'static [&'static str] = &[
        "session_id",
        "trial_number",
        "from_landmark",
        "to_landmark",
        "distance",
        "found_target",
        "reaction_time_ms",
        "created_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.session_id.clone(),
            self.trial_number.to_string(),
            self.from_landmark.clone(),
            self.to_landmark.clone(),
            format!("{:.2}", self.distance),
            self.found_target.to_string(),
            rt(self.reaction_time_ms),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for RotationResult {
    const HEADER: &'static [&'static str] = &[
        "session_id",
        "trial_number",
        "figure_id",
        "left_angle",
        "right_angle",
        "is_same",
        "rotation_difference",
        "response",
        "is_correct",
        "reaction_time_ms",
        "is_practice",
        "created_at",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.session_id.clone(),
            self.trial_number.to_string(),
            self.figure_id.clone(),
            self.left_angle.to_string(),
            self.right_angle.to_string(),
            self.is_same.to_string(),
            self.rotation_difference.to_string(),
            self.response.as_str().to_string(),
            self.is_correct.to_string(),
            rt(self.reaction_time_ms),
            self.is_practice.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}
