//! One generic repository for every results table.
//!
//! Tables differ only in their columns, so each row type describes itself
//! through [`ResultRecord`] and the queries are built from that description.

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value, Row, Transaction};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_label, to_optional_u32, to_u16, to_u32},
    models::{BoubaKikiResult, DrmResult, RotationResult, ScanningResult, StroopResult},
};
use crate::trials::bouba_kiki::{ShapeType, Side};
use crate::trials::drm::{ItemType, OldNew};
use crate::trials::rotation::SameDifferent;
use crate::log_info;

const ENABLE_LOGS: bool = true;

pub trait ResultRecord: Clone + Send + 'static {
    const TABLE: &'static str;
    /// Insert/select order; `to_values` must follow it.
    const COLUMNS: &'static [&'static str];
    /// `ORDER BY` clause for one session's rows.
    const SESSION_ORDER: &'static str = "trial_number ASC, id ASC";

    fn session_id(&self) -> &str;
    fn to_values(&self) -> Vec<Value>;
    fn from_row(row: &Row) -> Result<Self>;
}

fn insert_sql<T: ResultRecord>() -> String {
    let placeholders: Vec<String> = (1..=T::COLUMNS.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

fn select_sql<T: ResultRecord>(filter: &str, order: &str) -> String {
    format!(
        "SELECT {} FROM {} {filter} ORDER BY {order}",
        T::COLUMNS.join(", "),
        T::TABLE
    )
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_int(value: Option<i64>) -> Value {
    value.map(Value::Integer).unwrap_or(Value::Null)
}

fn insert_batch<T: ResultRecord>(tx: &Transaction<'_>, batch: &[T]) -> Result<usize> {
    if batch.is_empty() {
        return Ok(0);
    }
    let mut stmt = tx.prepare(&insert_sql::<T>())?;
    for record in batch {
        stmt.execute(params_from_iter(record.to_values()))
            .with_context(|| {
                format!(
                    "failed to insert into {} for session {}",
                    T::TABLE,
                    record.session_id()
                )
            })?;
    }
    Ok(batch.len())
}

impl Database {
    /// Inserts the whole batch in one transaction; nothing is written on failure.
    pub async fn insert_results<T: ResultRecord>(&self, records: &[T]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let batch = records.to_vec();
        let inserted = self
            .execute(move |conn| {
                let tx = conn
                    .transaction()
                    .context("failed to open insert transaction")?;
                let inserted = insert_batch(&tx, &batch)?;
                tx.commit()
                    .with_context(|| format!("failed to commit {} batch", T::TABLE))?;
                Ok(inserted)
            })
            .await?;

        log_info!("Inserted {} rows into {}", inserted, T::TABLE);
        Ok(inserted)
    }

    /// Two batches for different tables, committed together or not at all.
    pub async fn insert_result_pair<A, B>(&self, first: &[A], second: &[B]) -> Result<usize>
    where
        A: ResultRecord,
        B: ResultRecord,
    {
        let first = first.to_vec();
        let second = second.to_vec();
        let inserted = self
            .execute(move |conn| {
                let tx = conn
                    .transaction()
                    .context("failed to open insert transaction")?;
                let inserted = insert_batch(&tx, &first)? + insert_batch(&tx, &second)?;
                tx.commit().with_context(|| {
                    format!("failed to commit {} + {} batch", A::TABLE, B::TABLE)
                })?;
                Ok(inserted)
            })
            .await?;

        log_info!(
            "Inserted {} rows into {} and {}",
            inserted,
            A::TABLE,
            B::TABLE
        );
        Ok(inserted)
    }

    /// One session's rows in trial order (`ResultRecord::SESSION_ORDER`).
    pub async fn results_for_session<T: ResultRecord>(&self, session_id: &str) -> Result<Vec<T>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&select_sql::<T>(
                "WHERE session_id = ?1",
                T::SESSION_ORDER,
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(T::from_row(row)?);
            }
            Ok(results)
        })
        .await
    }

    /// Every session's rows, oldest first.
    pub async fn all_results<T: ResultRecord>(&self) -> Result<Vec<T>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&select_sql::<T>("", "created_at ASC, id ASC"))?;

            let mut rows = stmt.query([])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(T::from_row(row)?);
            }
            Ok(results)
        })
        .await
    }

    pub async fn delete_results<T: ResultRecord>(&self, session_id: &str) -> Result<usize> {
        let session_id = session_id.to_string();
        let deleted = self
            .execute(move |conn| {
                let sql = format!("DELETE FROM {} WHERE session_id = ?1", T::TABLE);
                conn.execute(&sql, params![session_id])
                    .with_context(|| format!("failed to delete from {}", T::TABLE))
            })
            .await?;

        log_info!("Deleted {} rows from {}", deleted, T::TABLE);
        Ok(deleted)
    }
}

impl ResultRecord for StroopResult {
    const TABLE: &'static str = "stroop_results";
    const COLUMNS: &'static [&'static str] = &[
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

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.session_id),
            Value::Integer(i64::from(self.trial_number)),
            text(&self.word_text),
            text(&self.font_color),
            Value::Integer(i64::from(self.is_congruent)),
            text(&self.user_response),
            Value::Integer(i64::from(self.is_correct)),
            Value::Real(self.reaction_time_ms),
            Value::Text(self.created_at.to_rfc3339()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let created_at: String = row.get("created_at")?;
        Ok(StroopResult {
            session_id: row.get("session_id")?,
            trial_number: to_u32(row.get("trial_number")?, "trial_number")?,
            word_text: row.get("word_text")?,
            font_color: row.get("font_color")?,
            is_congruent: row.get("is_congruent")?,
            user_response: row.get("user_response")?,
            is_correct: row.get("is_correct")?,
            reaction_time_ms: row.get("reaction_time_ms")?,
            created_at: parse_datetime(&created_at, "created_at")?,
        })
    }
}

impl ResultRecord for BoubaKikiResult {
    const TABLE: &'static str = "bouba_kiki_results";
    const COLUMNS: &'static [&'static str] = &[
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

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.session_id),
            Value::Integer(i64::from(self.trial_number)),
            text(&self.word),
            text(self.word_type.as_str()),
            text(&self.left_shape),
            text(&self.right_shape),
            text(self.response_type.as_str()),
            text(self.response.as_str()),
            Value::Integer(i64::from(self.is_correct)),
            Value::Real(self.reaction_time_ms),
            Value::Integer(i64::from(self.is_control)),
            Value::Text(self.created_at.to_rfc3339()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let word_type: String = row.get("word_type")?;
        let response_type: String = row.get("response_type")?;
        let response: String = row.get("response")?;
        let created_at: String = row.get("created_at")?;
        Ok(BoubaKikiResult {
            session_id: row.get("session_id")?,
            trial_number: to_u32(row.get("trial_number")?, "trial_number")?,
            word: row.get("word")?,
            word_type: parse_label(&word_type, "word_type", ShapeType::parse)?,
            left_shape: row.get("left_shape")?,
            right_shape: row.get("right_shape")?,
            response_type: parse_label(&response_type, "response_type", ShapeType::parse)?,
            response: parse_label(&response, "response", Side::parse)?,
            is_correct: row.get("is_correct")?,
            reaction_time_ms: row.get("reaction_time_ms")?,
            is_control: row.get("is_control")?,
            created_at: parse_datetime(&created_at, "created_at")?,
        })
    }
}

impl ResultRecord for DrmResult {
    const TABLE: &'static str = "drm_results";
    const COLUMNS: &'static [&'static str] = &[
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

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.session_id),
            Value::Integer(i64::from(self.trial_number)),
            text(&self.word),
            text(self.item_type.as_str()),
            text(&self.list_theme),
            text(self.response.as_str()),
            Value::Integer(i64::from(self.is_correct)),
            Value::Real(self.reaction_time_ms),
            optional_int(self.serial_position.map(i64::from)),
            optional_int(self.confidence.map(i64::from)),
            Value::Text(self.created_at.to_rfc3339()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let item_type: String = row.get("item_type")?;
        let response: String = row.get("response")?;
        let confidence: Option<i64> = row.get("confidence")?;
        let created_at: String = row.get("created_at")?;
        Ok(DrmResult {
            session_id: row.get("session_id")?,
            trial_number: to_u32(row.get("trial_number")?, "trial_number")?,
            word: row.get("word")?,
            item_type: parse_label(&item_type, "item_type", ItemType::parse)?,
            list_theme: row.get("list_theme")?,
            response: parse_label(&response, "response", OldNew::parse)?,
            is_correct: row.get("is_correct")?,
            reaction_time_ms: row.get("reaction_time_ms")?,
            serial_position: to_optional_u32(row.get("serial_position")?, "serial_position")?,
            confidence: confidence
                .map(|raw| {
                    u8::try_from(raw).with_context(|| format!("confidence {raw} out of range"))
                })
                .transpose()?,
            created_at: parse_datetime(&created_at, "created_at")?,
        })
    }
}

impl ResultRecord for ScanningResult {
    const TABLE: &'static str = "mental_scanning_results";
    const COLUMNS: &'static [&'static str] = &[
        "session_id",
        "trial_number",
        "from_landmark",
        "to_landmark",
        "distance",
        "found_target",
        "reaction_time_ms",
        "created_at",
    ];

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.session_id),
            Value::Integer(i64::from(self.trial_number)),
            text(&self.from_landmark),
            text(&self.to_landmark),
            Value::Real(self.distance),
            Value::Integer(i64::from(self.found_target)),
            Value::Real(self.reaction_time_ms),
            Value::Text(self.created_at.to_rfc3339()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let created_at: String = row.get("created_at")?;
        Ok(ScanningResult {
            session_id: row.get("session_id")?,
            trial_number: to_u32(row.get("trial_number")?, "trial_number")?,
            from_landmark: row.get("from_landmark")?,
            to_landmark: row.get("to_landmark")?,
            distance: row.get("distance")?,
            found_target: row.get("found_target")?,
            reaction_time_ms: row.get("reaction_time_ms")?,
            created_at: parse_datetime(&created_at, "created_at")?,
        })
    }
}

impl ResultRecord for RotationResult {
    const TABLE: &'static str = "mental_rotation_results";
    /// Practice block first, then the main block, each in trial order.
    const SESSION_ORDER: &'static str = "is_practice DESC, trial_number ASC, id ASC";
    const COLUMNS: &'static [&'static str] = &[
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

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.session_id),
            Value::Integer(i64::from(self.trial_number)),
            text(&self.figure_id),
            Value::Integer(i64::from(self.left_angle)),
            Value::Integer(i64::from(self.right_angle)),
            Value::Integer(i64::from(self.is_same)),
            Value::Integer(i64::from(self.rotation_difference)),
            text(self.response.as_str()),
            Value::Integer(i64::from(self.is_correct)),
            Value::Real(self.reaction_time_ms),
            Value::Integer(i64::from(self.is_practice)),
            Value::Text(self.created_at.to_rfc3339()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let response: String = row.get("response")?;
        let created_at: String = row.get("created_at")?;
        Ok(RotationResult {
            session_id: row.get("session_id")?,
            trial_number: to_u32(row.get("trial_number")?, "trial_number")?,
            figure_id: row.get("figure_id")?,
            left_angle: to_u16(row.get("left_angle")?, "left_angle")?,
            right_angle: to_u16(row.get("right_angle")?, "right_angle")?,
            is_same: row.get("is_same")?,
            rotation_difference: to_u16(row.get("rotation_difference")?, "rotation_difference")?,
            response: parse_label(&response, "response", SameDifferent::parse)?,
            is_correct: row.get("is_correct")?,
            reaction_time_ms: row.get("reaction_time_ms")?,
            is_practice: row.get("is_practice")?,
            created_at: parse_datetime(&created_at, "created_at")?,
        })
    }
}
