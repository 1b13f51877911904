use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_label},
    models::SessionRecord,
};
use crate::models::{Experiment, Language};

fn row_to_session(row: &Row) -> Result<SessionRecord> {
    let experiment: String = row.get("experiment")?;
    let language: String = row.get("language")?;
    let created_at: String = row.get("created_at")?;

    Ok(SessionRecord {
        id: row.get("id")?,
        experiment: parse_label(&experiment, "experiment", Experiment::parse)?,
        participant_name: row.get("participant_name")?,
        language: parse_label(&language, "language", Language::parse)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, experiment, participant_name, language, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.experiment.as_str(),
                    record.participant_name,
                    record.language.as_str(),
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert session {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, experiment, participant_name, language, created_at
                 FROM sessions
                 WHERE id = ?1",
            )?;

            let session = stmt
                .query_row(params![session_id], |row| Ok(row_to_session(row)))
                .optional()?
                .transpose()?;
            Ok(session)
        })
        .await
    }

    /// Oldest first.
    pub async fn list_sessions(&self, experiment: Experiment) -> Result<Vec<SessionRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, experiment, participant_name, language, created_at
                 FROM sessions
                 WHERE experiment = ?1
                 ORDER BY created_at ASC",
            )?;

            let mut rows = stmt.query(params![experiment.as_str()])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Removes the session and, through the foreign keys, all of its results.
    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let deleted = conn
                .execute("DELETE FROM sessions WHERE id = ?1", params![session_id])
                .with_context(|| format!("failed to delete session {session_id}"))?;
            Ok(deleted > 0)
        })
        .await
    }
}
