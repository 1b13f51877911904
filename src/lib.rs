pub mod db;
pub mod export;
pub mod models;
pub mod runner;
pub mod sampling;
pub mod settings;
pub mod stats;
pub mod trials;
pub mod utils;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use db::{
    BoubaKikiResult, Database, DrmResult, ResultOutbox, ResultRecord, RotationResult,
    ScanningResult, SessionRecord, StroopResult,
};
use export::{to_csv, CsvRow};
use models::{normalize_participant_name, Experiment, Language, SessionContext};
use settings::SettingsStore;
use stats::summary;
use trials::TrialConfig;

const ENABLE_LOGS: bool = true;

/// The store plus the settings it was opened with. One per process.
pub struct Lab {
    db: Database,
    settings: SettingsStore,
}

impl Lab {
    pub fn open(settings: SettingsStore) -> Result<Self> {
        let db_path = settings.database_path();
        let db = Database::new(db_path.clone())
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        Ok(Self { db, settings })
    }

    pub fn with_database(db: Database, settings: SettingsStore) -> Self {
        Self { db, settings }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn trial_config(&self) -> TrialConfig {
        self.settings.trial_config()
    }

    /// Registers a new session and returns the context every later phase receives.
    pub async fn start_session(
        &self,
        experiment: Experiment,
        participant_name: &str,
        language: Option<Language>,
    ) -> Result<SessionContext> {
        let participant_name = normalize_participant_name(participant_name)?;
        let language = language.unwrap_or_else(|| self.settings.default_language());
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            experiment,
            participant_name,
            language,
            created_at: Utc::now(),
        };

        self.db.insert_session(&record).await?;
        log_info!(
            "Started {} session {} ({})",
            experiment.as_str(),
            record.id,
            language.as_str()
        );

        Ok(SessionContext::new(
            record.id,
            experiment,
            record.participant_name,
            language,
        ))
    }

    /// Single attempt; on failure the rows stay in the outbox.
    pub async fn submit<T: ResultRecord>(&self, outbox: &mut ResultOutbox<T>) -> Result<usize> {
        outbox.flush(&self.db).await
    }

    /// Stores the stashed scanning rows and the rotation rows in one transaction.
    pub async fn submit_mental_rep(
        &self,
        context: &SessionContext,
        rotation: &mut ResultOutbox<RotationResult>,
    ) -> Result<usize> {
        if context.experiment != Experiment::MentalRep {
            bail!(
                "session {} belongs to {}, not mental_rep",
                context.session_id,
                context.experiment.as_str()
            );
        }

        match self
            .db
            .insert_result_pair(&context.pending_scanning, rotation.pending())
            .await
        {
            Ok(inserted) => {
                rotation.clear();
                Ok(inserted)
            }
            Err(err) => {
                log_warn!(
                    "Mental-rep submit failed for session {}: {err:#}",
                    context.session_id
                );
                Err(err.context("mental-rep results were not saved; retry to submit them again"))
            }
        }
    }

    /// Deletes the session and every row that references it.
    pub async fn clear_session(&self, session_id: &str) -> Result<bool> {
        let deleted = self.db.delete_session(session_id).await?;
        if deleted {
            log_info!("Cleared session {}", session_id);
        } else {
            log_warn!("No session {} to clear", session_id);
        }
        Ok(deleted)
    }

    async fn load<T: ResultRecord>(&self, session_id: Option<&str>) -> Result<Vec<T>> {
        match session_id {
            Some(id) => self.db.results_for_session(id).await,
            None => self.db.all_results().await,
        }
    }

    /// Participant view for one session, teacher view across all sessions.
    pub async fn summary(&self, experiment: Experiment, session_id: Option<&str>) -> Result<Value> {
        let value = match experiment {
            Experiment::Stroop => {
                let results: Vec<StroopResult> = self.load(session_id).await?;
                match session_id {
                    Some(_) => serde_json::to_value(summary::stroop_summary(&results))?,
                    None => json!({
                        "overall": summary::stroop_summary(&results),
                        "classView": summary::stroop_class_view(&results),
                    }),
                }
            }
            Experiment::BoubaKiki => {
                let results: Vec<BoubaKikiResult> = self.load(session_id).await?;
                match session_id {
                    Some(_) => serde_json::to_value(summary::bouba_kiki_summary(&results))?,
                    None => serde_json::to_value(summary::bouba_kiki_class_view(&results))?,
                }
            }
            Experiment::Drm => {
                let results: Vec<DrmResult> = self.load(session_id).await?;
                serde_json::to_value(summary::drm_summary(&results))?
            }
            Experiment::MentalRep => {
                let scanning: Vec<ScanningResult> = self.load(session_id).await?;
                let rotation: Vec<RotationResult> = self.load(session_id).await?;
                match session_id {
                    Some(_) => {
                        serde_json::to_value(summary::mental_rep_summary(&scanning, &rotation))?
                    }
                    None => {
                        serde_json::to_value(summary::mental_rep_class_view(&scanning, &rotation))?
                    }
                }
            }
        };
        Ok(value)
    }

    /// Mental-rep exports the scanning table, a blank line, then the rotation table.
    pub async fn export_csv(
        &self,
        experiment: Experiment,
        session_id: Option<&str>,
    ) -> Result<String> {
        let csv = match experiment {
            Experiment::Stroop => self.export_table::<StroopResult>(session_id).await?,
            Experiment::BoubaKiki => self.export_table::<BoubaKikiResult>(session_id).await?,
            Experiment::Drm => self.export_table::<DrmResult>(session_id).await?,
            Experiment::MentalRep => {
                let scanning = self.export_table::<ScanningResult>(session_id).await?;
                let rotation = self.export_table::<RotationResult>(session_id).await?;
                format!("{scanning}\n{rotation}")
            }
        };
        Ok(csv)
    }

    async fn export_table<T: ResultRecord + CsvRow>(
        &self,
        session_id: Option<&str>,
    ) -> Result<String> {
        let rows: Vec<T> = self.load(session_id).await?;
        Ok(to_csv(&rows))
    }
}

/// Process entry: logging first, then settings and the store.
pub fn run() -> Result<Lab> {
    utils::logging::init();
    let settings = SettingsStore::from_env();
    log_info!("Cognilab starting with settings at {}", settings.path().display());
    Lab::open(settings)
}
