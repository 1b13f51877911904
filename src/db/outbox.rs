use anyhow::Result;

use crate::db::{connection::Database, repositories::ResultRecord};
use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

/// Results collected during a phase and not yet stored.
///
/// A failed flush leaves every record queued so the participant can retry
/// without redoing the phase.
#[derive(Debug, Clone)]
pub struct ResultOutbox<T: ResultRecord> {
    pending: Vec<T>,
}

impl<T: ResultRecord> Default for ResultOutbox<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: ResultRecord> ResultOutbox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: T) {
        self.pending.push(record);
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, records: I) {
        self.pending.extend(records);
    }

    pub fn pending(&self) -> &[T] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Writes everything queued as one batch. Single attempt, no retry.
    pub async fn flush(&mut self, db: &Database) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        match db.insert_results(&self.pending).await {
            Ok(inserted) => {
                self.pending.clear();
                log_info!("Flushed {} {} rows", inserted, T::TABLE);
                Ok(inserted)
            }
            Err(err) => {
                log_error!(
                    "Failed to store {} {} rows, keeping them queued: {err:#}",
                    self.pending.len(),
                    T::TABLE
                );
                Err(err.context(format!(
                    "{} results were not saved; retry to submit them again",
                    self.pending.len()
                )))
            }
        }
    }
}
