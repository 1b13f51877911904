use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Experiment, Language};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub experiment: Experiment,
    pub participant_name: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
}
