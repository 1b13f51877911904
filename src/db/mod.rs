mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod outbox;
pub mod repositories;

pub use connection::Database;
pub use models::{
    BoubaKikiResult, DrmResult, RotationResult, ScanningResult, SessionRecord, StroopResult,
};
pub use outbox::ResultOutbox;
pub use repositories::ResultRecord;
