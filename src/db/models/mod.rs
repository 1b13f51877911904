pub mod results;
pub mod session;

pub use results::{BoubaKikiResult, DrmResult, RotationResult, ScanningResult, StroopResult};
pub use session::SessionRecord;
