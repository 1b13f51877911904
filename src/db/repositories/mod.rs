pub mod results;
pub mod sessions;

pub use results::ResultRecord;
