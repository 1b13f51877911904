pub mod descriptive;
pub mod summary;
