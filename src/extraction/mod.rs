// src/extraction/mod.rs
pub mod extractor;
pub mod normalize;
pub mod prompt;

pub use extractor::RequirementsExtractor;
pub use normalize::{normalize_employment_type, parse_model_reply};
