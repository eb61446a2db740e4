// src/types/mod.rs
pub mod email;
pub mod requirements;
pub mod response;

pub use email::{EmailInput, RawBody};
pub use requirements::ParsedRequirements;
pub use response::ResponseEnvelope;
