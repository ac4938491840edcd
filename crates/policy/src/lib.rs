pub mod confirmation;
pub mod config;

pub use config::{PolicyConfig, PolicyError};
pub use confirmation::{ConfirmationDecision, ConfirmationPolicy};
