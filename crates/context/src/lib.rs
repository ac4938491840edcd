pub mod provider;
pub mod types;

pub use provider::{ContextError, ContextProvider, FileContextProvider, StaticContextProvider};
pub use types::*;
