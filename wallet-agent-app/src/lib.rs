pub mod bootstrap;
pub mod config;
pub mod session;

pub use bootstrap::{bootstrap, init_logging, Runtime};
pub use config::AppConfig;
pub use session::run_session;
