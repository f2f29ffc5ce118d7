pub mod config;
pub mod loader;
pub mod logging;

pub use config::{ConfigError, EngineConfig};
pub use loader::{BracketRecord, ScheduleLoader, ScheduleLoaderError};
