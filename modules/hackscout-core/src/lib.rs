pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AdapterError, ComposeError, GenerationError};
pub use types::*;
