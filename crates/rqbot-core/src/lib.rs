pub mod config;
pub mod error;

pub use config::RqbotConfig;
pub use error::{Result, RqbotError};
