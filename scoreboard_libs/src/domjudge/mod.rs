pub mod client;
pub mod config;
pub mod model;

pub use client::{ContestApi, DomjudgeClient, FetchError};
pub use config::{ApiConfig, ConfigError, Credentials};
