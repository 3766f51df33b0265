pub mod lifecycle;
pub mod storage;
pub mod ingest;
pub mod export;
pub mod notify;
pub mod config;
pub mod error;
pub mod utils;

pub use error::{Result, GymError};
pub use config::Config;
