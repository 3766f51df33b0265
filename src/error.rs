use thiserror::Error;

#[derive(Error, Debug)]
pub enum GymError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid plan duration: {0} (must be a positive number)")]
    InvalidDuration(i64),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("More than one member matches {0}; use the full id")]
    AmbiguousMember(String),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("No {0} to export")]
    NothingToExport(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GymError>;
