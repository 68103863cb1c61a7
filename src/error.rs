use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftError {
    #[error("Shift not found")]
    NotFound(Uuid),
    #[error("Shift is already booked")]
    AlreadyBooked(Uuid),
    #[error("Shift is not booked")]
    NotBooked(Uuid),
    #[error("Shift has already started")]
    AlreadyStarted(Uuid),
    #[error("Shift overlaps with an already booked shift")]
    Overlapping { id: Uuid, booked: Uuid },
    #[error("Shift must end after it starts")]
    InvalidInterval,
    #[error("Shift id {0} appears more than once")]
    DuplicateId(Uuid),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read shifts file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse shifts file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Shifts file {path} was rejected")]
    Rejected {
        path: PathBuf,
        #[source]
        source: ShiftError,
    },
}
