use std::fmt;

/// Error kinds surfaced by the queue engine and its collaborators.
///
/// Business failures (validation, not-found, duplicate plate, state
/// conflicts) are distinct variants so the HTTP layer can map them to the
/// right status codes without string matching.
#[derive(Debug, Clone, PartialEq)]
pub enum TurneroError {
    /// Malformed or out-of-bounds input
    Validation(String),
    /// Workshop, turn or plate does not exist
    NotFound(String),
    /// A non-terminal turn already exists for this plate in this workshop;
    /// carries that turn's number so the caller can inform the customer
    DuplicatePlate { turn_number: i32 },
    /// The requested transition is illegal for the turn's current state
    StateConflict { current: String, attempted: String },
    /// Plate check failed on a public cancel request
    Forbidden(String),
    /// No valid credentials presented for an auth-gated operation
    Unauthenticated,
    /// The request deadline elapsed while waiting on the database
    Timeout(String),
    DatabaseError(String),
    ConfigurationError(String),
    Internal(String),
}

impl fmt::Display for TurneroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurneroError::Validation(msg) => write!(f, "Validation error: {msg}"),
            TurneroError::NotFound(what) => write!(f, "{what} not found"),
            TurneroError::DuplicatePlate { turn_number } => {
                write!(f, "Plate already has an active turn (turn #{turn_number})")
            }
            TurneroError::StateConflict { current, attempted } => {
                write!(f, "Cannot {attempted} a turn in state {current}")
            }
            TurneroError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            TurneroError::Unauthenticated => write!(f, "Authentication required"),
            TurneroError::Timeout(op) => write!(f, "Deadline exceeded during {op}"),
            TurneroError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            TurneroError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            TurneroError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for TurneroError {}

impl From<sqlx::Error> for TurneroError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => TurneroError::NotFound("Row".to_string()),
            sqlx::Error::PoolTimedOut => {
                TurneroError::Timeout("database connection acquisition".to_string())
            }
            other => TurneroError::DatabaseError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TurneroError>;
