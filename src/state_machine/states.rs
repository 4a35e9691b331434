use serde::{Deserialize, Serialize};
use std::fmt;

/// Turn state definitions.
///
/// Stored in the database as the exact SCREAMING_SNAKE strings; the partial
/// unique plate index depends on the WAITING/IN_SERVICE spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnState {
    /// Admitted but all service slots were taken
    Waiting,
    /// Occupying one of the workshop's service slots
    InService,
    /// Service completed
    Finalized,
    /// Withdrawn by the customer before or during service
    Cancelled,
}

impl TurnState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }

    /// Check if this turn occupies a service slot
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InService)
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::InService => write!(f, "IN_SERVICE"),
            Self::Finalized => write!(f, "FINALIZED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl std::str::FromStr for TurnState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(Self::Waiting),
            "IN_SERVICE" => Ok(Self::InService),
            "FINALIZED" => Ok(Self::Finalized),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid turn state: {s}")),
        }
    }
}
