use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::state_machine::TurnState;

/// Turn represents one customer appointment in a workshop's queue.
/// Maps to the `turns` table.
///
/// `state` holds the raw database string; use [`Turn::turn_state`] to get
/// the typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Turn {
    pub id: i64,
    pub workshop_id: i64,
    pub turn_number: i32,
    pub customer_name: String,
    pub phone: String,
    pub vehicle_model: String,
    pub plate: String,
    pub problem: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// New turn payload, already shape-validated by the HTTP layer.
/// The engine still normalises the plate before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTurn {
    pub customer_name: String,
    pub phone: String,
    pub vehicle_model: String,
    pub plate: String,
    pub problem: Option<String>,
}

/// Queue-position view without customer data, for the public status board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSummary {
    pub turn_number: i32,
    pub state: TurnState,
}

impl Turn {
    pub fn turn_state(&self) -> Result<TurnState, String> {
        self.state.parse()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state.as_str(), "FINALIZED" | "CANCELLED")
    }

    pub fn summary(&self) -> Option<TurnSummary> {
        let state = self.turn_state().ok()?;
        Some(TurnSummary {
            turn_number: self.turn_number,
            state,
        })
    }
}

/// Canonical plate form: trimmed and uppercased. All storage and
/// comparison go through this.
pub fn normalize_plate(raw: &str) -> String {
    raw.trim().to_uppercase()
}
