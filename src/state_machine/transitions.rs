use super::states::TurnState;

/// Allowed transitions for a live turn.
///
/// Admission (no prior state) is decided by capacity in the engine; this
/// table covers every move a persisted turn can make afterwards.
pub fn is_allowed(from: TurnState, to: TurnState) -> bool {
    matches!(
        (from, to),
        (TurnState::Waiting, TurnState::InService)
            | (TurnState::InService, TurnState::Finalized)
            | (TurnState::Waiting, TurnState::Cancelled)
            | (TurnState::InService, TurnState::Cancelled)
    )
}

/// Initial state for a new turn given current occupancy.
pub fn admission_state(in_service: i64, capacity: i32) -> TurnState {
    if in_service < i64::from(capacity) {
        TurnState::InService
    } else {
        TurnState::Waiting
    }
}
