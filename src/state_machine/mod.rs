// State machine module for the turn lifecycle.
//
// A turn is admitted as IN_SERVICE or WAITING depending on capacity, may be
// promoted WAITING -> IN_SERVICE when a slot frees, and ends FINALIZED or
// CANCELLED. The transition table lives here; timestamp writes stay in the
// engine so every state change is explicit.

pub mod states;
pub mod transitions;

pub use states::TurnState;
pub use transitions::{admission_state, is_allowed};
