pub mod turn;
pub mod workshop;

// Re-export core models for easy access
pub use turn::{normalize_plate, NewTurn, Turn, TurnSummary};
pub use workshop::{NewWorkshop, Workshop, WorkshopDirectory};
