pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod scheduling;
pub mod state_machine;
pub mod store;
pub mod validation;
pub mod web;

pub use config::TurneroConfig;
pub use error::{Result, TurneroError};
pub use scheduling::QueueEngine;
