pub mod notifier;

// Re-export key types for convenience
pub use notifier::{spawn_dispatch_worker, TurnCreated, TurnNotifier};
