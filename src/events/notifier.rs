use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::Turn;

/// Notification fired after a turn creation commits.
///
/// Carries a fully-hydrated snapshot so subscribers never need to reopen a
/// transaction.
#[derive(Debug, Clone)]
pub struct TurnCreated {
    pub turn: Turn,
    pub published_at: DateTime<Utc>,
}

/// Fire-and-forget fan-out channel for post-commit notifications.
///
/// Bounded: a lagging subscriber skips the oldest events instead of
/// blocking the publisher. Publishing never fails the business operation.
#[derive(Debug, Clone)]
pub struct TurnNotifier {
    sender: broadcast::Sender<TurnCreated>,
}

impl TurnNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a turn-created event. Only called from post-commit hooks,
    /// so an event can never refer to a rolled-back turn.
    pub fn turn_created(&self, turn: &Turn) {
        let event = TurnCreated {
            turn: turn.clone(),
            published_at: Utc::now(),
        };

        // send() errs only when no subscriber exists, which is fine for
        // fire-and-forget delivery.
        if self.sender.send(event).is_err() {
            debug!("No notification subscribers; turn-created event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TurnCreated> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TurnNotifier {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Dispatch worker: drains the channel on its own task so HTTP latency is
/// never bound to delivery latency. Delivery here is a structured log line;
/// outbound channels (email and the like) hang off the same subscription.
pub fn spawn_dispatch_worker(notifier: &TurnNotifier) -> JoinHandle<()> {
    let mut receiver = notifier.subscribe();

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    info!(
                        turn_id = event.turn.id,
                        workshop_id = event.turn.workshop_id,
                        turn_number = event.turn.turn_number,
                        state = %event.turn.state,
                        "Turn created notification dispatched"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification dispatch lagging; oldest events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
