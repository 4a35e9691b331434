//! The queue engine: numbering, admission, promotion.
//!
//! Every mutating command runs inside one store transaction with the
//! workshop row lock as its serialisation root, so any two commands on the
//! same workshop execute as if serial. The pre-commit phase runs under the
//! request deadline; the commit itself always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument};

use crate::error::{Result, TurneroError};
use crate::events::TurnNotifier;
use crate::models::{normalize_plate, NewTurn, Turn, TurnSummary, Workshop, WorkshopDirectory};
use crate::scheduling::clock::Clock;
use crate::state_machine::{admission_state, is_allowed, TurnState};
use crate::store::{NewTurnRow, Store, StoreTx, TimestampField};

/// Snapshot of a workshop's live queue for the public status board.
#[derive(Debug, Clone)]
pub struct QueueStatus {
    pub workshop: Workshop,
    pub in_service: Vec<TurnSummary>,
    pub waiting: Vec<TurnSummary>,
}

#[derive(Clone)]
pub struct QueueEngine {
    store: Store,
    directory: WorkshopDirectory,
    clock: Arc<dyn Clock>,
    notifier: TurnNotifier,
    deadline: Duration,
}

impl QueueEngine {
    pub fn new(
        store: Store,
        directory: WorkshopDirectory,
        clock: Arc<dyn Clock>,
        notifier: TurnNotifier,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            directory,
            clock,
            notifier,
            deadline,
        }
    }

    /// Admit a new turn: next monotonic number, straight into service when
    /// a slot is free, otherwise waiting.
    #[instrument(skip(self, new_turn))]
    pub async fn create_turn(&self, workshop_id: i64, new_turn: NewTurn) -> Result<Turn> {
        let (tx, turn) = timeout(self.deadline, self.admit_turn(workshop_id, new_turn))
            .await
            .map_err(|_| TurneroError::Timeout("turn creation".to_string()))??;

        tx.commit().await?;

        info!(
            workshop_id,
            turn_id = turn.id,
            turn_number = turn.turn_number,
            state = %turn.state,
            "Turn created"
        );
        Ok(turn)
    }

    async fn admit_turn(&self, workshop_id: i64, new_turn: NewTurn) -> Result<(StoreTx, Turn)> {
        let mut tx = self.store.begin().await?;

        let workshop = tx
            .lock_workshop(workshop_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Workshop".to_string()))?;

        let plate = normalize_plate(&new_turn.plate);
        if plate.is_empty() {
            return Err(TurneroError::Validation(
                "plate must not be empty".to_string(),
            ));
        }

        if let Some(existing) = tx.find_non_terminal_by_plate(workshop_id, &plate).await? {
            return Err(TurneroError::DuplicatePlate {
                turn_number: existing.turn_number,
            });
        }

        let next_number = tx.max_turn_number(workshop_id).await? + 1;
        let in_service = tx.count_in_service(workshop_id).await?;
        let state = admission_state(in_service, workshop.capacity);

        let now = self.clock.now();
        let turn = tx
            .insert_turn(NewTurnRow {
                workshop_id,
                turn_number: next_number,
                customer_name: new_turn.customer_name,
                phone: new_turn.phone,
                vehicle_model: new_turn.vehicle_model,
                plate,
                problem: new_turn.problem,
                state,
                created_at: now,
                started_at: state.is_active().then_some(now),
            })
            .await?;

        let notifier = self.notifier.clone();
        let snapshot = turn.clone();
        tx.after_commit(move || notifier.turn_created(&snapshot));

        Ok((tx, turn))
    }

    /// Complete an in-service turn and promote the oldest waiter into the
    /// freed slot, if occupancy allows.
    #[instrument(skip(self))]
    pub async fn finalize_turn(&self, turn_id: i64) -> Result<Turn> {
        let (tx, turn) = timeout(self.deadline, self.finalize_in_tx(turn_id))
            .await
            .map_err(|_| TurneroError::Timeout("turn finalization".to_string()))??;

        tx.commit().await?;

        info!(turn_id, turn_number = turn.turn_number, "Turn finalized");
        Ok(turn)
    }

    async fn finalize_in_tx(&self, turn_id: i64) -> Result<(StoreTx, Turn)> {
        let mut tx = self.store.begin().await?;

        // Resolve the parent first; the workshop lock always precedes any
        // turn lock inside a transaction.
        let preview = tx
            .get_turn(turn_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Turn".to_string()))?;
        let workshop = tx
            .lock_workshop(preview.workshop_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Workshop".to_string()))?;
        let turn = tx
            .lock_turn(turn_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Turn".to_string()))?;

        let current = self.current_state(&turn)?;
        if !is_allowed(current, TurnState::Finalized) {
            return Err(TurneroError::StateConflict {
                current: turn.state.clone(),
                attempted: "finalize".to_string(),
            });
        }

        let finalized = tx
            .update_turn_state(
                turn.id,
                TurnState::Finalized,
                TimestampField::FinalizedAt,
                self.clock.now(),
            )
            .await?;

        self.promote_oldest_waiting(&mut tx, &workshop).await?;

        Ok((tx, finalized))
    }

    /// Cancel a turn after the caller proved plate knowledge. Cancelling an
    /// in-service turn frees a slot, so it promotes like a finalize.
    #[instrument(skip(self, presented_plate))]
    pub async fn cancel_turn(&self, turn_id: i64, presented_plate: &str) -> Result<Turn> {
        let (tx, turn) = timeout(self.deadline, self.cancel_in_tx(turn_id, presented_plate))
            .await
            .map_err(|_| TurneroError::Timeout("turn cancellation".to_string()))??;

        tx.commit().await?;

        info!(turn_id, turn_number = turn.turn_number, "Turn cancelled");
        Ok(turn)
    }

    async fn cancel_in_tx(&self, turn_id: i64, presented_plate: &str) -> Result<(StoreTx, Turn)> {
        let mut tx = self.store.begin().await?;

        let preview = tx
            .get_turn(turn_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Turn".to_string()))?;
        let workshop = tx
            .lock_workshop(preview.workshop_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Workshop".to_string()))?;
        let turn = tx
            .lock_turn(turn_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Turn".to_string()))?;

        if normalize_plate(presented_plate) != turn.plate {
            return Err(TurneroError::Forbidden(
                "plate does not match this turn".to_string(),
            ));
        }

        self.cancel_locked(&mut tx, &workshop, turn).await
            .map(|cancelled| (tx, cancelled))
    }

    /// Cancel the unique live turn for a plate without knowing its id.
    /// Public-endpoint convenience; the plate itself is the proof.
    #[instrument(skip(self, presented_plate))]
    pub async fn cancel_by_plate(&self, workshop_id: i64, presented_plate: &str) -> Result<Turn> {
        let (tx, turn) = timeout(
            self.deadline,
            self.cancel_by_plate_in_tx(workshop_id, presented_plate),
        )
        .await
        .map_err(|_| TurneroError::Timeout("turn cancellation".to_string()))??;

        tx.commit().await?;

        info!(
            workshop_id,
            turn_number = turn.turn_number,
            "Turn cancelled by plate"
        );
        Ok(turn)
    }

    async fn cancel_by_plate_in_tx(
        &self,
        workshop_id: i64,
        presented_plate: &str,
    ) -> Result<(StoreTx, Turn)> {
        let mut tx = self.store.begin().await?;

        let workshop = tx
            .lock_workshop(workshop_id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Workshop".to_string()))?;

        let plate = normalize_plate(presented_plate);
        if plate.is_empty() {
            return Err(TurneroError::Validation(
                "plate must not be empty".to_string(),
            ));
        }

        let turn = tx
            .find_non_terminal_by_plate(workshop_id, &plate)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Active turn for plate".to_string()))?;

        self.cancel_locked(&mut tx, &workshop, turn).await
            .map(|cancelled| (tx, cancelled))
    }

    /// Shared cancel tail: the turn row is already locked and the caller
    /// has authorised the request.
    async fn cancel_locked(
        &self,
        tx: &mut StoreTx,
        workshop: &Workshop,
        turn: Turn,
    ) -> Result<Turn> {
        let prior_state = self.current_state(&turn)?;
        if !is_allowed(prior_state, TurnState::Cancelled) {
            return Err(TurneroError::StateConflict {
                current: turn.state.clone(),
                attempted: "cancel".to_string(),
            });
        }

        let cancelled = tx
            .update_turn_state(
                turn.id,
                TurnState::Cancelled,
                TimestampField::CancelledAt,
                self.clock.now(),
            )
            .await?;

        // Only an in-service cancellation frees a slot.
        if prior_state == TurnState::InService {
            self.promote_oldest_waiting(tx, workshop).await?;
        }

        Ok(cancelled)
    }

    /// Move the oldest waiter into service. Exactly one promotion per freed
    /// slot, and none while occupancy still meets or exceeds capacity
    /// (capacity may have been lowered below the live count).
    async fn promote_oldest_waiting(
        &self,
        tx: &mut StoreTx,
        workshop: &Workshop,
    ) -> Result<Option<Turn>> {
        let in_service = tx.count_in_service(workshop.id).await?;
        if in_service >= i64::from(workshop.capacity) {
            return Ok(None);
        }

        let Some(waiter) = tx.oldest_waiting(workshop.id).await? else {
            return Ok(None);
        };

        let promoted = tx
            .update_turn_state(
                waiter.id,
                TurnState::InService,
                TimestampField::StartedAt,
                self.clock.now(),
            )
            .await?;

        info!(
            workshop_id = workshop.id,
            turn_id = promoted.id,
            turn_number = promoted.turn_number,
            "Waiting turn promoted into service"
        );
        Ok(Some(promoted))
    }

    /// Public status board: non-terminal turns split by state, queue order.
    /// Read-only, no locks; a turn mid-transition may appear on either side.
    pub async fn status(&self, workshop_id: i64) -> Result<QueueStatus> {
        let workshop = self.directory.get(workshop_id).await?;
        let turns = self.store.list_non_terminal(workshop_id).await?;

        let in_service = turns
            .iter()
            .filter(|t| t.state == "IN_SERVICE")
            .filter_map(Turn::summary)
            .collect();
        let waiting = turns
            .iter()
            .filter(|t| t.state == "WAITING")
            .filter_map(Turn::summary)
            .collect();

        Ok(QueueStatus {
            workshop,
            in_service,
            waiting,
        })
    }

    /// Admin listing. Without a plate filter: live queue only. With one:
    /// case-insensitive substring match including finished turns, for
    /// customer lookup.
    pub async fn list(&self, workshop_id: i64, plate_query: Option<&str>) -> Result<Vec<Turn>> {
        self.directory.get(workshop_id).await?;

        match plate_query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => self.store.list_by_plate_substring(workshop_id, query).await,
            None => self.store.list_non_terminal(workshop_id).await,
        }
    }

    fn current_state(&self, turn: &Turn) -> Result<TurnState> {
        turn.turn_state()
            .map_err(|e| TurneroError::Internal(format!("Corrupt turn state: {e}")))
    }
}
