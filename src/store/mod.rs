//! Transactional persistence for the queue engine.
//!
//! [`Store`] wraps the connection pool; [`StoreTx`] exposes exactly the
//! locking primitives and filtered queries the engine needs, plus a
//! post-commit hook queue so side effects can never fire for a rolled-back
//! transaction. Pessimistic locks are `SELECT ... FOR UPDATE`; the workshop
//! row is the serialisation root for all queue mutations of one workshop.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Result;
use crate::models::{Turn, Workshop};
use crate::state_machine::TurnState;

const TURN_COLUMNS: &str = "id, workshop_id, turn_number, customer_name, phone, \
     vehicle_model, plate, problem, state, created_at, started_at, finalized_at, cancelled_at";

/// Timestamp column written together with a state change. A closed enum so
/// column names never come from request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    StartedAt,
    FinalizedAt,
    CancelledAt,
}

impl TimestampField {
    fn column(self) -> &'static str {
        match self {
            Self::StartedAt => "started_at",
            Self::FinalizedAt => "finalized_at",
            Self::CancelledAt => "cancelled_at",
        }
    }
}

/// Row image for inserting a new turn. The engine fills state, numbering
/// and timestamps; everything else comes from the validated payload.
#[derive(Debug, Clone)]
pub struct NewTurnRow {
    pub workshop_id: i64,
    pub turn_number: i32,
    pub customer_name: String,
    pub phone: String,
    pub vehicle_model: String,
    pub plate: String,
    pub problem: Option<String>,
    pub state: TurnState,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<StoreTx> {
        let tx = self.pool.begin().await?;
        Ok(StoreTx {
            tx,
            hooks: Vec::new(),
        })
    }

    /// Non-terminal turns of a workshop, queue order.
    pub async fn list_non_terminal(&self, workshop_id: i64) -> Result<Vec<Turn>> {
        let turns = sqlx::query_as::<_, Turn>(&format!(
            r#"
            SELECT {TURN_COLUMNS}
            FROM turns
            WHERE workshop_id = $1 AND state IN ('WAITING', 'IN_SERVICE')
            ORDER BY turn_number ASC
            "#
        ))
        .bind(workshop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(turns)
    }

    /// Case-insensitive substring search on plate, terminal rows included.
    pub async fn list_by_plate_substring(
        &self,
        workshop_id: i64,
        plate_query: &str,
    ) -> Result<Vec<Turn>> {
        let pattern = format!("%{}%", escape_like(plate_query));

        let turns = sqlx::query_as::<_, Turn>(&format!(
            r#"
            SELECT {TURN_COLUMNS}
            FROM turns
            WHERE workshop_id = $1 AND plate ILIKE $2
            ORDER BY turn_number ASC
            "#
        ))
        .bind(workshop_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(turns)
    }
}

/// One open transaction. Dropping it without [`StoreTx::commit`] rolls
/// back and discards any queued hooks.
pub struct StoreTx {
    tx: Transaction<'static, Postgres>,
    hooks: Vec<Box<dyn FnOnce() + Send + 'static>>,
}

impl StoreTx {
    /// Lock the workshop row. Serialises all create/finalize/cancel for
    /// this workshop until commit.
    pub async fn lock_workshop(&mut self, id: i64) -> Result<Option<Workshop>> {
        let workshop = sqlx::query_as::<_, Workshop>(
            r#"
            SELECT id, name, address, logo, capacity, created_at, updated_at
            FROM workshops
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(workshop)
    }

    /// Read a turn without locking it. Used to resolve the parent workshop
    /// before taking any turn lock, keeping the workshop-first lock order.
    pub async fn get_turn(&mut self, id: i64) -> Result<Option<Turn>> {
        let turn = sqlx::query_as::<_, Turn>(&format!(
            "SELECT {TURN_COLUMNS} FROM turns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(turn)
    }

    pub async fn lock_turn(&mut self, id: i64) -> Result<Option<Turn>> {
        let turn = sqlx::query_as::<_, Turn>(&format!(
            "SELECT {TURN_COLUMNS} FROM turns WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(turn)
    }

    /// Highest number ever issued in this workshop, terminal rows included.
    /// Numbers are never reused.
    pub async fn max_turn_number(&mut self, workshop_id: i64) -> Result<i32> {
        let max: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(turn_number), 0) FROM turns WHERE workshop_id = $1",
        )
        .bind(workshop_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(max)
    }

    pub async fn count_in_service(&mut self, workshop_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM turns WHERE workshop_id = $1 AND state = 'IN_SERVICE'",
        )
        .bind(workshop_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    /// The unique live turn for this plate, if any. Locked, since callers
    /// either reject on it or cancel it.
    pub async fn find_non_terminal_by_plate(
        &mut self,
        workshop_id: i64,
        plate: &str,
    ) -> Result<Option<Turn>> {
        let turn = sqlx::query_as::<_, Turn>(&format!(
            r#"
            SELECT {TURN_COLUMNS}
            FROM turns
            WHERE workshop_id = $1 AND plate = $2 AND state IN ('WAITING', 'IN_SERVICE')
            LIMIT 1
            FOR UPDATE
            "#
        ))
        .bind(workshop_id)
        .bind(plate)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(turn)
    }

    /// Promotion candidate: oldest waiter, ties broken by turn number so
    /// replay is deterministic. Row-locked so two finalizes can never
    /// promote the same waiter.
    pub async fn oldest_waiting(&mut self, workshop_id: i64) -> Result<Option<Turn>> {
        let turn = sqlx::query_as::<_, Turn>(&format!(
            r#"
            SELECT {TURN_COLUMNS}
            FROM turns
            WHERE workshop_id = $1 AND state = 'WAITING'
            ORDER BY created_at ASC, turn_number ASC
            LIMIT 1
            FOR UPDATE
            "#
        ))
        .bind(workshop_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(turn)
    }

    pub async fn insert_turn(&mut self, row: NewTurnRow) -> Result<Turn> {
        let turn = sqlx::query_as::<_, Turn>(&format!(
            r#"
            INSERT INTO turns
                (workshop_id, turn_number, customer_name, phone, vehicle_model,
                 plate, problem, state, created_at, started_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {TURN_COLUMNS}
            "#
        ))
        .bind(row.workshop_id)
        .bind(row.turn_number)
        .bind(&row.customer_name)
        .bind(&row.phone)
        .bind(&row.vehicle_model)
        .bind(&row.plate)
        .bind(&row.problem)
        .bind(row.state.to_string())
        .bind(row.created_at)
        .bind(row.started_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(turn)
    }

    /// Write a state change together with its timestamp in one statement,
    /// so the timestamp is set exactly once on first entry into the state.
    pub async fn update_turn_state(
        &mut self,
        id: i64,
        new_state: TurnState,
        field: TimestampField,
        at: DateTime<Utc>,
    ) -> Result<Turn> {
        let turn = sqlx::query_as::<_, Turn>(&format!(
            r#"
            UPDATE turns
            SET state = $2, {} = $3
            WHERE id = $1
            RETURNING {TURN_COLUMNS}
            "#,
            field.column()
        ))
        .bind(id)
        .bind(new_state.to_string())
        .bind(at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(turn)
    }

    /// Queue a side effect to run after a successful commit. Hooks are
    /// dropped, never run, on rollback.
    pub fn after_commit(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;

        for hook in self.hooks {
            hook();
        }

        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Escape LIKE metacharacters so a plate query is a literal substring
/// match.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
