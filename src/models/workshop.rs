use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::{Result, TurneroError};

/// Workshop represents an independent service unit with its own queue,
/// capacity and numbering space. Maps to the `workshops` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Workshop {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub logo: Option<String>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New workshop for creation (administrative path)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkshop {
    pub name: String,
    pub address: Option<String>,
    pub logo: Option<String>,
    pub capacity: i32,
}

impl Workshop {
    /// Create a new workshop
    pub async fn create(pool: &PgPool, new_workshop: NewWorkshop) -> Result<Workshop> {
        let workshop = sqlx::query_as::<_, Workshop>(
            r#"
            INSERT INTO workshops (name, address, logo, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, logo, capacity, created_at, updated_at
            "#,
        )
        .bind(&new_workshop.name)
        .bind(&new_workshop.address)
        .bind(&new_workshop.logo)
        .bind(new_workshop.capacity)
        .fetch_one(pool)
        .await?;

        Ok(workshop)
    }

    /// Find a workshop by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Workshop>> {
        let workshop = sqlx::query_as::<_, Workshop>(
            r#"
            SELECT id, name, address, logo, capacity, created_at, updated_at
            FROM workshops
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(workshop)
    }

    /// List all workshops ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Workshop>> {
        let workshops = sqlx::query_as::<_, Workshop>(
            r#"
            SELECT id, name, address, logo, capacity, created_at, updated_at
            FROM workshops
            ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(workshops)
    }

    /// Change the service bay capacity. Turns already in service are never
    /// evicted; promotion simply pauses until occupancy drops below the
    /// new value.
    pub async fn update_capacity(pool: &PgPool, id: i64, capacity: i32) -> Result<Workshop> {
        if capacity < 1 {
            return Err(TurneroError::Validation(
                "capacity must be at least 1".to_string(),
            ));
        }

        let workshop = sqlx::query_as::<_, Workshop>(
            r#"
            UPDATE workshops
            SET capacity = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, address, logo, capacity, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(capacity)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| TurneroError::NotFound("Workshop".to_string()))?;

        Ok(workshop)
    }
}

/// Read-only lookup of workshop identity, capacity and soft metadata.
///
/// Serves the status/list endpoints and admin display; the engine's own
/// reads go through store locks instead.
#[derive(Debug, Clone)]
pub struct WorkshopDirectory {
    pool: PgPool,
}

impl WorkshopDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Workshop> {
        Workshop::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| TurneroError::NotFound("Workshop".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Workshop>> {
        Workshop::list(&self.pool).await
    }
}
