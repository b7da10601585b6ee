//! Loading and storing readings in PostgreSQL.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{Reading, SignalTable};

// ---

/// Per-machine inventory row.
#[derive(Debug, sqlx::FromRow)]
pub struct MachineSummary {
    pub machine_id: String,
    pub readings: i64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Load the whole signal, ordered by machine then time.
pub async fn load_signal_table(pool: &PgPool) -> Result<SignalTable, sqlx::Error> {
    // ---
    let readings: Vec<Reading> = sqlx::query_as(
        r#"
        SELECT timestamp, machine_id, energy_kwh, is_operational, maintenance_flag
        FROM energy_readings
        ORDER BY machine_id, timestamp, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    tracing::debug!("Loaded {} readings", readings.len());
    Ok(SignalTable::new(readings))
}

pub async fn list_machines(pool: &PgPool) -> Result<Vec<MachineSummary>, sqlx::Error> {
    // ---
    sqlx::query_as(
        r#"
        SELECT
            machine_id,
            COUNT(*)                                  AS readings,
            MIN((timestamp AT TIME ZONE 'UTC')::date) AS first_date,
            MAX((timestamp AT TIME ZONE 'UTC')::date) AS last_date
        FROM energy_readings
        GROUP BY machine_id
        ORDER BY machine_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Insert readings in a single transaction; returns the number inserted.
pub async fn insert_readings(pool: &PgPool, readings: &[Reading]) -> Result<u64, sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    for reading in readings {
        sqlx::query(
            r#"
            INSERT INTO energy_readings (
                timestamp, machine_id, energy_kwh, is_operational, maintenance_flag
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(reading.timestamp)
        .bind(&reading.machine_id)
        .bind(reading.energy_kwh)
        .bind(reading.is_operational)
        .bind(reading.maintenance_flag)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(readings.len() as u64)
}
