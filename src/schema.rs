//! Database schema management for `smartenergy-watch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `energy_readings` table holding the raw signal. Safe to call on
/// every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Raw signal; anomaly labels are derived per request and never stored
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS energy_readings (
            id               BIGSERIAL PRIMARY KEY,
            timestamp        TIMESTAMPTZ      NOT NULL,
            machine_id       TEXT             NOT NULL,
            energy_kwh       DOUBLE PRECISION NOT NULL,
            is_operational   BOOLEAN          NOT NULL,
            maintenance_flag BOOLEAN
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_energy_readings_machine_ts
            ON energy_readings (machine_id, timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
