//! One-shot repair for appointments imported without a doctor reference.
//!
//! Databases migrated from the legacy system can hold appointment rows
//! whose `doctor_id` is NULL. On startup (after schema migrations) those
//! rows are bulk-assigned to a sentinel doctor. The pass is idempotent:
//! once no doctor-less rows remain, re-running it updates nothing and
//! creates no second sentinel.

use rusqlite::{params, Connection};

use super::repository::doctor;
use super::DatabaseError;

pub const SENTINEL_DOCTOR_NAME: &str = "Default System Doctor";
pub const SENTINEL_SPECIALIZATION: &str = "General Medicine";

/// Assign the sentinel doctor to every appointment lacking one.
/// Returns the number of rows updated (0 when there is nothing to do).
pub fn backfill_default_doctor(conn: &Connection) -> Result<usize, DatabaseError> {
    let orphaned: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE doctor_id IS NULL",
        [],
        |row| row.get(0),
    )?;
    if orphaned == 0 {
        return Ok(0);
    }

    let sentinel =
        doctor::find_or_create_by_name(conn, SENTINEL_DOCTOR_NAME, SENTINEL_SPECIALIZATION)?;

    let updated = conn.execute(
        "UPDATE appointments SET doctor_id = ?1 WHERE doctor_id IS NULL",
        params![sentinel.id.to_string()],
    )?;
    tracing::info!(updated, "Assigned sentinel doctor to legacy appointments");

    Ok(updated)
}
