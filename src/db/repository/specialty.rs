use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Specialty;

fn row_to_specialty(row: &rusqlite::Row<'_>) -> rusqlite::Result<Specialty> {
    Ok(Specialty {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
    })
}

pub fn insert_specialty(conn: &Connection, specialty: &Specialty) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO specialties (id, name) VALUES (?1, ?2)",
        params![specialty.id.to_string(), specialty.name],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::ConstraintViolation(format!(
                "specialty {:?} already exists",
                specialty.name
            ))
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn list_specialties(conn: &Connection) -> Result<Vec<Specialty>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM specialties ORDER BY name")?;
    let rows = stmt.query_map([], row_to_specialty)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
