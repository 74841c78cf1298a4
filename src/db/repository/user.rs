use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::User;

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        username: row.get(1)?,
        display_name: row.get(2)?,
    })
}

/// Insert an account. `token_hash` is the base64url SHA-256 of the
/// bearer token; accounts without one cannot authenticate.
pub fn insert_user(
    conn: &Connection,
    user: &User,
    token_hash: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, username, display_name, token_hash) VALUES (?1, ?2, ?3, ?4)",
        params![user.id.to_string(), user.username, user.display_name, token_hash],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::ConstraintViolation(format!(
                "username {:?} is already taken",
                user.username
            ))
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: Uuid) -> Result<User, DatabaseError> {
    conn.query_row(
        "SELECT id, username, display_name FROM users WHERE id = ?1",
        params![id.to_string()],
        row_to_user,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "user".into(),
            id: id.to_string(),
        },
        other => other.into(),
    })
}

/// Look up the account owning a bearer token, by token hash.
pub fn find_by_token_hash(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, username, display_name FROM users WHERE token_hash = ?1",
        params![token_hash],
        row_to_user,
    );
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
