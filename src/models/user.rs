use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account provisioned by the identity subsystem. Roles (patient,
/// doctor) hang off this record; it carries no role data itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}
