use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// Login account for this doctor. Directory-only doctors have none.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub specialization: String,
    pub is_active: bool,
}
