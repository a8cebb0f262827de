use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    // Billing fields carried on the record; no business logic reads them.
    pub customer_id: String,
    pub subscription: String,
    pub created_at: DateTime<Utc>,
}
