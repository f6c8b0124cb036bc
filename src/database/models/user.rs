use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::ImageRef;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    // Bcrypt hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password: String,
    pub age: i32,
    pub phone_number: String,
    #[sqlx(flatten)]
    #[serde(rename = "profilePicture")]
    pub profile_picture: ImageRef,
    pub session_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
