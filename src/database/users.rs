use sqlx::PgPool;
use uuid::Uuid;

use super::models::{ImageRef, User};

const USER_COLUMNS: &str = "id, full_name, email, password, age, phone_number, \
     image_url, public_id, session_version, created_at, updated_at";

pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
    pub phone_number: String,
    pub profile_picture: ImageRef,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Email lookup is case-insensitive; addresses are stored lowercased.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = lower($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_phone(pool: &PgPool, phone_number: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"
    ))
    .bind(phone_number)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, new_user: NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (full_name, email, password, age, phone_number, image_url, public_id) \
         VALUES ($1, lower($2), $3, $4, $5, $6, $7) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(new_user.full_name)
    .bind(new_user.email)
    .bind(new_user.password)
    .bind(new_user.age)
    .bind(new_user.phone_number)
    .bind(new_user.profile_picture.image_url)
    .bind(new_user.profile_picture.public_id)
    .fetch_one(pool)
    .await
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    full_name: &str,
    age: i32,
    profile_picture: &ImageRef,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users \
         SET full_name = $1, age = $2, image_url = $3, public_id = $4, updated_at = now() \
         WHERE id = $5 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(full_name)
    .bind(age)
    .bind(&profile_picture.image_url)
    .bind(&profile_picture.public_id)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Increment the account's session version, invalidating every previously
/// issued token. Returns the new version.
pub async fn bump_session_version(pool: &PgPool, id: Uuid) -> Result<i32, sqlx::Error> {
    let (version,): (i32,) = sqlx::query_as(
        "UPDATE users SET session_version = session_version + 1, updated_at = now() \
         WHERE id = $1 \
         RETURNING session_version",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(version)
}
