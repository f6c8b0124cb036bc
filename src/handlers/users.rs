use axum::extract::{Extension, Json, Multipart, Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::models::{ImageRef, User};
use crate::database::users;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;
use crate::upload;

const BCRYPT_COST: u32 = 10;

/// POST /register (multipart)
///
/// Email and phone number are checked for conflicts before the picture is
/// uploaded; the staged file is removed on every path by its guard. Email is
/// stored lowercased and matched case-insensitively.
pub async fn register(State(state): State<AppState>, multipart: Multipart) -> ApiResult<User> {
    let mut form = upload::read_form(multipart, "profilePicture", &state.config.upload).await?;

    let full_name = required(form.field("fullName"), "fullName is required")?;
    let email = required(form.field("email"), "email is required")?.to_lowercase();
    let password = required(form.field("password"), "password is required")?;
    let age = parse_age(form.field("age"))?;
    let phone_number = required(form.field("phoneNumber"), "phoneNumber is required")?;

    let email_taken = users::find_by_email(&state.pool, &email).await?.is_some();
    let phone_taken = users::find_by_phone(&state.pool, &phone_number).await?.is_some();
    if email_taken || phone_taken {
        return Err(ApiError::conflict("User already exists"));
    }

    let staged = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("Profile picture is required"))?;

    let asset = state.media.upload(staged.path()).await?;
    staged.remove();

    let hashed = bcrypt::hash(&password, BCRYPT_COST)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let new_user = users::NewUser {
        full_name,
        email,
        password: hashed,
        age,
        phone_number,
        profile_picture: ImageRef {
            image_url: asset.url.clone(),
            public_id: asset.asset_id.clone(),
        },
    };

    match users::insert(&state.pool, new_user).await {
        Ok(user) => Ok(ApiResponse::created("Created successfully", user)),
        Err(e) => {
            if let Err(destroy_err) = state.media.destroy(&asset.asset_id).await {
                tracing::warn!(
                    "failed to destroy orphaned asset {}: {}",
                    asset.asset_id,
                    destroy_err
                );
            }
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: User,
}

/// POST /login
///
/// A successful login bumps the account's session version and issues the
/// token against the new value, so any earlier token stops working.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginData> {
    let mut user = users::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let password_ok = bcrypt::verify(&payload.password, &user.password)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !password_ok {
        return Err(ApiError::bad_request("Incorrect password"));
    }

    let version = users::bump_session_version(&state.pool, user.id).await?;
    user.session_version = version;

    let claims = Claims::new(user.id, version, state.config.security.jwt_expiry_hours);
    let token = auth::issue_token(&claims, &state.config.security.jwt_secret)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "login successful");
    Ok(ApiResponse::success("Login successful", LoginData { token, user }))
}

/// POST /logout (protected)
///
/// Bumping the session version invalidates the presented token along with any
/// other token issued for the account.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<()> {
    users::bump_session_version(&state.pool, current_user.user_id).await?;
    Ok(ApiResponse::message("Logged out successfully"))
}

/// PUT /users/update/:id (multipart, every field optional)
///
/// Same image-swap discipline as the product update: upload, persist, then
/// destroy the replaced asset; on a failed persist, destroy the new one.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<User> {
    let mut form = upload::read_form(multipart, "profilePicture", &state.config.upload).await?;

    let user = users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let full_name = form
        .field("fullName")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| user.full_name.clone());
    let age = match form.field("age") {
        Some(raw) => parse_age(Some(raw))?,
        None => user.age,
    };

    match form.file.take() {
        Some(staged) => {
            let new_asset = state.media.upload(staged.path()).await?;
            staged.remove();

            let new_picture = ImageRef {
                image_url: new_asset.url.clone(),
                public_id: new_asset.asset_id.clone(),
            };

            match users::update_profile(&state.pool, user.id, &full_name, age, &new_picture).await {
                Ok(updated) => {
                    if let Err(e) = state.media.destroy(&user.profile_picture.public_id).await {
                        tracing::warn!(
                            "failed to destroy replaced asset {}: {}",
                            user.profile_picture.public_id,
                            e
                        );
                    }
                    Ok(ApiResponse::success("User updated successfully", updated))
                }
                Err(e) => {
                    if let Err(destroy_err) = state.media.destroy(&new_asset.asset_id).await {
                        tracing::warn!(
                            "failed to destroy orphaned asset {}: {}",
                            new_asset.asset_id,
                            destroy_err
                        );
                    }
                    Err(e.into())
                }
            }
        }
        None => {
            let updated =
                users::update_profile(&state.pool, user.id, &full_name, age, &user.profile_picture)
                    .await?;
            Ok(ApiResponse::success("User updated successfully", updated))
        }
    }
}

/// GET /users/get-one/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<User> {
    let user = users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success("User", user))
}

fn required(value: Option<&str>, message: &str) -> Result<String, ApiError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(message))
}

fn parse_age(raw: Option<&str>) -> Result<i32, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("age is required"))?;
    let age: i32 = raw
        .parse()
        .map_err(|_| ApiError::bad_request("age must be a whole number"))?;
    if age < 0 {
        return Err(ApiError::bad_request("age must be a non-negative number"));
    }
    Ok(age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_parses_whole_numbers_only() {
        assert_eq!(parse_age(Some("36")).expect("age"), 36);
        assert!(parse_age(Some("36.5")).is_err());
        assert!(parse_age(Some("-1")).is_err());
        assert!(parse_age(None).is_err());
    }

    #[test]
    fn required_trims_input() {
        assert_eq!(
            required(Some("  ada@Example.com "), "email is required").expect("email"),
            "ada@Example.com"
        );
        assert!(required(Some(""), "email is required").is_err());
    }
}
