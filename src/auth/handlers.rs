use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Must be a valid email".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate_credentials(&payload.email, &payload.password)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    // Two registrations can race past the existence check; the unique index
    // on email settles it.
    let user = User::create(&state.db, &payload.email, &hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already registered".into())
            } else {
                ApiError::from(e)
            }
        })?;

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token: token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password share one error so callers cannot
    // enumerate accounts.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Authentication);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Authentication);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token: token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_credentials_accepts_minimum_password() {
        assert!(validate_credentials("user@example.com", "123456").is_ok());
    }

    #[test]
    fn validate_credentials_rejects_short_password() {
        let err = validate_credentials("user@example.com", "12345").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn validate_credentials_rejects_bad_email() {
        let err = validate_credentials("not-an-email", "123456").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
