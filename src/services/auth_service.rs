use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, Profile, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::{Principal, Role, issue_token},
    models::User,
    response::{ApiResponse, Meta},
    services::{admin_service, user_service},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    user_service::create_user(state, payload.into()).await
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest {
        email,
        password,
        admin,
    } = payload;

    let credentials = if admin {
        admin_service::find_by_email(&state.orm, &email)
            .await?
            .map(|a| (Principal::admin(a.id), a.password_hash))
    } else {
        user_service::find_by_email(&state.orm, &email)
            .await?
            .map(|u| (Principal::user(u.id), u.password_hash))
    };

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let (principal, password_hash) = credentials.ok_or_else(invalid)?;
    if !verify_password(&password, &password_hash)? {
        return Err(invalid());
    }

    let (token, expires_at) = issue_token(
        principal,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;

    tracing::info!(id = principal.id, role = ?principal.role, "logged in");
    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token,
            role: principal.role,
            expires_at,
        },
        Some(Meta::empty()),
    ))
}

pub async fn profile(state: &AppState, principal: Principal) -> AppResult<ApiResponse<Profile>> {
    let profile = match principal.role {
        Role::User => Profile::User(user_service::find_live(&state.orm, principal.id).await?.into()),
        Role::Admin => {
            Profile::Admin(admin_service::find_live(&state.orm, principal.id).await?.into())
        }
    };
    Ok(ApiResponse::success("Profile", profile, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hash = hash_password("s3cret!").unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
