use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    services::{admin_service, user_service},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Authenticated caller, resolved once from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub role: Role,
}

impl Principal {
    pub fn user(id: i32) -> Self {
        Self {
            id,
            role: Role::User,
        }
    }

    pub fn admin(id: i32) -> Self {
        Self {
            id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Id of the customer this principal acts as.
    pub fn customer_id(&self) -> AppResult<i32> {
        match self.role {
            Role::User => Ok(self.id),
            Role::Admin => Err(AppError::Forbidden),
        }
    }
}

/// Principal that is guaranteed to carry the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminPrincipal(pub Principal);

pub fn issue_token(
    principal: Principal,
    secret: &str,
    ttl_hours: i64,
) -> AppResult<(String, i64)> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: principal.id.to_string(),
        role: principal.role,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok((token, expiration.timestamp()))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Principal> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let id = decoded
        .claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Invalid subject in token".into()))?;

    Ok(Principal {
        id,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let principal = verify_token(token, &state.config.jwt_secret)?;
        ensure_live(state, principal).await?;
        Ok(principal)
    }
}

/// Rejects tokens whose account has been deleted since they were issued.
async fn ensure_live(state: &AppState, principal: Principal) -> AppResult<()> {
    let found = match principal.role {
        Role::User => user_service::find_live(&state.orm, principal.id).await.map(|_| ()),
        Role::Admin => admin_service::find_live(&state.orm, principal.id).await.map(|_| ()),
    };
    found.map_err(|err| match err {
        AppError::NotFound(_) => AppError::Unauthorized("Account no longer exists".into()),
        other => other,
    })
}

impl FromRequestParts<AppState> for AdminPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(AdminPrincipal(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_principal() {
        let (token, exp) = issue_token(Principal::admin(7), SECRET, 1).unwrap();
        assert!(exp > Utc::now().timestamp());
        let principal = verify_token(&token, SECRET).unwrap();
        assert_eq!(principal, Principal::admin(7));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let (token, _) = issue_token(Principal::user(1), SECRET, 1).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = verify_token("not-a-token", SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn admins_cannot_act_as_customers() {
        assert_eq!(Principal::user(3).customer_id().unwrap(), 3);
        assert!(matches!(
            Principal::admin(3).customer_id(),
            Err(AppError::Forbidden)
        ));
    }
}
