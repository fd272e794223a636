// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Config, error::AppError, models::user::Identity};

/// JWT Claims issued by the identity provider.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the user's uuid.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a token the same way the identity provider does.
/// Used by development tooling and the test suite.
pub fn sign_jwt(
    id: Uuid,
    email: Option<&str>,
    name: Option<&str>,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        email: email.map(str::to_owned),
        name: name.map(str::to_owned),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    // Provider tokens carry an audience we do not pin.
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Resolves the identity carried by an `Authorization: Bearer <token>` header.
/// `Ok(None)` when no bearer header is present.
fn identity_from_request(req: &Request<Body>, secret: &str) -> Result<Option<Identity>, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        Some(_) => return Err(AppError::AuthError("Malformed authorization header".to_string())),
        None => return Ok(None),
    };

    let claims = verify_jwt(token, secret)?;
    let identity = Identity::try_from(&claims)
        .map_err(|_| AppError::AuthError("Token subject is not a user id".to_string()))?;

    Ok(Some(identity))
}

/// Axum Middleware: Authentication.
///
/// Validates the bearer token and injects the caller's `Identity` into the
/// request extensions. Missing or invalid tokens get 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match identity_from_request(&req, &config.jwt_secret) {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Ok(None) | Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Axum Middleware: Optional Authentication.
///
/// Always injects an `Option<Identity>`: `Some` for a valid token, `None` when
/// no token is sent. A token that is present but invalid is still rejected.
pub async fn optional_auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match identity_from_request(&req, &config.jwt_secret) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}
