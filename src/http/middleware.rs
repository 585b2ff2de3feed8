//! Authentication middleware and JWT handling

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::app::AppState;
use crate::store::users::ROLE_ADMIN;
use crate::util::time::unix_secs;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
}

fn signature_for(message: &str, secret: &str) -> Result<Vec<u8>, AuthError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::InvalidToken)?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Issue an HS256 token for a user, valid for `ttl_secs`.
pub fn sign_jwt(
    user_id: Uuid,
    username: &str,
    role: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let now = unix_secs();
    let claims = JwtClaims {
        sub: user_id,
        username: username.to_string(),
        role: role.to_string(),
        exp: now + ttl_secs,
        iat: now,
    };

    let header_b64 = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload_json = serde_json::to_vec(&claims).map_err(|_| AuthError::InvalidToken)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);

    let message = format!("{}.{}", header_b64, payload_b64);
    let signature = signature_for(&message, secret)?;

    Ok(format!("{}.{}", message, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify a token and extract its claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken);
    }

    let header_b64 = parts[0];
    let payload_b64 = parts[1];
    let signature_b64 = parts[2];

    // Verify signature (HMAC-SHA256)
    let message = format!("{}.{}", header_b64, payload_b64);
    let expected_signature = signature_for(&message, secret)?;
    let provided_signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::InvalidToken)?;

    if expected_signature.as_slice() != provided_signature.as_slice() {
        return Err(AuthError::InvalidToken);
    }

    // Decode payload
    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AuthError::InvalidToken)?;

    let claims: JwtClaims =
        serde_json::from_slice(&payload_json).map_err(|_| AuthError::InvalidToken)?;

    if claims.exp < unix_secs() {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Extract JWT from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    InvalidFormat,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Admin access required")]
    AdminRequired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingHeader => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
        };

        (status, self.to_string()).into_response()
    }
}

/// Authenticated user extractor result
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Middleware to require a valid bearer token backed by a live user
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingHeader)?;

    let token = extract_bearer_token(auth_header).ok_or(AuthError::InvalidFormat)?;

    let claims = verify_jwt(token, &state.config.jwt_secret)?;

    // The token must still point at a real account; roles are read from
    // the store, not the token, so a demotion takes effect immediately.
    let user = state
        .users
        .get(claims.sub)
        .map_err(|_| AuthError::UnknownUser)?;

    let auth_user = AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware to require the admin role. Layered inside `require_auth`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|u| u.is_admin())
        .unwrap_or(false);

    if !is_admin {
        return Err(AuthError::AdminRequired);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn sign_then_verify_round_trips() {
        let user_id = Uuid::new_v4();
        let token = sign_jwt(user_id, "viktor", "manager", SECRET, 60).unwrap();

        let claims = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "viktor");
        assert_eq!(claims.role, "manager");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = sign_jwt(Uuid::new_v4(), "viktor", "manager", SECRET, 60).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = URL_SAFE_NO_PAD.encode(r#"{"sub":"00000000-0000-0000-0000-000000000000","username":"viktor","role":"admin","exp":99999999999,"iat":0}"#);
        let forged = parts.join(".");

        assert!(matches!(
            verify_jwt(&forged, SECRET),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_jwt(Uuid::new_v4(), "viktor", "manager", SECRET, 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Hand-sign a token that already ran out.
        let claims = JwtClaims {
            sub: Uuid::new_v4(),
            username: "viktor".to_string(),
            role: "manager".to_string(),
            exp: unix_secs().saturating_sub(60),
            iat: 0,
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let message = format!("{}.{}", header_b64, payload_b64);
        let signature = signature_for(&message, SECRET).unwrap();
        let stale = format!("{}.{}", message, URL_SAFE_NO_PAD.encode(signature));

        assert!(matches!(
            verify_jwt(&stale, SECRET),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
