use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Which print station the operator works at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    Certificate,
    Barcode,
}

impl OperatorRole {
    pub fn parse(role: &str) -> Option<Self> {
        if role.eq_ignore_ascii_case("certificate") {
            Some(OperatorRole::Certificate)
        } else if role.eq_ignore_ascii_case("barcode") {
            Some(OperatorRole::Barcode)
        } else {
            None
        }
    }
}

/// Authenticated operator, available to handlers as `Extension<Session>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub role: OperatorRole,
}

#[derive(Clone)]
pub struct SessionKeys {
    decoding: Arc<DecodingKey>,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

fn unauthorized(code: &str) -> Response {
    Error::Unauthorized(code.to_string()).into_response()
}

fn forbidden() -> Response {
    Error::Forbidden("forbidden".to_string()).into_response()
}

pub async fn require_session(
    State(keys): State<SessionKeys>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("unsupported_scheme");
    };
    let Some(claims) = keys.verify(token) else {
        return unauthorized("invalid_token");
    };
    let Some(role) = claims.role.as_deref().and_then(OperatorRole::parse) else {
        tracing::warn!(sub = %claims.sub, role = ?claims.role, "Token carries no operator role");
        return forbidden();
    };

    req.extensions_mut().insert(Session {
        email: claims.sub,
        role,
    });
    next.run(req).await
}

/// Lets only certificate operators through. Must run after `require_session`.
pub async fn require_certificate_role(req: Request, next: Next) -> Response {
    match req.extensions().get::<Session>() {
        Some(session) if session.role == OperatorRole::Certificate => next.run(req).await,
        Some(_) => forbidden(),
        None => unauthorized("missing_authorization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &[u8], role: Option<&str>, exp: usize) -> String {
        let claims = Claims {
            sub: "desk@example.com".into(),
            exp,
            role: role.map(Into::into),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(OperatorRole::parse("Barcode"), Some(OperatorRole::Barcode));
        assert_eq!(OperatorRole::parse("CERTIFICATE"), Some(OperatorRole::Certificate));
        assert_eq!(OperatorRole::parse("admin"), None);
    }

    #[test]
    fn verify_checks_signature_and_expiry() {
        let keys = SessionKeys::from_secret(b"secret");
        assert!(keys
            .verify(&token(b"secret", Some("barcode"), far_future()))
            .is_some());
        assert!(keys
            .verify(&token(b"other", Some("barcode"), far_future()))
            .is_none());
        assert!(keys.verify(&token(b"secret", Some("barcode"), 1)).is_none());
    }
}
