use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SessionConfig;

/// Claims serialized into the session cookie. The cookie value is the only
/// place authenticated identity lives between requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session token present")]
    NoToken,

    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens and renders their cookie form.
#[derive(Clone)]
pub struct Sessions {
    cookie_name: String,
    expiry_hours: i64,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Sessions {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            expiry_hours: config.expiry_hours as i64,
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: Uuid) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, SessionError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims.user_id)
    }

    /// Resolve the session from request headers: find our cookie, then
    /// verify its token.
    pub fn from_headers(&self, headers: &HeaderMap) -> Result<Uuid, SessionError> {
        let token =
            extract_cookie(headers, &self.cookie_name).ok_or(SessionError::NoToken)?;
        self.verify(&token)
    }

    /// `Set-Cookie` value establishing the session.
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name,
            token,
            self.expiry_hours * 3600
        )
    }

    /// `Set-Cookie` value clearing the session unconditionally.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        )
    }
}

/// Pull one cookie value out of the `Cookie` request header.
fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some(name) {
            return parts.next().map(|v| v.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use axum::http::header::COOKIE;

    fn sessions() -> Sessions {
        Sessions::new(&SessionConfig {
            secret: "unit-test-secret".to_string(),
            expiry_hours: 1,
            cookie_name: "sid".to_string(),
        })
    }

    #[test]
    fn sign_verify_round_trip_preserves_user_id() {
        let sessions = sessions();
        let user_id = Uuid::new_v4();

        let token = sessions.sign(user_id).unwrap();
        assert_eq!(sessions.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let sessions = sessions();
        let mut token = sessions.sign(Uuid::new_v4()).unwrap();
        token.push('x');

        assert!(sessions.verify(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let sessions = sessions();
        let other = Sessions::new(&SessionConfig {
            secret: "different-secret".to_string(),
            expiry_hours: 1,
            cookie_name: "sid".to_string(),
        });

        let token = other.sign(Uuid::new_v4()).unwrap();
        assert!(sessions.verify(&token).is_err());
    }

    #[test]
    fn resolves_session_from_cookie_header() {
        let sessions = sessions();
        let user_id = Uuid::new_v4();
        let token = sessions.sign(user_id).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("other=1; sid={token}; theme=dark").parse().unwrap(),
        );
        assert_eq!(sessions.from_headers(&headers).unwrap(), user_id);

        let empty = HeaderMap::new();
        assert!(matches!(
            sessions.from_headers(&empty),
            Err(SessionError::NoToken)
        ));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = sessions().clear_cookie();
        assert!(cookie.starts_with("sid=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
