// src/auth.rs
use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use serde::{Deserialize, Serialize};

use crate::app_log;
use crate::core::config_manager::SessionConfig;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub exp: usize, // Expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

/// Identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Resolves a presented session token to a user, or `None` when it is not valid.
#[rocket::async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self, token: &str) -> Option<SessionUser>;
}

/// HS256 JWT sessions signed with a shared secret
pub struct JwtSessionProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionProvider {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let secret = config.require_secret()?;
        Ok(Self::new(secret, config.issuer.as_deref()))
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims.into())
    }
}

#[rocket::async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn current_session(&self, token: &str) -> Option<SessionUser> {
        match self.verify(token) {
            Ok(user) => {
                app_log!(info, "Session verified for user {}", user.user_id);
                Some(user)
            }
            Err(e) => {
                app_log!(warn, "Token verification failed: {}", e);
                None
            }
        }
    }
}

/// Raw session token presented with the request, if any.
///
/// Read from `Authorization: Bearer <token>`, falling back to the `session`
/// cookie. This guard never fails; verification happens in the pipeline.
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let from_header = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => Some(token.trim().to_string()),
                None => {
                    app_log!(warn, "Invalid Authorization header format");
                    None
                }
            },
            None => None,
        }
        .filter(|token| !token.is_empty());

        let token = from_header.or_else(|| {
            req.cookies()
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|token| !token.is_empty())
        });

        Outcome::Success(SessionToken(token))
    }
}
