use std::collections::HashMap;
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::ApiError;
use crate::models::Role;

use super::AppState;

const TOKEN_LEN: usize = 48;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>()).map_err(|e| ApiError::Internal(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: String,
    role: Role,
    expires_at: DateTime<Utc>,
}

/// Bearer tokens handed out by `POST /users/login`.
#[derive(Debug)]
pub struct Sessions {
    ttl: Duration,
    entries: HashMap<String, SessionEntry>,
}

impl Sessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn issue(&mut self, user_id: &str, role: Role, now: DateTime<Utc>) -> String {
        self.entries.retain(|_, entry| entry.expires_at > now);

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.entries.insert(
            token.clone(),
            SessionEntry {
                user_id: user_id.to_string(),
                role,
                expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
        token
    }

    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Option<Caller> {
        self.entries
            .get(token)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| Caller {
                user_id: entry.user_id.clone(),
                role: entry.role,
            })
    }

    /// Drops every session of a user, e.g. after the account is deleted.
    pub fn revoke_user(&mut self, user_id: &str) {
        self.entries.retain(|_, entry| entry.user_id != user_id);
    }
}

/// The authenticated user behind a request's bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<Caller, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state missing".to_string()))?;
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    let sessions = state.sessions.lock().unwrap();
    sessions.resolve(token, Utc::now()).ok_or(ApiError::Unauthorized)
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
