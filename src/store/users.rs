//! Demo account store
//!
//! Accounts keyed by lowercase email, held in memory and lost on restart.
//! Passwords are stored as salted sha256 digests. This backs the demo auth
//! routes only; there are no sessions or tokens.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::RngCore;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::errors::{AppError, AppResult};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Stored account
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: Map<String, Value>,
}

impl UserAccount {
    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            created_at: self.created_at,
            last_login: self.last_login,
            preferences: self.preferences.clone(),
        }
    }
}

/// Account as returned over the API (no credentials)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: Map<String, Value>,
}

/// In-memory account table
#[derive(Clone, Default)]
pub struct UserStore {
    accounts: Arc<DashMap<String, UserAccount>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account. 409 when the email is taken.
    pub fn register(&self, email: &str, password: &str, username: &str) -> AppResult<UserProfile> {
        let email = normalize_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::bad_request(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("username is required"));
        }

        match self.accounts.entry(email.clone()) {
            Entry::Occupied(_) => {
                warn!("⚠️ Registration rejected, email already registered");
                Err(AppError::conflict("An account with this email already exists"))
            }
            Entry::Vacant(slot) => {
                let salt = new_salt();
                let account = UserAccount {
                    id: Uuid::new_v4().to_string(),
                    email,
                    password_hash: hash_password(&salt, password),
                    salt,
                    username: username.to_string(),
                    created_at: Utc::now(),
                    last_login: None,
                    preferences: default_preferences(),
                };
                let profile = account.profile();
                slot.insert(account);
                info!("👤 Account registered: {}", profile.id);
                Ok(profile)
            }
        }
    }

    /// Check credentials and stamp `lastLogin`. 401 on any mismatch.
    pub fn login(&self, email: &str, password: &str) -> AppResult<UserProfile> {
        let mut account = self.authenticate(email, password)?;
        account.last_login = Some(Utc::now());
        info!("🔓 Login: {}", account.id);
        Ok(account.profile())
    }

    /// Merge `preferences` into the stored ones after checking credentials
    pub fn update_preferences(
        &self,
        email: &str,
        password: &str,
        preferences: Map<String, Value>,
    ) -> AppResult<UserProfile> {
        let mut account = self.authenticate(email, password)?;
        account.preferences.extend(preferences);
        Ok(account.profile())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn clear(&self) {
        self.accounts.clear();
    }

    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<dashmap::mapref::one::RefMut<'_, String, UserAccount>> {
        let invalid = || AppError::unauthorized("Invalid email or password");
        let key = email.trim().to_lowercase();
        let account = self.accounts.get_mut(&key).ok_or_else(invalid)?;
        if !account.verify(password) {
            return Err(invalid());
        }
        Ok(account)
    }
}

fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if !valid {
        return Err(AppError::bad_request("email must be a valid address"));
    }
    Ok(email)
}

fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn default_preferences() -> Map<String, Value> {
    let mut prefs = Map::new();
    prefs.insert("notifications".to_string(), Value::Bool(true));
    prefs.insert("theme".to_string(), Value::String("dark".to_string()));
    prefs
}
