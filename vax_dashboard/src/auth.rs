//! Username and password credentials
//!
//! Passwords are stored as unsalted SHA-256 hex digests in a JSON file.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Credential failures shown to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Hex-encoded SHA-256 digest of a password
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stored credentials for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registered users, optionally persisted to a JSON file
#[derive(Debug, Default)]
pub struct UserStore {
    path: Option<PathBuf>,
    users: BTreeMap<String, UserEntry>,
}

impl UserStore {
    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let users = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        log::debug!("Loaded {} users from {}", users.len(), path.display());

        Ok(Self {
            path: Some(path.to_path_buf()),
            users,
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Register a new user and persist the store
    pub fn sign_up(&mut self, username: &str, password: &str, confirm: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername.into());
        }
        if password != confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        if self.exists(username) {
            return Err(AuthError::UsernameTaken(username.to_string()).into());
        }

        self.users.insert(
            username.to_string(),
            UserEntry {
                password_hash: hash_password(password),
                created_at: Utc::now(),
            },
        );
        self.save()?;

        log::info!("Registered user {}", username);
        Ok(())
    }

    /// Check a username and password
    pub fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        match self.users.get(username.trim()) {
            Some(entry) if entry.password_hash == hash_password(password) => Ok(()),
            _ => {
                log::warn!("Failed login for {}", username);
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(&self.users)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
