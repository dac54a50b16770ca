// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Demo account accepted by the mock backend
const VALID_EMAIL: &str = "user@example.com";
const VALID_PASSWORD: &str = "password123";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted login gate. The feed controllers are only reachable behind
/// `is_logged_in()`.
pub struct Session {
    cache_dir: PathBuf,
    data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns whether a session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;
            self.data = Some(data);
            return Ok(true);
        }
        Ok(false)
    }

    /// Validate credentials and persist the session on success.
    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            bail!("email and password are required");
        }
        if email != VALID_EMAIL || password != VALID_PASSWORD {
            bail!("invalid credentials");
        }

        self.data = Some(SessionData {
            email: email.to_string(),
            created_at: Utc::now(),
        });
        self.save()
    }

    /// Drop the session and remove it from disk.
    pub fn logout(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.data.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.email.as_str())
    }

    fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents).context("Failed to write session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
