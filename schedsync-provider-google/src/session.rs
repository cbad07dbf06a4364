//! Creates a valid Google session (access token) that we can use to call the gcal API

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::app_config::{self, base_dir};

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct Session {
    account_email: String,
    data: SessionData,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);

        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at,
        }
    }
}

impl SessionData {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

impl Session {
    pub fn path_for_account_email(account_email: &str) -> Result<PathBuf> {
        let email_slug = account_email.replace(['/', '\\', ':'], "_");

        Ok(base_dir()?
            .join("session")
            .join(format!("{}.toml", email_slug)))
    }

    fn path(&self) -> Result<PathBuf> {
        Self::path_for_account_email(&self.account_email)
    }

    pub fn new(account_email: &str, data: SessionData) -> Self {
        Session {
            account_email: account_email.to_string(),
            data,
        }
    }

    pub fn client(&self) -> Result<Client> {
        let creds = app_config::load()?;

        Ok(Client::new(
            creds.client_id,
            creds.client_secret,
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        ))
    }

    // Load a session and refresh it if expired:
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let mut session = Self::load(account_email)?;

        if session.data.is_expired(Utc::now()) {
            session.refresh().await?;
        }

        Ok(session)
    }

    fn load(account_email: &str) -> Result<Self> {
        let path = Self::path_for_account_email(account_email)?;

        if !path.exists() {
            anyhow::bail!(
                "Google OAuth session for {} not found. Run `schedsync auth` first.",
                account_email
            );
        }

        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read Google OAuth session from {}",
                path.display()
            )
        })?;

        let data: SessionData = toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse Google OAuth session from {}",
                path.display()
            )
        })?;

        Ok(Session::new(account_email, data))
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = self.path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Set to owner-only (0600) since file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        tracing::debug!(account = %self.account_email, "refreshing Google access token");

        let mut tokens = self
            .client()?
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        // Google typically doesn't return a new refresh_token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(expires_at: DateTime<Utc>) -> SessionData {
        SessionData {
            access_token: "ya29.token".to_string(),
            refresh_token: "1//refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry_has_margin() {
        let now = Utc::now();

        assert!(data(now - Duration::seconds(1)).is_expired(now));
        assert!(data(now + Duration::seconds(30)).is_expired(now));
        assert!(!data(now + Duration::minutes(10)).is_expired(now));
    }

    #[test]
    fn test_account_slug_is_path_safe() {
        let path = Session::path_for_account_email("me/you:x@example.com").unwrap();

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("me_you_x@example.com.toml")
        );
    }
}
