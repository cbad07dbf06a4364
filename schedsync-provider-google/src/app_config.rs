//! App-level configuration for the Google target.
//!
//! User-provided OAuth credentials stored at:
//!   ~/.config/schedsync/providers/google/app_config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("schedsync")
        .join("providers")
        .join("google"))
}

pub fn path() -> Result<PathBuf> {
    Ok(base_dir()?.join("app_config.toml"))
}

pub fn load() -> Result<Credentials> {
    load_from(&path()?)
}

pub fn load_from(path: &Path) -> Result<Credentials> {
    if !path.exists() {
        anyhow::bail!(
            "Google credentials not found.\n\n\
            Create {} with:\n\n\
            client_id = \"your-client-id.apps.googleusercontent.com\"\n\
            client_secret = \"your-client-secret\"\n\n\
            See https://console.cloud.google.com/apis/credentials for setup.",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    let creds: Credentials = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;

    Ok(creds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        std::fs::write(
            &path,
            "client_id = \"abc.apps.googleusercontent.com\"\nclient_secret = \"s3cret\"\n",
        )
        .unwrap();

        let creds = load_from(&path).unwrap();

        assert_eq!(creds.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "s3cret");
    }

    #[test]
    fn test_missing_credentials_explain_setup() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_from(&dir.path().join("app_config.toml")).unwrap_err();

        assert!(err.to_string().contains("client_secret"));
    }
}
