//! Persisted auth tokens
//!
//! Lets a later process pick up the session established by an earlier one,
//! the way a browser client keeps its session in local storage.

use crate::models::Session;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Tokens returned by the auth service for one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub session: Session,
}

/// Location of the persisted session, if persistence is enabled
#[derive(Debug, Clone, Default)]
pub struct SessionFile {
    path: Option<PathBuf>,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Keep tokens in memory only
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read stored tokens; a missing or unreadable file means no session
    pub fn load(&self) -> Option<StoredTokens> {
        let path = self.path.as_ref()?;
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Ignoring malformed session file");
                None
            }
        }
    }

    pub fn save(&self, tokens: &StoredTokens) {
        let Some(path) = self.path.as_ref() else {
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = ?parent, error = %e, "Failed to create session directory");
                return;
            }
        }

        let result = serde_json::to_string(tokens)
            .map_err(|e| e.to_string())
            .and_then(|json| write_private(path, &json).map_err(|e| e.to_string()));

        if let Err(e) = result {
            tracing::warn!(path = ?path, error = %e, "Failed to write session file");
        }
    }

    pub fn clear(&self) {
        let Some(path) = self.path.as_ref() else {
            return;
        };

        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove session file"),
        }
    }
}

/// Write `contents` readable by the owner only
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // The open mode only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents.as_bytes())
}
