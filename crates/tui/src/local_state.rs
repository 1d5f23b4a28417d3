use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Credentials kept between runs.
///
/// Only the tokens issued by the auth endpoints live here; accounts and notes
/// are never written to disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocalState {
    /// Bearer token attached to every accounts request.
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub username: Option<String>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    pub fn set_session(&mut self, username: &str, access: String, refresh: String) {
        self.username = Some(username.to_string());
        self.access = Some(access);
        self.refresh = Some(refresh);
    }

    pub fn clear_session(&mut self) {
        self.access = None;
        self.refresh = None;
    }

    /// The stored token, ignoring blank values left by hand edits.
    pub fn token(&self) -> Option<&str> {
        self.access.as_deref().filter(|token| !token.trim().is_empty())
    }
}
