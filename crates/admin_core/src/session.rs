//! Client-side session context.
//!
//! The bearer token and the sidebar flag used to live in browser storage.
//! Here they are a plain value handed to every gateway and live-channel call,
//! persisted as JSON between runs.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(#[from] io::Error),
    #[error("session file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    sidebar_collapsed: bool,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            sidebar_collapsed: false,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Drops the credential. The sidebar preference survives a logout.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.sidebar_collapsed
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Session, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Session::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Forgets the token on disk, keeping the rest of the session.
    pub fn logout(&self, session: &mut Session) -> Result<(), SessionError> {
        session.clear_token();
        self.save(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target")
            .join("session-tests");
        fs::create_dir_all(&dir).unwrap();
        dir.join(format!("{name}-{}.json", std::process::id()))
    }

    #[test]
    fn missing_file_loads_empty_session() {
        let store = SessionStore::new(temp_path("missing"));
        let _ = fs::remove_file(store.path());
        let session = store.load().unwrap();
        assert!(!session.is_authenticated());
        assert!(!session.sidebar_collapsed());
    }

    #[test]
    fn save_then_logout_keeps_sidebar_flag() {
        let store = SessionStore::new(temp_path("logout"));
        let mut session = Session::with_token("abc");
        session.toggle_sidebar();
        store.save(&session).unwrap();

        let mut loaded = store.load().unwrap();
        assert_eq!(loaded.token(), Some("abc"));
        assert!(loaded.sidebar_collapsed());

        store.logout(&mut loaded).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.token(), None);
        assert!(reloaded.sidebar_collapsed());
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn empty_token_is_not_a_credential() {
        let session = Session::with_token("");
        assert!(!session.is_authenticated());
    }
}
