use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::{appresult::validation, AppError, AppResult};

/// Proof of allowlist membership. Only the directory mints these, so any
/// sender reaching the store has already been checked.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    #[serde(rename = "username")]
    name: String,
}

impl Identity {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The fixed username/password allowlist, kept outside the message schema so
/// it can be swapped for a real identity provider without touching the core.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<HashMap<String, String>>,
}

impl UserDirectory {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            users: Arc::new(pairs.into_iter().collect()),
        }
    }

    /// Reads `CHAT_USERS` as comma-separated `name:password` pairs, keeping
    /// the seeded pair as the fallback.
    pub fn from_env() -> Self {
        let raw = dotenv::var("CHAT_USERS").unwrap_or_else(|_| "Jay:1234,Bhautik:1234".to_owned());
        Self::new(raw.split(',').filter_map(|pair| {
            let (name, password) = pair.split_once(':')?;
            Some((name.trim().to_owned(), password.trim().to_owned()))
        }))
    }

    /// Allowlist check without credentials, used when a WebSocket declares
    /// its identity at upgrade time.
    pub fn resolve(&self, username: &str) -> Option<Identity> {
        self.users.contains_key(username).then(|| Identity {
            name: username.to_owned(),
        })
    }

    pub fn authenticate(&self, username: &str, password: &str) -> AppResult<Identity> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(validation("username and password are required"));
        }
        let Some(expected) = self.users.get(username) else {
            return Err(AppError::Forbidden);
        };
        if expected != password {
            return Err(AppError::Unauthorized);
        }
        Ok(Identity {
            name: username.to_owned(),
        })
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new([
            ("Jay".to_owned(), "1234".to_owned()),
            ("Bhautik".to_owned(), "1234".to_owned()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticates_the_seeded_pair() {
        let users = UserDirectory::default();
        assert_eq!(users.authenticate("Jay", "1234").unwrap().name(), "Jay");
        assert_eq!(users.authenticate("Bhautik", "1234").unwrap().name(), "Bhautik");
    }

    #[test]
    fn rejects_outsiders_and_bad_passwords() {
        let users = UserDirectory::default();
        assert!(matches!(users.authenticate("", "1234"), Err(AppError::Validation(_))));
        assert!(matches!(users.authenticate("Mallory", "1234"), Err(AppError::Forbidden)));
        assert!(matches!(users.authenticate("Jay", "wrong"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn resolve_checks_the_allowlist_only() {
        let users = UserDirectory::default();
        assert!(users.resolve("Jay").is_some());
        assert!(users.resolve("Mallory").is_none());
    }
}
