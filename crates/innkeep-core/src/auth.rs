//! Login gate for the admin console.
//!
//! This is a plain credential comparison plus a persisted flag, nothing more.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{config::Config, errors::Error, ports::KeyValueStore, Result};

/// Store key holding the session flag.
pub const AUTH_KEY: &str = "isAuthenticated";

pub struct SessionGate {
    store: Arc<dyn KeyValueStore>,
    username: String,
    password: String,
}

impl SessionGate {
    pub fn new(store: Arc<dyn KeyValueStore>, username: &str, password: &str) -> Self {
        Self {
            store,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, cfg: &Config) -> Self {
        Self::new(store, &cfg.admin_username, &cfg.admin_password)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        if username.trim() != self.username || password != self.password {
            warn!(username = username.trim(), "rejected admin login");
            return Err(Error::Auth("invalid username or password".to_string()));
        }
        self.store.set(AUTH_KEY, "true")?;
        info!(username = username.trim(), "admin logged in");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.remove(AUTH_KEY)?;
        info!("admin logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.store.get(AUTH_KEY), Ok(Some(v)) if v == "true")
    }

    /// Fails unless someone has logged in.
    pub fn require(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Auth(
                "not logged in (run `innkeep login` first)".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn gate() -> (Arc<MemoryStore>, SessionGate) {
        let store = Arc::new(MemoryStore::new());
        let gate = SessionGate::new(store.clone(), "admin", "admin123");
        (store, gate)
    }

    #[test]
    fn correct_credentials_open_the_gate() {
        let (store, gate) = gate();
        assert!(gate.require().is_err());
        gate.login("admin", "admin123").unwrap();
        assert!(gate.is_authenticated());
        assert_eq!(store.get(AUTH_KEY).unwrap().as_deref(), Some("true"));
        gate.require().unwrap();
    }

    #[test]
    fn wrong_credentials_are_rejected() {
        let (_, gate) = gate();
        let err = gate.login("admin", "hunter2").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn logout_clears_the_flag() {
        let (_, gate) = gate();
        gate.login("admin", "admin123").unwrap();
        gate.logout().unwrap();
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn only_the_literal_true_counts() {
        let store = Arc::new(MemoryStore::with_entry(AUTH_KEY, "yes"));
        let gate = SessionGate::new(store, "admin", "admin123");
        assert!(!gate.is_authenticated());
    }
}
