use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use safenest_core::{Account, CompanionSession};

pub trait SessionRepository: Send + Sync {
    async fn load_session(&self, session_id: &str) -> Result<Option<CompanionSession>>;
    async fn upsert_session(&self, session: &CompanionSession) -> Result<()>;
    async fn remove_session(&self, session_id: &str) -> Result<bool>;
}

pub trait AccountRepository: Send + Sync {
    async fn find_account(&self, name: &str) -> Result<Option<Account>>;
    async fn upsert_account(&self, account: &Account) -> Result<()>;
}

/// Transient process-memory store. Dropping the process drops every
/// account and session, which is the intended demo behavior.
#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, CompanionSession>>>,
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

impl SessionRepository for MemoryStore {
    async fn load_session(&self, session_id: &str) -> Result<Option<CompanionSession>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn upsert_session(&self, session: &CompanionSession) -> Result<()> {
        self.sessions
            .write()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn remove_session(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }
}

impl AccountRepository for MemoryStore {
    async fn find_account(&self, name: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().get(&account_key(name)).cloned())
    }

    async fn upsert_account(&self, account: &Account) -> Result<()> {
        self.accounts
            .write()
            .insert(account_key(&account.name), account.clone());
        Ok(())
    }
}

// Account names are matched case-insensitively.
fn account_key(name: &str) -> String {
    name.trim().to_lowercase()
}
