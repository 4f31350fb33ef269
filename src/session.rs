//! Identity and role gate.
//!
//! Authentication itself is an external service. The crate depends only on
//! who is signed in and whether that identity may write entries. Identity
//! changes are published on a single `watch` channel; views receive a
//! [`SessionContext`] explicitly instead of reading shared global state.

use std::collections::HashMap;
use std::sync::RwLock;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{Result, TrackerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// May create and modify entries
    Owner,
    /// Read-only access
    Partner,
}

impl UserRole {
    pub fn can_mutate_entries(self) -> bool {
        self == Self::Owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub role: UserRole,
}

impl User {
    pub fn new(uid: impl Into<String>, email: Option<String>, role: UserRole) -> Self {
        Self {
            uid: uid.into(),
            email,
            role,
        }
    }

    pub fn can_mutate_entries(&self) -> bool {
        self.role.can_mutate_entries()
    }
}

/// How a signed-in identity's role is decided.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RolePolicy {
    /// Use the role claim the provider holds for the account.
    #[default]
    ExplicitClaim,
    /// Legacy demo rule: owner if the email contains the given text,
    /// partner otherwise. The account's claim is ignored.
    EmailContains(String),
}

impl RolePolicy {
    pub fn resolve(&self, email: Option<&str>, claim: UserRole) -> UserRole {
        match self {
            Self::ExplicitClaim => claim,
            Self::EmailContains(needle) => match email {
                Some(email) if email.contains(needle.as_str()) => UserRole::Owner,
                _ => UserRole::Partner,
            },
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait SessionProvider: Send + Sync {
    /// Any bad credential yields `TrackerError::AuthFailure`, without saying
    /// whether the account or the password was wrong.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_out(&self) -> Result<()>;

    fn current_user(&self) -> Option<User>;

    /// The identity-change stream: `Some(user)` while signed in, `None` otherwise.
    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}

struct Account {
    uid: String,
    password: String,
    role: UserRole,
}

/// In-memory provider for testing and development
pub struct InMemorySessionProvider {
    accounts: RwLock<HashMap<String, Account>>,
    policy: RolePolicy,
    current: watch::Sender<Option<User>>,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            policy: RolePolicy::default(),
            current,
        }
    }

    pub fn with_role_policy(mut self, policy: RolePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn register(
        &self,
        uid: impl Into<String>,
        email: &str,
        password: impl Into<String>,
        role: UserRole,
    ) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| TrackerError::AuthFailure)?;
        accounts.insert(
            normalize_email(email),
            Account {
                uid: uid.into(),
                password: password.into(),
                role,
            },
        );
        Ok(())
    }
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl SessionProvider for InMemorySessionProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let key = normalize_email(email);
        let user = {
            let accounts = self
                .accounts
                .read()
                .map_err(|_| TrackerError::AuthFailure)?;
            match accounts.get(&key) {
                Some(account) if account.password == password => User::new(
                    account.uid.clone(),
                    Some(key.clone()),
                    self.policy.resolve(Some(&key), account.role),
                ),
                _ => {
                    warn!("Sign-in rejected");
                    return Err(TrackerError::AuthFailure);
                }
            }
        };

        info!("Signed in {} as {:?}", user.uid, user.role);
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(previous) = self.current.send_replace(None) {
            info!("Signed out {}", previous.uid);
        }
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }
}

/// The identity handed to each view at construction.
#[derive(Debug, Clone)]
pub struct SessionContext {
    receiver: watch::Receiver<Option<User>>,
}

impl SessionContext {
    pub fn new(receiver: watch::Receiver<Option<User>>) -> Self {
        Self { receiver }
    }

    pub fn from_provider<P: SessionProvider>(provider: &P) -> Self {
        Self::new(provider.subscribe())
    }

    /// A context pinned to one identity that never changes.
    pub fn fixed(user: Option<User>) -> Self {
        let (_, receiver) = watch::channel(user);
        Self { receiver }
    }

    pub fn current_user(&self) -> Option<User> {
        self.receiver.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    /// The role gate: only a signed-in owner may write entries.
    pub fn can_mutate_entries(&self) -> bool {
        self.receiver
            .borrow()
            .as_ref()
            .map(User::can_mutate_entries)
            .unwrap_or(false)
    }

    /// Waits for the next identity change. Returns false once the provider is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}
