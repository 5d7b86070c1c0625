//! Account registration, login and quick-login memory.
//!
//! # Responsibility
//! - Manage per-username credential slots in the key-value backend.
//! - Remember the last logged-in username for the host's quick-unlock
//!   flow (the biometric prompt itself is the host's concern).
//!
//! # Invariants
//! - Registration never overwrites an existing username's credential.
//! - Logout only clears the remembered username; stored credentials and
//!   location slots survive.

use crate::kv::{KeyValueStore, KvError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LAST_ACCOUNT_KEY: &str = "last_logged_in_username";

pub type AccountResult<T> = Result<T, AccountError>;

/// Account-layer error taxonomy.
#[derive(Debug)]
pub enum AccountError {
    /// Username or password is empty or whitespace-only.
    EmptyCredentials,
    /// Registration for a username that already has a credential slot.
    UsernameTaken(String),
    /// Login with an unknown username or a non-matching password.
    InvalidCredentials,
    /// Backing store read/write failed.
    Storage(KvError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCredentials => write!(f, "username and password cannot be empty"),
            Self::UsernameTaken(username) => write!(f, "username already exists: {username}"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KvError> for AccountError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

/// Credential and identity-memory service over the key-value backend.
///
/// Secrets are stored as supplied; at-rest hardening belongs to the host
/// platform keystore implementing [`KeyValueStore`].
pub struct AccountService<'kv> {
    kv: &'kv dyn KeyValueStore,
}

impl<'kv> AccountService<'kv> {
    pub fn new(kv: &'kv dyn KeyValueStore) -> Self {
        Self { kv }
    }

    /// Creates a credential slot for a new username.
    ///
    /// Also seeds an empty location slot so a fresh login starts from a
    /// well-formed payload instead of an absent key.
    pub fn register(&self, username: &str, password: &str) -> AccountResult<()> {
        let username = normalized(username)?;
        let password = normalized(password)?;

        if self.kv.get(&credential_key(username))?.is_some() {
            warn!(
                "event=account_register module=account status=rejected username={username} error_code=username_taken"
            );
            return Err(AccountError::UsernameTaken(username.to_string()));
        }

        self.kv
            .set(&credential_key(username), password.as_bytes())?;
        self.kv
            .set(&crate::locations::store::storage_key(username), b"[]")?;
        info!("event=account_register module=account status=ok username={username}");
        Ok(())
    }

    /// Validates a username/password pair and remembers the username for
    /// the quick-login path.
    pub fn login(&self, username: &str, password: &str) -> AccountResult<()> {
        let username = normalized(username)?;
        let password = normalized(password)?;

        let stored = self
            .kv
            .get(&credential_key(username))?
            .ok_or(AccountError::InvalidCredentials)?;
        if stored != password.as_bytes() {
            warn!(
                "event=account_login module=account status=rejected username={username} error_code=bad_password"
            );
            return Err(AccountError::InvalidCredentials);
        }

        self.kv.set(LAST_ACCOUNT_KEY, username.as_bytes())?;
        info!("event=account_login module=account status=ok username={username}");
        Ok(())
    }

    /// Username remembered by the last successful login, if any.
    ///
    /// A slot holding non-UTF-8 bytes is treated as absent.
    pub fn last_account(&self) -> AccountResult<Option<String>> {
        let Some(bytes) = self.kv.get(LAST_ACCOUNT_KEY)? else {
            return Ok(None);
        };
        match String::from_utf8(bytes) {
            Ok(username) => Ok(Some(username)),
            Err(_) => {
                warn!(
                    "event=account_last module=account status=reset error_code=invalid_utf8"
                );
                Ok(None)
            }
        }
    }

    /// Forgets the remembered username. Credentials and location slots
    /// are untouched.
    pub fn logout(&self) -> AccountResult<()> {
        self.kv.remove(LAST_ACCOUNT_KEY)?;
        info!("event=account_logout module=account status=ok");
        Ok(())
    }
}

fn credential_key(username: &str) -> String {
    format!("password_{username}")
}

fn normalized(value: &str) -> AccountResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountError::EmptyCredentials);
    }
    Ok(trimmed)
}
