//! Seam to the external identity provider. The quiz only needs to know that a
//! session exists and which account it belongs to.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSession {
    pub account_id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("this email is already registered, please sign in")]
    AlreadyRegistered,
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("identity provider unavailable: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sign in to take the quiz")]
pub struct AccessDenied;

/// Callback invoked with the new session (or `None` after sign-out).
pub type SessionListener = Box<dyn Fn(Option<&AccountSession>) + Send + Sync>;

pub trait IdentityProvider: Send + Sync {
    fn current_session(&self) -> Option<AccountSession>;
    fn subscribe(&self, listener: SessionListener);
    fn sign_in(&self, email: &str, password: &str) -> Result<AccountSession, AuthError>;
    fn sign_up(&self, email: &str, password: &str) -> Result<AccountSession, AuthError>;
    fn sign_out(&self);
}

/// Gate in front of the quiz: passes only when a session is present.
pub fn require_session<P>(provider: &P) -> Result<AccountSession, AccessDenied>
where
    P: IdentityProvider + ?Sized,
{
    provider.current_session().ok_or(AccessDenied)
}

pub const MIN_PASSWORD_LEN: usize = 6;

type SharedListener = Arc<dyn Fn(Option<&AccountSession>) + Send + Sync>;

struct StoredAccount {
    account_id: String,
    password: String,
}

#[derive(Default)]
struct IdentityState {
    accounts: HashMap<String, StoredAccount>,
    session: Option<AccountSession>,
    listeners: Vec<SharedListener>,
}

impl IdentityState {
    /// Replaces the session and returns the listeners to notify once the
    /// lock is released.
    fn establish(&mut self, account_id: String, email: &str) -> (AccountSession, Vec<SharedListener>) {
        let session = AccountSession {
            account_id,
            email: email.to_string(),
        };
        self.session = Some(session.clone());
        (session, self.listeners.clone())
    }
}

/// Process-local provider; accounts and the session vanish with the process.
///
/// Listeners run after the internal lock is released, so they may call back
/// into the provider.
#[derive(Default, Clone)]
pub struct InMemoryIdentityProvider {
    state: Arc<Mutex<IdentityState>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut IdentityState) -> T) -> Result<T, AuthError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| AuthError::Provider("identity state poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

fn notify(listeners: &[SharedListener], session: Option<&AccountSession>) {
    for listener in listeners {
        listener(session);
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn current_session(&self) -> Option<AccountSession> {
        match self.with_state(|state| state.session.clone()) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "unable to read identity session");
                None
            }
        }
    }

    fn subscribe(&self, listener: SessionListener) {
        let listener: SharedListener = Arc::from(listener);
        if let Err(err) = self.with_state(|state| state.listeners.push(listener)) {
            warn!(error = %err, "session listener dropped");
        }
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AccountSession, AuthError> {
        let email = normalize_email(email);
        let (session, listeners) =
            self.with_state(|state| -> Result<_, AuthError> {
                let account_id = state
                    .accounts
                    .get(&email)
                    .filter(|stored| stored.password == password)
                    .map(|stored| stored.account_id.clone())
                    .ok_or(AuthError::InvalidCredentials)?;
                Ok(state.establish(account_id, &email))
            })??;
        notify(&listeners, Some(&session));
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<AccountSession, AuthError> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AuthError::InvalidCredentials);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let (session, listeners) =
            self.with_state(|state| -> Result<_, AuthError> {
                if state.accounts.contains_key(&email) {
                    return Err(AuthError::AlreadyRegistered);
                }
                let account_id = format!("acct-{:04}", state.accounts.len() + 1);
                state.accounts.insert(
                    email.clone(),
                    StoredAccount {
                        account_id: account_id.clone(),
                        password: password.to_string(),
                    },
                );
                Ok(state.establish(account_id, &email))
            })??;
        notify(&listeners, Some(&session));
        Ok(session)
    }

    fn sign_out(&self) {
        let ended = self.with_state(|state| {
            state
                .session
                .take()
                .map(|_| state.listeners.clone())
        });
        match ended {
            Ok(Some(listeners)) => notify(&listeners, None),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "sign-out could not clear the session"),
        }
    }
}
