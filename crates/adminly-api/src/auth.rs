use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::info;

/// The auth gate the HTTP client consults on every request.
///
/// Policy (who may sign in, how tokens are minted) lives outside this crate.
/// The client only needs the current bearer token and a way to report that
/// the backend rejected it.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, or `None` when signed out.
    fn credential(&self) -> Option<SecretString>;

    /// Called exactly once per 401/403 response. The client never retries.
    fn on_unauthorized(&self);
}

/// A fixed token that never changes (scripts, service accounts).
///
/// `on_unauthorized` only logs; there is nothing to sign out of.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl From<SecretString> for StaticToken {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl CredentialProvider for StaticToken {
    fn credential(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }

    fn on_unauthorized(&self) {
        info!("static token rejected by backend");
    }
}

/// An interactive session: the token is dropped on the first rejection and
/// observers of [`signed_in`](Self::signed_in) are told to redirect.
#[derive(Debug)]
pub struct Session {
    token: watch::Sender<Option<SecretString>>,
    rejections: AtomicUsize,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        let (token, _) = watch::channel(Some(SecretString::from(token.into())));
        Self {
            token,
            rejections: AtomicUsize::new(0),
        }
    }

    /// A session with no token (every request fails with `MissingCredential`).
    pub fn signed_out() -> Self {
        let (token, _) = watch::channel(None);
        Self {
            token,
            rejections: AtomicUsize::new(0),
        }
    }

    /// Replace the token after a fresh sign-in.
    pub fn sign_in(&self, token: impl Into<String>) {
        self.token
            .send_replace(Some(SecretString::from(token.into())));
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Subscribe to sign-in state. Flips to `false` when the backend rejects
    /// the token; the view layer uses this to redirect to its login screen.
    pub fn signed_in(&self) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(self.is_signed_in());
        let mut tokens = self.token.subscribe();
        tokio::spawn(async move {
            while tokens.changed().await.is_ok() {
                let present = tokens.borrow_and_update().is_some();
                if tx.send(present).is_err() {
                    break;
                }
            }
        });
        rx
    }

    /// Number of 401/403 responses reported so far.
    pub fn rejections(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }
}

impl CredentialProvider for Session {
    fn credential(&self) -> Option<SecretString> {
        self.token.borrow().clone()
    }

    fn on_unauthorized(&self) {
        self.rejections.fetch_add(1, Ordering::SeqCst);
        if self.token.send_replace(None).is_some() {
            info!("session token rejected, signing out");
        }
    }
}
