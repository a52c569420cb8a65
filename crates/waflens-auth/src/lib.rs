pub mod guard;
mod stub;

pub use stub::StubIdentity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// The authenticated user, mirroring the identity provider's current
/// state. The provider owns the shape; this is a read-only projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    /// Provider spelling, kept verbatim on the wire.
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Programmer error: the session layer was used without a configured
    /// identity backend.
    NotConfigured,
    /// Popup sign-in failed or was cancelled; surfaced to the caller for
    /// UI handling.
    SignInFailed(String),
    /// A bearer token did not verify.
    TokenRejected(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NotConfigured => {
                write!(f, "identity backend not configured")
            }
            AuthError::SignInFailed(e) => write!(f, "sign-in failed: {}", e),
            AuthError::TokenRejected(e) => write!(f, "token rejected: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

/// Boundary to the third-party identity SDK. The provider owns popup
/// handling, token issuance, and the auth-state stream.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Open the provider's popup flow and resolve the signed-in session.
    async fn sign_in_with_popup(&self) -> Result<Session, String>;

    async fn sign_out(&self) -> Result<(), String>;

    /// Verify a bearer token and resolve the session it belongs to.
    async fn verify_token(&self, token: &str) -> Result<Session, String>;

    /// Register an auth-state observer. The provider delivers the current
    /// state immediately, then every subsequent change.
    fn subscribe_auth_state(&self) -> mpsc::UnboundedReceiver<Option<Session>>;
}

/// Where the session layer sends navigation.
pub trait Navigator: Send + Sync {
    fn push(&self, route: &str);
}

pub const DASHBOARD_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";

/// Session state shared with the identity provider's auth-state stream.
/// `loading` stays true until the provider's first delivery, whether or
/// not anyone is signed in.
pub struct SessionProvider {
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    current: Arc<Mutex<Option<Session>>>,
    loading: Arc<AtomicBool>,
    listener: tokio::task::JoinHandle<()>,
}

impl SessionProvider {
    /// Connect to the identity backend and start mirroring its auth
    /// state. Must be called within a tokio runtime.
    pub fn connect(
        identity: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> SessionProvider {
        let current = Arc::new(Mutex::new(None));
        let loading = Arc::new(AtomicBool::new(true));

        let mut rx = identity.subscribe_auth_state();
        let listener = {
            let current = Arc::clone(&current);
            let loading = Arc::clone(&loading);
            tokio::spawn(async move {
                while let Some(session) = rx.recv().await {
                    *current.lock().unwrap() = session;
                    loading.store(false, Ordering::SeqCst);
                }
            })
        };

        SessionProvider {
            identity,
            navigator,
            current,
            loading,
            listener,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.current.lock().unwrap().clone()
    }

    /// True until the identity provider's first auth-state delivery.
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Run the provider's popup sign-in. Success navigates to the
    /// dashboard root; failure or cancellation is returned to the caller.
    /// The session itself lands through the auth-state stream.
    pub async fn sign_in_with_google(&self) -> Result<Session, AuthError> {
        match self.identity.sign_in_with_popup().await {
            Ok(session) => {
                self.navigator.push(DASHBOARD_ROUTE);
                Ok(session)
            }
            Err(e) => {
                eprintln!("[waflens-auth] sign-in failed: {}", e);
                Err(AuthError::SignInFailed(e))
            }
        }
    }

    /// Sign out and navigate to the login route. Provider failures are
    /// logged and swallowed; navigation happens regardless. The cleared
    /// session lands through the auth-state stream.
    pub async fn sign_out(&self) {
        if let Err(e) = self.identity.sign_out().await {
            eprintln!("[waflens-auth] sign-out failed: {}", e);
        }
        self.navigator.push(LOGIN_ROUTE);
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
