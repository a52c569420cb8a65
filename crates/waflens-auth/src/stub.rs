//! In-memory identity backend for tests and local development. Real
//! deployments wire a hosted provider behind [`IdentityProvider`]; the
//! stub keeps the session layer exercisable without one.

use crate::{IdentityProvider, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct StubIdentity {
    tokens: Mutex<HashMap<String, Session>>,
    popup_outcome: Mutex<Option<Result<Session, String>>>,
    fail_sign_out: AtomicBool,
    current: Mutex<Option<Session>>,
    observers: Mutex<Vec<mpsc::UnboundedSender<Option<Session>>>>,
}

impl StubIdentity {
    pub fn new() -> StubIdentity {
        StubIdentity::default()
    }

    /// Map a bearer token to a session for `verify_token`.
    pub fn grant_token(&self, token: &str, session: Session) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), session);
    }

    /// Outcome of the next `sign_in_with_popup` call.
    pub fn set_popup_outcome(&self, outcome: Result<Session, String>) {
        *self.popup_outcome.lock().unwrap() = Some(outcome);
    }

    /// Make the next `sign_out` call fail.
    pub fn fail_next_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }

    fn broadcast(&self, session: Option<Session>) {
        *self.current.lock().unwrap() = session.clone();
        self.observers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(session.clone()).is_ok());
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in_with_popup(&self) -> Result<Session, String> {
        let outcome = self
            .popup_outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err("no popup outcome configured".to_string()));
        if let Ok(session) = &outcome {
            self.broadcast(Some(session.clone()));
        }
        outcome
    }

    async fn sign_out(&self) -> Result<(), String> {
        if self.fail_sign_out.swap(false, Ordering::SeqCst) {
            return Err("provider unreachable".to_string());
        }
        self.broadcast(None);
        Ok(())
    }

    async fn verify_token(&self, token: &str) -> Result<Session, String> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| "invalid authentication token".to_string())
    }

    fn subscribe_auth_state(&self) -> mpsc::UnboundedReceiver<Option<Session>> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Current state is delivered immediately, matching provider SDKs.
        let _ = tx.send(self.current.lock().unwrap().clone());
        self.observers.lock().unwrap().push(tx);
        rx
    }
}
