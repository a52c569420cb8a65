//! Route guard: gates protected pages on session state.

use crate::{Navigator, Session, LOGIN_ROUTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Session state unknown; show a spinner, do not navigate.
    #[default]
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Still checking; render nothing but a spinner.
    Wait,
    /// Render the protected content (or the login page itself).
    Render,
    /// Send the visitor to the login route.
    RedirectToLogin,
}

/// State machine re-evaluated on every session or route change. There is
/// no terminal state: a signed-out session mid-visit flips it back to
/// `Unauthenticated` and redirects again.
#[derive(Debug, Default)]
pub struct RouteGuard {
    state: GuardState,
}

impl RouteGuard {
    pub fn new() -> RouteGuard {
        RouteGuard::default()
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Decide what to do for the current route. Never navigates while the
    /// session is still loading, and never redirects away from the login
    /// route itself, which would loop.
    pub fn evaluate(
        &mut self,
        loading: bool,
        session: Option<&Session>,
        route: &str,
    ) -> GuardDecision {
        if loading {
            self.state = GuardState::Checking;
            return GuardDecision::Wait;
        }
        match session {
            Some(_) => {
                self.state = GuardState::Authenticated;
                GuardDecision::Render
            }
            None => {
                self.state = GuardState::Unauthenticated;
                if route == LOGIN_ROUTE {
                    GuardDecision::Render
                } else {
                    GuardDecision::RedirectToLogin
                }
            }
        }
    }

    /// `evaluate`, with the redirect pushed through the navigator.
    pub fn apply(
        &mut self,
        loading: bool,
        session: Option<&Session>,
        route: &str,
        navigator: &dyn Navigator,
    ) -> GuardDecision {
        let decision = self.evaluate(loading, session, route);
        if decision == GuardDecision::RedirectToLogin {
            navigator.push(LOGIN_ROUTE);
        }
        decision
    }
}
