// ── Auth container ──
//
// Holds the session (user id + token), the cached profile, and the
// outcome of the auth-related operations. Transitions that touch the
// durable session return a `SessionEffect` for the store to apply.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::{Lifecycle, OpStatus, Rejection};
use crate::model::{AuthResponse, User};
use crate::session::{SessionKey, SessionStore};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_FETCH_FAILED: &str = "Failed to fetch user profile";
const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";
const PASSWORD_CHANGE_FAILED: &str = "Failed to change password";
const RESET_LINK_FAILED: &str = "Failed to send reset link";

/// Events owned by the auth container.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    Login(Lifecycle<AuthResponse>),
    Register(Lifecycle<AuthResponse>),
    /// Silent periodic re-validation of the held token.
    CheckAuthState(Lifecycle<AuthResponse>),
    FetchUserProfile(Lifecycle<User>),
    UpdateUserProfile(Lifecycle<User>),
    ChangePassword(Lifecycle<()>),
    /// Fulfilled with the server's confirmation text.
    ForgotPassword(Lifecycle<Option<String>>),
    Logout,
}

/// Durable-session write requested by a transition.
#[derive(Debug, Clone)]
pub enum SessionEffect {
    Persist {
        user_id: Option<String>,
        token: SecretString,
    },
    /// Remove both keys.
    Clear,
    /// Remove only the token; the user id stays.
    ClearToken,
}

impl SessionEffect {
    pub fn apply(&self, store: &dyn SessionStore) {
        match self {
            Self::Persist { user_id, token } => {
                if let Some(user_id) = user_id {
                    store.set(SessionKey::UserId, user_id);
                }
                store.set(SessionKey::Token, token.expose_secret());
            }
            Self::Clear => {
                store.remove(SessionKey::Token);
                store.remove(SessionKey::UserId);
            }
            Self::ClearToken => store.remove(SessionKey::Token),
        }
    }
}

/// Auth container state.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user_id: Option<String>,
    pub token: Option<SecretString>,
    pub is_authenticated: bool,
    /// Last fetched or updated profile. Survives logout until replaced.
    pub user: Option<User>,
    /// Transient success text (password-reset confirmation).
    pub message: Option<String>,
    pub status: OpStatus,
}

impl AuthState {
    /// Seed from the durable store: a stored token means authenticated.
    pub fn restore(store: &dyn SessionStore) -> Self {
        let token = store.get(SessionKey::Token).map(SecretString::from);
        Self {
            user_id: store.get(SessionKey::UserId),
            is_authenticated: token.is_some(),
            token,
            ..Self::default()
        }
    }

    /// `is_authenticated` agrees with token possession.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == self.token.is_some()
    }

    pub fn reduce(&mut self, event: AuthEvent) -> Option<SessionEffect> {
        match event {
            AuthEvent::Login(step) => self.on_login(step),
            AuthEvent::Register(step) => self.on_register(step),
            AuthEvent::CheckAuthState(step) => self.on_check(step),
            AuthEvent::FetchUserProfile(step) => {
                if let Some(user) = self.status.track(step, PROFILE_FETCH_FAILED) {
                    self.user = Some(user);
                }
                None
            }
            AuthEvent::UpdateUserProfile(step) => {
                if let Some(user) = self.status.track(step, PROFILE_UPDATE_FAILED) {
                    self.user = Some(user);
                }
                None
            }
            AuthEvent::ChangePassword(step) => {
                self.status.track(step, PASSWORD_CHANGE_FAILED);
                None
            }
            AuthEvent::ForgotPassword(step) => {
                if let Some(message) = self.status.track(step, RESET_LINK_FAILED) {
                    self.message = message;
                }
                None
            }
            AuthEvent::Logout => {
                info!("signing out");
                self.clear_session();
                Some(SessionEffect::Clear)
            }
        }
    }

    fn on_login(&mut self, step: Lifecycle<AuthResponse>) -> Option<SessionEffect> {
        match step {
            Lifecycle::Pending => {
                self.status.begin();
                self.is_authenticated = false;
                None
            }
            Lifecycle::Fulfilled(session) => {
                self.status.succeed();
                info!(user_id = ?session.user_id, "signed in");
                Some(self.adopt(session))
            }
            Lifecycle::Rejected(rejection) => {
                self.status.fail(&rejection, LOGIN_FAILED);
                self.clear_session();
                Some(SessionEffect::Clear)
            }
        }
    }

    fn on_register(&mut self, step: Lifecycle<AuthResponse>) -> Option<SessionEffect> {
        let session = self.status.track(step, REGISTRATION_FAILED)?;
        info!(user_id = ?session.user_id, "registered");
        Some(self.adopt(session))
    }

    fn on_check(&mut self, step: Lifecycle<AuthResponse>) -> Option<SessionEffect> {
        match step {
            Lifecycle::Pending => {
                self.status.loading = true;
                None
            }
            Lifecycle::Fulfilled(session) => {
                self.status.succeed();
                debug!("token re-validated");
                Some(self.adopt(session))
            }
            // Best-effort: drop the durable token, keep everything the UI shows.
            Lifecycle::Rejected(Rejection { .. }) => {
                self.status.loading = false;
                Some(SessionEffect::ClearToken)
            }
        }
    }

    fn adopt(&mut self, session: AuthResponse) -> SessionEffect {
        if session.user_id.is_some() {
            self.user_id.clone_from(&session.user_id);
        }
        self.token = Some(session.token.clone());
        self.is_authenticated = true;
        SessionEffect::Persist {
            user_id: self.user_id.clone(),
            token: session.token,
        }
    }

    fn clear_session(&mut self) {
        self.user_id = None;
        self.token = None;
        self.is_authenticated = false;
    }
}
