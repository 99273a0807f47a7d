//! Authentication session state machine.
//!
//! ```text
//! Booting ─┬─ no token / check failed ──► Unauthenticated
//!          └─ check ok ─────────────────► Authenticated
//! Unauthenticated ── credentials ok ────► OtpPending
//! OtpPending ─────── code ok ───────────► Authenticated
//! Authenticated ──── logout / 401 ──────► Unauthenticated
//! ```
//!
//! [`SessionPhase`] carries the data each state needs, so "authenticated
//! without a user" and "OTP pending without an email" cannot be expressed.
//! The flat view the screens read (`is_authenticated`, `otp_required`, ...)
//! is derived from the phase.
//!
//! A `Session` is owned by the host's `AppState` and passed explicitly to
//! whatever needs it; there is no global instance.

use tracing::info;

use crate::types::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Booting,
    Unauthenticated,
    OtpPending { email: String },
    Authenticated { user: User },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    phase: SessionPhase,
    token: Option<String>,
    in_flight: bool,
    error: Option<String>,
    redirect_path: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A freshly launched app: booting, loading.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Booting,
            token: None,
            in_flight: false,
            error: None,
            redirect_path: None,
        }
    }

    // --- derived view ------------------------------------------------------

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight || self.phase == SessionPhase::Booting
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match &self.phase {
            SessionPhase::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn otp_required(&self) -> bool {
        matches!(self.phase, SessionPhase::OtpPending { .. })
    }

    pub fn otp_email(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::OtpPending { email } => Some(email),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn redirect_path(&self) -> Option<&str> {
        self.redirect_path.as_deref()
    }

    // --- bootstrap ---------------------------------------------------------

    /// No persisted token: resolve without asking the server.
    pub fn bootstrap_without_token(&mut self) {
        self.phase = SessionPhase::Unauthenticated;
        self.token = None;
        self.in_flight = false;
        info!("session bootstrapped: no stored token");
    }

    /// Result of the check-auth call. Any failure means signed out.
    pub fn finish_bootstrap(&mut self, result: Result<(User, String), String>) {
        self.in_flight = false;
        match result {
            Ok((user, token)) => {
                info!(user_id = %user.id, role = user.role.as_str(), "session restored");
                self.phase = SessionPhase::Authenticated { user };
                self.token = Some(token);
            }
            Err(reason) => {
                info!(%reason, "session check failed; signed out");
                self.phase = SessionPhase::Unauthenticated;
                self.token = None;
            }
        }
    }

    // --- login -------------------------------------------------------------

    /// Credentials (or a resend request) are on the wire.
    pub fn begin_request(&mut self) {
        self.in_flight = true;
        self.error = None;
    }

    /// Credentials accepted; a code was sent to `email`.
    pub fn login_succeeded(&mut self, email: &str) {
        self.in_flight = false;
        self.error = None;
        self.phase = SessionPhase::OtpPending {
            email: email.to_string(),
        };
        info!(%email, "otp challenge issued");
    }

    /// Registration also ends at the code entry step.
    pub fn register_succeeded(&mut self, email: &str) {
        self.login_succeeded(email);
    }

    pub fn login_failed(&mut self, message: &str) {
        self.in_flight = false;
        self.error = Some(message.to_string());
    }

    /// Code accepted, or an account exempt from OTP signed in directly.
    pub fn otp_succeeded(&mut self, user: User, token: String) {
        info!(user_id = %user.id, role = user.role.as_str(), "signed in");
        self.in_flight = false;
        self.error = None;
        self.phase = SessionPhase::Authenticated { user };
        self.token = Some(token);
    }

    /// Wrong or expired code. The phase, and with it the email, is kept.
    pub fn otp_failed(&mut self, message: &str) {
        self.in_flight = false;
        self.error = Some(message.to_string());
    }

    /// Leave the code entry step and go back to credentials.
    pub fn cancel_otp(&mut self) {
        if self.otp_required() {
            self.phase = SessionPhase::Unauthenticated;
            self.error = None;
        }
    }

    pub fn request_finished(&mut self) {
        self.in_flight = false;
    }

    // --- signed in ---------------------------------------------------------

    pub fn profile_updated(&mut self, user: User) {
        self.in_flight = false;
        if let SessionPhase::Authenticated { user: current } = &mut self.phase {
            *current = user;
        }
    }

    /// Reset everything except that the app is no longer booting.
    pub fn logout(&mut self) {
        info!("signed out");
        *self = Self {
            phase: SessionPhase::Unauthenticated,
            ..Self::new()
        };
    }

    /// A 401 anywhere means the stored credentials are gone.
    pub fn invalidate(&mut self) {
        if self.is_authenticated() {
            info!("session invalidated by server");
            self.phase = SessionPhase::Unauthenticated;
            self.token = None;
        }
    }

    // --- misc --------------------------------------------------------------

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_redirect_path(&mut self, path: &str) {
        self.redirect_path = Some(path.to_string());
    }

    pub fn take_redirect_path(&mut self) -> Option<String> {
        self.redirect_path.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u1".to_string(),
            name: "Rafi".to_string(),
            email: "rafi@mail.com".to_string(),
            phone: String::new(),
            role,
            is_active: true,
        }
    }

    #[test]
    fn new_session_is_booting_and_loading() {
        let session = Session::new();
        assert_eq!(session.phase(), &SessionPhase::Booting);
        assert!(session.is_loading());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn bootstrap_without_token_is_unauthenticated() {
        let mut session = Session::new();
        session.bootstrap_without_token();
        assert_eq!(session.phase(), &SessionPhase::Unauthenticated);
        assert!(!session.is_loading());
    }

    #[test]
    fn failed_bootstrap_fails_closed() {
        let mut session = Session::new();
        session.finish_bootstrap(Err("network".to_string()));
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert!(session.token().is_none());
    }

    #[test]
    fn login_moves_to_otp_without_authenticating() {
        let mut session = Session::new();
        session.bootstrap_without_token();
        session.begin_request();
        assert!(session.is_loading());
        session.login_succeeded("rafi@mail.com");
        assert!(session.otp_required());
        assert_eq!(session.otp_email(), Some("rafi@mail.com"));
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn otp_failure_keeps_email() {
        let mut session = Session::new();
        session.login_succeeded("rafi@mail.com");
        session.begin_request();
        session.otp_failed("Invalid OTP");
        assert_eq!(session.otp_email(), Some("rafi@mail.com"));
        assert_eq!(session.error(), Some("Invalid OTP"));
        assert!(!session.is_loading());
    }

    #[test]
    fn otp_success_authenticates_and_clears_otp_fields() {
        let mut session = Session::new();
        session.login_succeeded("rafi@mail.com");
        session.otp_succeeded(user(Role::Owner), "tok".to_string());
        assert!(session.is_authenticated());
        assert!(!session.otp_required());
        assert_eq!(session.otp_email(), None);
        assert_eq!(session.role(), Some(Role::Owner));
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn logout_resets_everything() {
        let mut session = Session::new();
        session.otp_succeeded(user(Role::Student), "tok".to_string());
        session.set_redirect_path("/mess/1");
        session.login_failed("stale");
        session.logout();
        assert_eq!(session.phase(), &SessionPhase::Unauthenticated);
        assert!(session.token().is_none());
        assert!(session.error().is_none());
        assert!(session.redirect_path().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn cancel_otp_returns_to_credentials() {
        let mut session = Session::new();
        session.login_succeeded("rafi@mail.com");
        session.cancel_otp();
        assert_eq!(session.phase(), &SessionPhase::Unauthenticated);
    }

    #[test]
    fn profile_update_only_applies_when_signed_in() {
        let mut session = Session::new();
        session.bootstrap_without_token();
        session.profile_updated(user(Role::Student));
        assert!(session.user().is_none());

        session.otp_succeeded(user(Role::Student), "tok".to_string());
        let mut renamed = user(Role::Student);
        renamed.name = "Rafiq".to_string();
        session.profile_updated(renamed);
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Rafiq"));
    }
}
