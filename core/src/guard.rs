//! Role-based route guard.
//!
//! Evaluated by the host on every change of the navigation segments. At most
//! one redirect is produced per evaluation, and rules are checked in a fixed
//! order:
//!
//! 1. signed out on a protected route: remember the route, go to login;
//! 2. signed in but still inside `(auth)`: go to the remembered route, or the
//!    role's home group;
//! 3. non-admin inside `(admin)`: go to `(tabs)`;
//! 4. admin inside `(tabs)`: go to `(admin)`.
//!
//! Nothing is evaluated while the session is loading.

use crate::session::Session;
use crate::types::Role;

pub const AUTH_GROUP: &str = "(auth)";
pub const TABS_GROUP: &str = "(tabs)";
pub const ADMIN_GROUP: &str = "(admin)";

pub const LOGIN_ROUTE: &str = "/(auth)/login";
pub const TABS_ROUTE: &str = "/(tabs)";
pub const ADMIN_ROUTE: &str = "/(admin)";

/// Route fragments that require a signed-in user.
pub const PROTECTED_PREFIXES: [&str; 5] = ["(admin)", "mess/", "booking/create", "booking/", "payment"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Stay where you are.
    Allow,
    /// Replace the current route with `to`. When `remember` is set, the
    /// session stores it as the redirect path before navigating.
    Redirect {
        to: String,
        remember: Option<String>,
    },
}

impl GuardDecision {
    fn to(route: &str) -> Self {
        GuardDecision::Redirect {
            to: route.to_string(),
            remember: None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Redirect { to, .. } => Some(to),
        }
    }
}

/// `["mess", "42"]` becomes `/mess/42`.
pub fn current_path<S: AsRef<str>>(segments: &[S]) -> String {
    let joined: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
    format!("/{}", joined.join("/"))
}

pub fn is_protected(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    PROTECTED_PREFIXES.iter().any(|prefix| path.contains(prefix))
}

pub fn home_route(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_ROUTE,
        Role::Student | Role::Owner => TABS_ROUTE,
    }
}

pub struct RouteGuard;

impl RouteGuard {
    /// Pure decision for `segments` given the session. Does not mutate.
    pub fn evaluate<S: AsRef<str>>(session: &Session, segments: &[S]) -> GuardDecision {
        if session.is_loading() {
            return GuardDecision::Allow;
        }

        let first = segments.first().map(AsRef::as_ref);
        let in_auth = first == Some(AUTH_GROUP);
        let in_admin = first == Some(ADMIN_GROUP);
        let in_tabs = first == Some(TABS_GROUP);

        let role = match session.user() {
            None => {
                let path = current_path(segments);
                if !in_auth && is_protected(&path) {
                    return GuardDecision::Redirect {
                        to: LOGIN_ROUTE.to_string(),
                        remember: Some(path),
                    };
                }
                return GuardDecision::Allow;
            }
            Some(user) => user.role,
        };

        if in_auth {
            let to = session
                .redirect_path()
                .map(str::to_string)
                .unwrap_or_else(|| home_route(role).to_string());
            return GuardDecision::Redirect { to, remember: None };
        }
        if in_admin && role != Role::Admin {
            return GuardDecision::to(TABS_ROUTE);
        }
        if in_tabs && role == Role::Admin {
            return GuardDecision::to(ADMIN_ROUTE);
        }
        GuardDecision::Allow
    }

    /// Evaluate and apply the session side of the decision: store the
    /// remembered route, or consume the stored one when it was used.
    pub fn apply<S: AsRef<str>>(session: &mut Session, segments: &[S]) -> GuardDecision {
        let decision = Self::evaluate(session, segments);
        if let GuardDecision::Redirect { to, remember } = &decision {
            match remember {
                Some(path) => session.set_redirect_path(path),
                None if session.redirect_path() == Some(to.as_str()) => {
                    session.take_redirect_path();
                }
                None => {}
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::types::User;

    fn signed_out() -> Session {
        let mut session = Session::new();
        session.bootstrap_without_token();
        session
    }

    fn signed_in(role: Role) -> Session {
        let mut session = Session::new();
        session.otp_succeeded(
            User {
                id: "u1".to_string(),
                name: "Rafi".to_string(),
                email: "rafi@mail.com".to_string(),
                phone: String::new(),
                role,
                is_active: true,
            },
            "tok".to_string(),
        );
        session
    }

    #[test]
    fn unauthenticated_admin_route_redirects_to_login_and_remembers() {
        let mut session = signed_out();
        let decision = RouteGuard::apply(&mut session, &["(admin)"]);
        assert_eq!(decision.target(), Some(LOGIN_ROUTE));
        assert_eq!(session.redirect_path(), Some("/(admin)"));
    }

    #[test]
    fn admin_in_tabs_goes_to_admin() {
        let mut session = signed_in(Role::Admin);
        let decision = RouteGuard::apply(&mut session, &["(tabs)"]);
        assert_eq!(decision.target(), Some(ADMIN_ROUTE));
    }

    #[test]
    fn authenticated_in_auth_follows_redirect_path_then_clears_it() {
        let mut session = signed_in(Role::Student);
        session.set_redirect_path("/mess/42");
        let decision = RouteGuard::apply(&mut session, &["(auth)", "login"]);
        assert_eq!(decision.target(), Some("/mess/42"));
        assert_eq!(session.redirect_path(), None);
    }

    #[rstest]
    #[case(Role::Student, TABS_ROUTE)]
    #[case(Role::Owner, TABS_ROUTE)]
    #[case(Role::Admin, ADMIN_ROUTE)]
    fn authenticated_in_auth_without_redirect_goes_home(#[case] role: Role, #[case] home: &str) {
        let mut session = signed_in(role);
        assert_eq!(RouteGuard::apply(&mut session, &["(auth)", "login"]).target(), Some(home));
    }

    #[test]
    fn non_admin_in_admin_goes_to_tabs() {
        let session = signed_in(Role::Owner);
        assert_eq!(RouteGuard::evaluate(&session, &["(admin)", "users"]).target(), Some(TABS_ROUTE));
    }

    #[rstest]
    #[case(&["mess", "42"], Some("/mess/42"))]
    #[case(&["booking", "create"], Some("/booking/create"))]
    #[case(&["booking", "b1"], Some("/booking/b1"))]
    #[case(&["payment"], Some("/payment"))]
    #[case(&["(tabs)"], None)]
    #[case(&["(tabs)", "search"], None)]
    #[case(&["(auth)", "login"], None)]
    fn unauthenticated_protection(#[case] segments: &[&str], #[case] remembered: Option<&str>) {
        let session = signed_out();
        let decision = RouteGuard::evaluate(&session, segments);
        match remembered {
            Some(path) => assert_eq!(
                decision,
                GuardDecision::Redirect {
                    to: LOGIN_ROUTE.to_string(),
                    remember: Some(path.to_string()),
                }
            ),
            None => assert_eq!(decision, GuardDecision::Allow),
        }
    }

    #[test]
    fn loading_session_is_never_redirected() {
        let session = Session::new();
        assert_eq!(RouteGuard::evaluate(&session, &["(admin)"]), GuardDecision::Allow);
    }

    #[test]
    fn otp_pending_counts_as_unauthenticated() {
        let mut session = signed_out();
        session.login_succeeded("rafi@mail.com");
        assert_eq!(RouteGuard::evaluate(&session, &["mess", "1"]).target(), Some(LOGIN_ROUTE));
        assert_eq!(RouteGuard::evaluate(&session, &["(auth)", "login"]), GuardDecision::Allow);
    }

    #[test]
    fn authenticated_on_allowed_route_stays() {
        let session = signed_in(Role::Student);
        assert_eq!(RouteGuard::evaluate(&session, &["mess", "42"]), GuardDecision::Allow);
    }
}
