//! # Route gating
//!
//! [`evaluate`] decides what a protected view shows for a given [`AuthState`]. It is the
//! UI-side check only: server functions repeat the role check against the database
//! before doing anything privileged.
//!
//! While the state is still loading the answer is always [`GuardDecision::Waiting`], so
//! an initial hydration never bounces a signed-in user to the fallback.

use crate::state::AuthState;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// What a guarded view should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show a neutral placeholder; do not navigate.
    Waiting,
    /// Replace the current history entry with this path and render nothing.
    Redirect(String),
    Render,
}

/// Requirement a protected view places on the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub role: Option<String>,
    pub fallback: String,
}

impl AccessRule {
    /// Any signed-in user. Anonymous visitors go to the login page.
    pub fn signed_in() -> Self {
        Self {
            role: None,
            fallback: LOGIN_PATH.to_string(),
        }
    }

    /// Users carrying `role`. Everyone else goes to the dashboard.
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            fallback: DASHBOARD_PATH.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

pub fn evaluate(state: &AuthState, rule: &AccessRule) -> GuardDecision {
    if state.loading {
        return GuardDecision::Waiting;
    }
    let Some(user) = &state.user else {
        return GuardDecision::Redirect(rule.fallback.clone());
    };
    match &rule.role {
        Some(role) if !user.has_role(role) => GuardDecision::Redirect(rule.fallback.clone()),
        _ => GuardDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserInfo;

    fn state(user: Option<UserInfo>, loading: bool) -> AuthState {
        AuthState { user, loading }
    }

    #[test]
    fn test_waiting_while_loading() {
        let admin = UserInfo::new("u1", ["admin"]);
        for user in [None, Some(admin)] {
            let s = state(user, true);
            assert_eq!(evaluate(&s, &AccessRule::signed_in()), GuardDecision::Waiting);
            assert_eq!(evaluate(&s, &AccessRule::role("admin")), GuardDecision::Waiting);
        }
    }

    #[test]
    fn test_anonymous_redirects() {
        let s = state(None, false);
        assert_eq!(
            evaluate(&s, &AccessRule::signed_in()),
            GuardDecision::Redirect("/login".to_string())
        );
        assert_eq!(
            evaluate(&s, &AccessRule::role("admin")),
            GuardDecision::Redirect("/dashboard".to_string())
        );
    }

    #[test]
    fn test_missing_role_redirects() {
        let s = state(Some(UserInfo::new("u1", ["member"])), false);
        assert_eq!(evaluate(&s, &AccessRule::signed_in()), GuardDecision::Render);
        assert_eq!(
            evaluate(&s, &AccessRule::role("admin")),
            GuardDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(
            evaluate(&s, &AccessRule::role("admin").with_fallback("/")),
            GuardDecision::Redirect("/".to_string())
        );
    }

    #[test]
    fn test_role_present_renders() {
        let s = state(Some(UserInfo::new("u1", ["member", "admin"])), false);
        assert_eq!(evaluate(&s, &AccessRule::role("admin")), GuardDecision::Render);
    }
}
