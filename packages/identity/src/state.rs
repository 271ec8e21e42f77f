//! Authentication state snapshot shared with the UI.

use crate::user::UserInfo;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Lifecycle phase derived from an [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Nothing has resolved yet.
    Uninitialized,
    Authenticated,
    Anonymous,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        match (self.loading, &self.user) {
            (true, _) => AuthPhase::Uninitialized,
            (false, Some(_)) => AuthPhase::Authenticated,
            (false, None) => AuthPhase::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == AuthPhase::Authenticated
    }

    /// Whether the resolved user carries `role`. Always false while loading.
    pub fn has_role(&self, role: &str) -> bool {
        !self.loading && self.user.as_ref().is_some_and(|u| u.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase() {
        let mut state = AuthState::default();
        assert_eq!(state.phase(), AuthPhase::Uninitialized);

        state.loading = false;
        assert_eq!(state.phase(), AuthPhase::Anonymous);

        state.user = Some(UserInfo::new("u1", ["member"]));
        assert_eq!(state.phase(), AuthPhase::Authenticated);
        assert!(state.has_role("member"));
        assert!(!state.has_role("admin"));
    }
}
