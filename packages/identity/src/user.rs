//! # Session-visible user
//!
//! [`UserInfo`] is the client-safe shape of a HackDeck account. The server builds it
//! from the `users` row plus the `user_roles` rows (see `api::models::User::to_info`)
//! and it crosses the server/client boundary through server functions, so it must stay
//! `Serialize + Deserialize + PartialEq` and free of platform types.
//!
//! Role tags are free-form lowercase strings (`"member"`, `"organizer"`, `"admin"`).
//! They are advisory on the client: every privileged server function re-reads them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role tag granting access to the admin surface.
pub const ADMIN_ROLE: &str = "admin";

/// Role tag every new account receives.
pub const MEMBER_ROLE: &str = "member";

/// Billing plan of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Team,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Team => "team",
        }
    }

    /// Parse a stored tier column. Unknown values fall back to `Free`.
    pub fn from_column(value: &str) -> Self {
        match value {
            "pro" => Self::Pro,
            "team" => Self::Team,
            _ => Self::Free,
        }
    }
}

/// Billing state of the current subscription, as mirrored from the payment provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    #[default]
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Inactive => "inactive",
        }
    }

    /// Parse a stored status column. Unknown values fall back to `Inactive`.
    pub fn from_column(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            _ => Self::Inactive,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub status: SubscriptionStatus,
}

impl UserInfo {
    /// Minimal user with only an id and the given roles. Mostly useful in tests and
    /// for in-memory providers.
    pub fn new(id: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            email: String::new(),
            name: None,
            avatar_url: None,
            provider: "local".to_string(),
            roles: roles.into_iter().map(Into::into).collect(),
            tier: SubscriptionTier::default(),
            status: SubscriptionStatus::default(),
        }
    }

    /// Get display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Whether the paid plan is currently usable.
    pub fn has_active_subscription(&self) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = UserInfo::new("u1", ["member"]);
        user.email = "ann@example.com".to_string();
        assert_eq!(user.display_name(), "ann@example.com");

        user.name = Some("Ann".to_string());
        assert_eq!(user.display_name(), "Ann");
    }

    #[test]
    fn test_roles() {
        let user = UserInfo::new("u1", ["member", "admin"]);
        assert!(user.has_role("member"));
        assert!(user.is_admin());
        assert!(!UserInfo::new("u2", ["member"]).is_admin());
    }

    #[test]
    fn test_subscription_columns() {
        assert_eq!(SubscriptionTier::from_column("pro"), SubscriptionTier::Pro);
        assert_eq!(SubscriptionTier::from_column("enterprise"), SubscriptionTier::Free);
        assert_eq!(
            SubscriptionStatus::from_column("past_due"),
            SubscriptionStatus::PastDue
        );

        let mut user = UserInfo::new("u1", ["member"]);
        assert!(!user.has_active_subscription());
        user.status = SubscriptionStatus::Trialing;
        assert!(user.has_active_subscription());
    }

    #[test]
    fn test_deserialize_without_billing_fields() {
        let user: UserInfo = serde_json::from_str(
            r#"{"id":"u1","email":"a@b.c","name":null,"avatar_url":null,"provider":"github"}"#,
        )
        .unwrap();
        assert!(user.roles.is_empty());
        assert_eq!(user.tier, SubscriptionTier::Free);
        assert_eq!(user.status, SubscriptionStatus::Inactive);
    }
}
