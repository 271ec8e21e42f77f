//! Input normalisation shared by the server functions and the sign-up form.

/// Minimum accepted password length for local accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Longest username a profile may carry.
pub const MAX_USERNAME_LEN: usize = 32;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check a sign-up request. Returns the message to show on failure.
pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<(), String> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err("Invalid email address".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(())
}

/// Role tags are lowercase ASCII letters and underscores.
pub fn is_valid_role_tag(role: &str) -> bool {
    !role.is_empty()
        && role.len() <= 32
        && role.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Derive a username from an email address or login: lowercase alphanumerics and
/// single dashes, at most [`MAX_USERNAME_LEN`] characters. Falls back to `"hacker"`.
pub fn username_from(source: &str) -> String {
    let local = source.split('@').next().unwrap_or_default();
    let mut out = String::with_capacity(local.len());
    for c in local.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
        if out.len() >= MAX_USERNAME_LEN {
            break;
        }
    }
    let out = out.trim_end_matches('-');
    if out.is_empty() {
        "hacker".to_string()
    } else {
        out.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(" Ann@Example.com ", "password123", "Ann").is_ok());
        assert_eq!(
            validate_registration("not-an-email", "password123", "Ann"),
            Err("Invalid email address".to_string())
        );
        assert_eq!(
            validate_registration("ann@example.com", "short", "Ann"),
            Err("Password must be at least 8 characters".to_string())
        );
        assert_eq!(
            validate_registration("ann@example.com", "password123", "  "),
            Err("Name is required".to_string())
        );
    }

    #[test]
    fn test_role_tags() {
        assert!(is_valid_role_tag("admin"));
        assert!(is_valid_role_tag("event_organizer"));
        assert!(!is_valid_role_tag(""));
        assert!(!is_valid_role_tag("Admin"));
        assert!(!is_valid_role_tag("admin;drop"));
    }

    #[test]
    fn test_username_from() {
        assert_eq!(username_from("Ann.Example+hack@mail.com"), "ann-example-hack");
        assert_eq!(username_from("octocat"), "octocat");
        assert_eq!(username_from("__@x.y"), "hacker");
        assert!(username_from(&"a".repeat(100)).len() <= MAX_USERNAME_LEN);
    }
}
