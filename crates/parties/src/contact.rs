use atelier_core::{DomainError, DomainResult};

/// Trim and lowercase an email address after a basic shape check.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(format!("invalid email: {raw}")));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_email("  Jo@Example.COM ").unwrap(), "jo@example.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "jo", "jo@", "@example.com", "jo@example", "jo@@example.com", "j o@x.io"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }
}
