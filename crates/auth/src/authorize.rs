use thiserror::Error;

use crate::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check that any of `roles` grants `required`.
///
/// - No IO
/// - No panics
pub fn authorize(roles: &[Role], required: &Permission) -> Result<(), AuthzError> {
    let granted = roles
        .iter()
        .flat_map(|r| r.permissions())
        .any(|p| p.is_wildcard() || p == *required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_wildcard_grants_everything() {
        assert!(authorize(&[Role::ADMIN], &Permission::ORDERS_MANAGE).is_ok());
        assert!(authorize(&[Role::ADMIN], &Permission::new("anything")).is_ok());
    }

    #[test]
    fn customers_may_place_but_not_manage() {
        assert!(authorize(&[Role::CUSTOMER], &Permission::ORDERS_PLACE).is_ok());
        assert_eq!(
            authorize(&[Role::CUSTOMER], &Permission::ORDERS_MANAGE),
            Err(AuthzError::Forbidden("orders.manage".into()))
        );
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        assert!(authorize(&[Role::new("guest")], &Permission::ORDERS_PLACE).is_err());
        assert!(authorize(&[], &Permission::ORDERS_PLACE).is_err());
    }
}
