use atelier_auth::{Principal, Role};

/// Principal context for a request (verified identity + resolved roles).
///
/// Roles are never taken from the token; the auth middleware derives them
/// from the account directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal: Principal, roles: Vec<Role>) -> Self {
        Self { principal, roles }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
