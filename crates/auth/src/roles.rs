use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const CUSTOMER: Role = Role(Cow::Borrowed("customer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Static role-to-permission policy.
    pub fn permissions(&self) -> Vec<Permission> {
        match self.as_str() {
            "admin" => vec![Permission::new("*")],
            "customer" => vec![Permission::ORDERS_PLACE, Permission::ACCOUNTS_REGISTER],
            _ => Vec::new(),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
