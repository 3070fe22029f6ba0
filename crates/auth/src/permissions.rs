use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "orders.manage"). The wildcard `"*"`
/// grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const ORDERS_PLACE: Permission = Permission(Cow::Borrowed("orders.place"));
    pub const ORDERS_MANAGE: Permission = Permission(Cow::Borrowed("orders.manage"));
    pub const CATALOG_MANAGE: Permission = Permission(Cow::Borrowed("catalog.manage"));
    pub const ACCOUNTS_REGISTER: Permission = Permission(Cow::Borrowed("accounts.register"));
    pub const ACCOUNTS_MANAGE: Permission = Permission(Cow::Borrowed("accounts.manage"));
    pub const NEWSLETTER_MANAGE: Permission = Permission(Cow::Borrowed("newsletter.manage"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
