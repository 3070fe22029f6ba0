use atelier_core::UserId;

/// An authenticated caller, as established from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
}
