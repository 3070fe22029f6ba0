use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::error::require_non_empty;
use atelier_core::{Document, DomainResult, EnquiryId, ProductId};

use crate::contact::normalize_email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnquiry {
    pub product_id: ProductId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// A visitor's question about a specific product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: EnquiryId,
    pub product_id: ProductId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Enquiry {
    pub fn submit(id: EnquiryId, input: NewEnquiry, created_at: DateTime<Utc>) -> DomainResult<Self> {
        require_non_empty("name", &input.name)?;
        require_non_empty("message", &input.message)?;
        let email = normalize_email(&input.email)?;
        let phone = input
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            id,
            product_id: input.product_id,
            name: input.name.trim().to_string(),
            email,
            phone,
            message: input.message.trim().to_string(),
            created_at,
        })
    }
}

impl Document for Enquiry {
    const COLLECTION: &'static str = "enquiries";

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::DomainError;

    fn input() -> NewEnquiry {
        NewEnquiry {
            product_id: ProductId::new(),
            name: "Sam".into(),
            email: "sam@example.com".into(),
            phone: Some("  ".into()),
            message: "Is this available in 44L?".into(),
        }
    }

    #[test]
    fn blank_phone_is_dropped() {
        let e = Enquiry::submit(EnquiryId::new(), input(), Utc::now()).unwrap();
        assert_eq!(e.phone, None);
    }

    #[test]
    fn message_is_required() {
        let mut i = input();
        i.message = String::new();
        assert!(matches!(
            Enquiry::submit(EnquiryId::new(), i, Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }
}
