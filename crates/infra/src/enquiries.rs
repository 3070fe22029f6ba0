//! Product enquiry capture.

use std::sync::Arc;

use chrono::Utc;

use atelier_core::EnquiryId;
use atelier_parties::{Enquiry, NewEnquiry};

use crate::catalog::CatalogError;
use crate::store::{DocumentStore, UnitOfWork};

#[derive(Clone)]
pub struct EnquiryService {
    store: Arc<dyn DocumentStore>,
}

impl EnquiryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, input), fields(product_id = %input.product_id), err)]
    pub async fn submit(&self, input: NewEnquiry) -> Result<Enquiry, CatalogError> {
        let enquiry = Enquiry::submit(EnquiryId::new(), input, Utc::now())?;
        let mut uow = UnitOfWork::new();
        uow.insert(&enquiry)?;
        self.store.commit(uow).await?;
        tracing::info!(enquiry_id = %enquiry.id, "enquiry received");
        Ok(enquiry)
    }
}
