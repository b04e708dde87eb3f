use std::sync::Arc;

use async_trait::async_trait;
use kitab_db::{DocumentStore, FieldValue, Fields};
use kitab_kernel::{Callable, CallableError};

use super::models::{AddBookPayload, AddBookResult, BookSubmission};

pub const BOOKS_COLLECTION: &str = "books";

/// `addBook`: validate a submission and create one document in `books`.
pub struct AddBookHandler {
    store: Arc<dyn DocumentStore>,
}

impl AddBookHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn document_fields(submission: &BookSubmission) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), submission.title.clone().into());
        fields.insert("author".to_string(), submission.author.clone().into());
        fields.insert("year".to_string(), submission.year.into());
        fields.insert("timestamp".to_string(), FieldValue::ServerTimestamp);
        fields
    }
}

#[async_trait]
impl Callable for AddBookHandler {
    const NAME: &'static str = "addBook";
    type Payload = AddBookPayload;
    type Output = AddBookResult;

    async fn call(&self, payload: AddBookPayload) -> Result<AddBookResult, CallableError> {
        let submission = BookSubmission::try_from(payload)?;

        let id = self
            .store
            .create(BOOKS_COLLECTION, Self::document_fields(&submission))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, collection = BOOKS_COLLECTION, "Error adding book");
                CallableError::internal(e.to_string())
            })?;

        tracing::info!(id = %id, title = %submission.title, "book added");
        Ok(AddBookResult::new(&submission.title, id))
    }
}
