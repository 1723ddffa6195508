use std::sync::Mutex;

use bodytrack_domain::StorageError;

use crate::{Backend, Document};

/// Keeps the document in memory only.
#[derive(Default)]
pub struct Memory {
    document: Mutex<Document>,
}

impl Memory {
    pub fn new(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }
}

impl Backend for Memory {
    fn load(&self) -> Result<Document, StorageError> {
        self.document
            .lock()
            .map(|document| document.clone())
            .map_err(|err| StorageError::Other(err.to_string().into()))
    }

    fn store(&self, document: &Document) -> Result<(), StorageError> {
        let mut stored = self
            .document
            .lock()
            .map_err(|err| StorageError::Other(err.to_string().into()))?;
        stored.clone_from(document);
        Ok(())
    }
}
