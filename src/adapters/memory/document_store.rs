use crate::adapters::json_codec::{decode_records, encode_records};
use crate::ports::document_store::{
    Collection, DocumentStore as DocumentStoreTrait, Result, StoreError,
};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory implementation of DocumentStore
///
/// Keeps the encoded text of each collection, so tests can inspect what
/// would have been written and plant corrupt documents.
/// Can also be told to fail writes for a collection.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RefCell<HashMap<Collection, String>>,
    failing_writes: RefCell<Vec<Collection>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn location(collection: Collection) -> PathBuf {
        PathBuf::from(format!("memory://{}", collection))
    }

    /// Store raw text for a collection, bypassing encoding
    pub fn put_raw(&self, collection: Collection, text: impl Into<String>) {
        self.documents.borrow_mut().insert(collection, text.into());
    }

    /// Raw text last written for a collection
    pub fn raw(&self, collection: Collection) -> Option<String> {
        self.documents.borrow().get(&collection).cloned()
    }

    /// Make every later write to `collection` fail with an I/O error
    pub fn fail_writes_to(&self, collection: Collection) {
        self.failing_writes.borrow_mut().push(collection);
    }
}

impl DocumentStoreTrait for DocumentStore {
    fn read_collection(&self, collection: Collection) -> Result<Option<Vec<Value>>> {
        match self.documents.borrow().get(&collection) {
            Some(text) => decode_records(&Self::location(collection), text).map(Some),
            None => Ok(None),
        }
    }

    fn write_collection(&self, collection: Collection, records: &[Value]) -> Result<()> {
        let location = Self::location(collection);

        if self.failing_writes.borrow().contains(&collection) {
            return Err(StoreError::Io {
                location,
                source: std::io::Error::other("simulated write failure"),
            });
        }

        let text = encode_records(&location, records)?;
        self.documents.borrow_mut().insert(collection, text);
        Ok(())
    }
}
