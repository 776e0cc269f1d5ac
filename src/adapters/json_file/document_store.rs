use crate::adapters::json_codec::{decode_records, encode_records};
use crate::config::StorageLocations;
use crate::ports::document_store::{
    Collection, DocumentStore as DocumentStoreTrait, Result, StoreError,
};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;

/// JSON file implementation of DocumentStore
///
/// Each collection lives in its own file and is rewritten wholesale on save.
/// A missing file reads as an absent collection.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    locations: StorageLocations,
}

impl DocumentStore {
    pub fn new(locations: StorageLocations) -> Self {
        Self { locations }
    }
}

impl DocumentStoreTrait for DocumentStore {
    fn read_collection(&self, collection: Collection) -> Result<Option<Vec<Value>>> {
        let location = self.locations.location(collection);

        let text = match fs::read_to_string(location) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No {} file at {}", collection, location.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    location: location.to_path_buf(),
                    source,
                });
            }
        };

        decode_records(location, &text).map(Some)
    }

    fn write_collection(&self, collection: Collection, records: &[Value]) -> Result<()> {
        let location = self.locations.location(collection);
        let text = encode_records(location, records)?;

        fs::write(location, text).map_err(|source| StoreError::Io {
            location: location.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            "Wrote {} {} records to {}",
            records.len(),
            collection,
            location.display()
        );
        Ok(())
    }
}
