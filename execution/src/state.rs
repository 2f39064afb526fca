use arcade_types::arcade::SessionRecord;
use commonware_codec::{DecodeExt, Encode};
use std::{collections::HashMap, future::Future};
use tracing::warn;

/// Persistence collaborator: whole records stored under a player id.
pub trait Store {
    fn load(&self, id: &str) -> impl Future<Output = Option<Vec<u8>>>;
    fn save(&mut self, id: &str, record: Vec<u8>) -> impl Future<Output = ()>;

    /// Load and decode a record, discarding anything that does not decode.
    fn load_record(&self, id: &str) -> impl Future<Output = Option<SessionRecord>> {
        async move {
            let bytes = self.load(id).await?;
            match SessionRecord::decode(bytes.as_slice()) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id, "Stored session record is unreadable: {:?}", e);
                    None
                }
            }
        }
    }

    fn save_record(&mut self, id: &str, record: &SessionRecord) -> impl Future<Output = ()> {
        let bytes = record.encode().to_vec();
        async move { self.save(id, bytes).await }
    }
}

#[derive(Default)]
pub struct Memory {
    records: HashMap<String, Vec<u8>>,
}

impl Memory {
    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Store for Memory {
    async fn load(&self, id: &str) -> Option<Vec<u8>> {
        self.records.get(id).cloned()
    }

    async fn save(&mut self, id: &str, record: Vec<u8>) {
        self.records.insert(id.to_string(), record);
    }
}
