//! In-memory episode database for tests

use super::{DatabaseError, EpisodeDatabase, LookupOptions, SeriesRecord, ShowLookup};
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers every lookup with a fixed result and records the requests made.
pub(crate) struct FakeDatabase {
    lookup: ShowLookup,
    artwork: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<(u64, LookupOptions)>>,
}

impl FakeDatabase {
    pub fn new(lookup: ShowLookup) -> Self {
        Self {
            lookup,
            artwork: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn found(series: SeriesRecord) -> Self {
        Self::new(ShowLookup::Found(Box::new(series)))
    }

    pub fn not_found() -> Self {
        Self::new(ShowLookup::NotFound)
    }

    pub fn unavailable() -> Self {
        Self::new(ShowLookup::ServiceUnavailable("connection refused".to_string()))
    }

    pub fn with_artwork(mut self, location: &str, bytes: &[u8]) -> Self {
        self.artwork.insert(location.to_string(), bytes.to_vec());
        self
    }

    pub fn requests(&self) -> Vec<(u64, LookupOptions)> {
        self.requests.lock().unwrap().clone()
    }
}

impl EpisodeDatabase for FakeDatabase {
    fn lookup_show(&self, show_id: u64, options: &LookupOptions) -> ShowLookup {
        self.requests
            .lock()
            .unwrap()
            .push((show_id, options.clone()));
        self.lookup.clone()
    }

    fn fetch_artwork(&self, location: &str) -> Result<Vec<u8>, DatabaseError> {
        self.artwork
            .get(location)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(location.to_string()))
    }
}
