//! Collection scans that survive individual bad records.

use crate::error::StoreError;

/// A record that could not be read during a scan.
#[derive(Debug)]
pub struct RecordFailure {
    pub name: String,
    pub error: StoreError,
}

/// Result of reading every record in a collection.
#[derive(Debug)]
pub struct Listing<T> {
    pub entries: Vec<T>,
    pub failures: Vec<RecordFailure>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> Listing<T> {
    /// Load each name with `load`; failures are logged and collected.
    pub(crate) fn collect<F>(names: Vec<String>, mut load: F) -> Self
    where
        F: FnMut(&str) -> Result<T, StoreError>,
    {
        let mut listing = Self::default();
        for name in names {
            match load(&name) {
                Ok(entry) => listing.entries.push(entry),
                Err(error) => {
                    tracing::warn!(record = %name, error = %error, "skipping unreadable record");
                    listing.failures.push(RecordFailure { name, error });
                }
            }
        }
        listing
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
