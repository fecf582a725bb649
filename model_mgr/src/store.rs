use std::collections::BTreeMap;

use comms::ParamsBlob;

use crate::error::{ModelMgrErr, Result};

/// In-memory mapping from training step to parameter blob.
///
/// Steps are never removed, and the externally visible "latest" entry
/// is always the maximum step stored so far: an out-of-order put of an
/// older step is kept but never regresses `latest`.
#[derive(Debug, Default)]
pub struct VersionStore {
    versions: BTreeMap<u64, ParamsBlob>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `blob` under `step`. A repeated step overwrites in place.
    pub fn put(&mut self, step: u64, blob: ParamsBlob) {
        self.versions.insert(step, blob);
    }

    /// Returns the entry with the maximum step currently stored.
    ///
    /// # Errors
    /// `EmptyStore` if called before any `put`.
    pub fn latest(&self) -> Result<(u64, &ParamsBlob)> {
        self.versions
            .last_key_value()
            .map(|(step, blob)| (*step, blob))
            .ok_or(ModelMgrErr::EmptyStore)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
