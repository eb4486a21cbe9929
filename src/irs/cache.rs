use super::aligner::AlignmentResult;
use crate::utils::Result;
use std::{collections::HashMap, sync::Mutex};

/// Store for alignment results that are expensive to recompute.
pub trait PropertiesStore: Send + Sync {
    fn fetch_or_compute(
        &self,
        key: &str,
        compute: &dyn Fn() -> Result<AlignmentResult>,
    ) -> Result<AlignmentResult>;
}

/// Caches nothing.
#[derive(Debug, Default)]
pub struct NoStore;

impl PropertiesStore for NoStore {
    fn fetch_or_compute(
        &self,
        _key: &str,
        compute: &dyn Fn() -> Result<AlignmentResult>,
    ) -> Result<AlignmentResult> {
        compute()
    }
}

/// In-process cache. Failed computations are not stored.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, AlignmentResult>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PropertiesStore for MemoryStore {
    fn fetch_or_compute(
        &self,
        key: &str,
        compute: &dyn Fn() -> Result<AlignmentResult>,
    ) -> Result<AlignmentResult> {
        {
            let values = self
                .values
                .lock()
                .map_err(|_| "Properties store lock poisoned".to_string())?;
            if let Some(value) = values.get(key) {
                log::debug!("Cached alignment result for {}", key);
                return Ok(value.clone());
            }
        }
        let value = compute()?;
        self.values
            .lock()
            .map_err(|_| "Properties store lock poisoned".to_string())?
            .insert(key.to_string(), value.clone());
        Ok(value)
    }
}

pub fn alignment_key(target_id: &str, donor_id: &str, match_length: usize) -> String {
    format!("{}|{}|{}", target_id, donor_id, match_length)
}
