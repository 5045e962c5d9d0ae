//! Durable per-user interest profiles.
//!
//! [`ProfileStore`] owns the read-modify-write cycle for every profile and
//! serializes it per user id. Raw persistence goes through a
//! [`ProfileBackend`]: one JSON document per user, either on disk
//! ([`FileProfileBackend`]) or in memory ([`MemoryProfileBackend`]).

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::policy::{EventWeights, SHORT_TERM_CAP};
use crate::models::{EventKind, InteractionEvent, ShortTermRecord, UserProfile};

/// Errors that can occur with profile persistence
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("Failed to read profile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write profile {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),
}

/// Raw document storage keyed by user id
pub trait ProfileBackend: Send + Sync {
    /// `Ok(None)` when nothing has been persisted for the user
    fn read(&self, user_id: &str) -> Result<Option<Vec<u8>>, ProfileStoreError>;

    fn write(&self, user_id: &str, document: &[u8]) -> Result<(), ProfileStoreError>;
}

/// One `<user_id>.json` file per user in a directory
#[derive(Debug, Clone)]
pub struct FileProfileBackend {
    dir: PathBuf,
}

impl FileProfileBackend {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }
}

impl ProfileBackend for FileProfileBackend {
    fn read(&self, user_id: &str) -> Result<Option<Vec<u8>>, ProfileStoreError> {
        let path = self.path_for(user_id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ProfileStoreError::Read { path, source }),
        }
    }

    /// Write to a sibling temp file and rename over the target, so a failed
    /// write leaves the previous document intact
    fn write(&self, user_id: &str, document: &[u8]) -> Result<(), ProfileStoreError> {
        let path = self.path_for(user_id);
        let write_err = |source| ProfileStoreError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", user_id));
        fs::write(&tmp, document).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }
}

/// Process-local backend, used when no profile directory is configured
#[derive(Debug, Default)]
pub struct MemoryProfileBackend {
    documents: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryProfileBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileBackend for MemoryProfileBackend {
    fn read(&self, user_id: &str) -> Result<Option<Vec<u8>>, ProfileStoreError> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(user_id).cloned())
    }

    fn write(&self, user_id: &str, document: &[u8]) -> Result<(), ProfileStoreError> {
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        documents.insert(user_id.to_string(), document.to_vec());
        Ok(())
    }
}

/// Outcome of recording an interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RecordOutcome {
    Success { profile: UserProfile },
    Ignored { reason: String },
}

/// Profile store with per-user serialization of load → mutate → persist
pub struct ProfileStore {
    backend: Arc<dyn ProfileBackend>,
    weights: EventWeights,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn ProfileBackend>, weights: EventWeights) -> Self {
        Self {
            backend,
            weights,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryProfileBackend::new()), EventWeights::default())
    }

    /// Current profile, or defaults when none is stored or the stored
    /// document is corrupt. Read I/O failures are returned as errors.
    pub fn load(&self, user_id: &str) -> Result<UserProfile, ProfileStoreError> {
        validate_user_id(user_id)?;
        self.with_user_lock(user_id, || self.load_unlocked(user_id))
    }

    /// Apply one interaction and persist the result before returning
    pub fn record_event(
        &self,
        user_id: &str,
        event: &InteractionEvent,
    ) -> Result<RecordOutcome, ProfileStoreError> {
        validate_user_id(user_id)?;

        let Some(kind) = EventKind::parse(&event.kind) else {
            tracing::debug!("Ignoring interaction with unknown kind {:?}", event.kind);
            return Ok(RecordOutcome::Ignored {
                reason: format!("unknown event kind: {}", event.kind),
            });
        };
        let weight = self.weights.weight(kind);
        if weight == 0.0 {
            return Ok(RecordOutcome::Ignored {
                reason: format!("event kind {} carries no weight", event.kind),
            });
        }

        let profile = self.with_user_lock(user_id, || {
            let mut profile = self.load_unlocked(user_id)?;
            profile.apply(
                ShortTermRecord {
                    event_id: Uuid::new_v4(),
                    venue_id: event.venue_id.clone(),
                    kind,
                    weight,
                    categories: event.category_tokens(),
                    price_level: event.price_level,
                    recorded_at: Utc::now(),
                },
                SHORT_TERM_CAP,
            );
            self.persist(user_id, &profile)?;
            Ok::<_, ProfileStoreError>(profile)
        })?;

        tracing::debug!(
            "Recorded {:?} on {} for {} (weight {})",
            kind,
            event.venue_id,
            user_id,
            weight
        );
        Ok(RecordOutcome::Success { profile })
    }

    /// Replace the stored profile with defaults
    pub fn reset(&self, user_id: &str) -> Result<UserProfile, ProfileStoreError> {
        validate_user_id(user_id)?;

        let profile = UserProfile::default();
        self.with_user_lock(user_id, || self.persist(user_id, &profile))?;
        tracing::info!("Reset profile for {}", user_id);
        Ok(profile)
    }

    fn load_unlocked(&self, user_id: &str) -> Result<UserProfile, ProfileStoreError> {
        let Some(bytes) = self.backend.read(user_id)? else {
            return Ok(UserProfile::default());
        };
        match serde_json::from_slice(&bytes) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!("Discarding unreadable profile for {}: {}", user_id, e);
                Ok(UserProfile::default())
            }
        }
    }

    fn persist(&self, user_id: &str, profile: &UserProfile) -> Result<(), ProfileStoreError> {
        let document = serde_json::to_vec_pretty(profile)?;
        self.backend.write(user_id, &document).map_err(|e| {
            tracing::error!("Failed to persist profile for {}: {}", user_id, e);
            e
        })
    }

    /// Run `f` while holding the user's lock. The table entry is dropped again
    /// once no other caller holds or waits on it.
    fn with_user_lock<T>(&self, user_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(user_id.to_string()).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(user_id);
        }
        result
    }

    #[cfg(test)]
    fn lock_entries(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// User ids double as file names, so only `[A-Za-z0-9_-]` is accepted
fn validate_user_id(user_id: &str) -> Result<(), ProfileStoreError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= 128
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProfileStoreError::InvalidUserId(user_id.to_string()))
    }
}
