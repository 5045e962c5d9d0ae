use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::VenueRecord;

/// Errors that can occur while loading the venue pool
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read venue file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid venue data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The loaded candidate pool.
///
/// The largest review count in the pool is recomputed whenever the pool is
/// replaced, and is the normalizer for every quality score.
#[derive(Debug, Clone, Default)]
pub struct VenueCatalog {
    venues: Vec<VenueRecord>,
    max_review_count: u64,
}

impl VenueCatalog {
    pub fn new(venues: Vec<VenueRecord>) -> Self {
        let max_review_count = max_review_count(&venues);
        Self {
            venues,
            max_review_count,
        }
    }

    /// Parse a JSON array of venue records
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let venues: Vec<VenueRecord> = serde_json::from_str(json)?;
        Ok(Self::new(venues))
    }

    /// Load a JSON array of venue records from disk
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded {} venues from {} (max review count: {})",
            catalog.len(),
            path.display(),
            catalog.max_review_count
        );
        Ok(catalog)
    }

    pub fn replace(&mut self, venues: Vec<VenueRecord>) {
        self.max_review_count = max_review_count(&venues);
        self.venues = venues;
    }

    pub fn venues(&self) -> &[VenueRecord] {
        &self.venues
    }

    pub fn max_review_count(&self) -> u64 {
        self.max_review_count
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

fn max_review_count(venues: &[VenueRecord]) -> u64 {
    venues
        .iter()
        .filter_map(|v| v.review_count)
        .max()
        .unwrap_or(0)
}
