use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::core::ranker::{RankMode, Ranker};
use crate::models::{split_keywords, InteractionEvent, MealPeriod, Query, UserProfile, VenueRecord, VenueResult};
use crate::services::catalog::VenueCatalog;
use crate::services::profile_store::{ProfileStore, ProfileStoreError, RecordOutcome};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Profile store error: {0}")]
    Profile(#[from] ProfileStoreError),
}

/// The ranking and profile operations exposed to request handlers.
///
/// Scoring reads the catalog and, when personalizing, a snapshot of the
/// user's profile; interaction recording goes through the profile store.
pub struct Recommender {
    catalog: RwLock<VenueCatalog>,
    ranker: Ranker,
    profiles: ProfileStore,
}

impl Recommender {
    pub fn new(catalog: VenueCatalog, ranker: Ranker, profiles: ProfileStore) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            ranker,
            profiles,
        }
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    pub fn venue_count(&self) -> usize {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Swap the candidate pool; the review-count normalizer follows the new pool
    pub fn replace_venues(&self, venues: Vec<VenueRecord>) {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        catalog.replace(venues);
        tracing::info!("Venue pool replaced ({} venues)", catalog.len());
    }

    /// Broad recommendation over the whole pool, top 10
    pub fn rank(&self, user_id: &str, query: &Query) -> Result<Vec<VenueResult>, ServiceError> {
        self.run(user_id, query, RankMode::Recommend)
    }

    /// Keyword search from a comma-separated query string, top 10, irrelevant
    /// venues excluded
    pub fn search(
        &self,
        user_id: &str,
        query: &str,
        max_price: Option<u8>,
        meal: Option<MealPeriod>,
        personalize: bool,
    ) -> Result<Vec<VenueResult>, ServiceError> {
        let query = Query::new(split_keywords(query))
            .with_max_price(max_price)
            .with_meal(meal)
            .personalized(personalize);
        self.run(user_id, &query, RankMode::Search)
    }

    pub fn record_interaction(
        &self,
        user_id: &str,
        event: &InteractionEvent,
    ) -> Result<RecordOutcome, ServiceError> {
        Ok(self.profiles.record_event(user_id, event)?)
    }

    pub fn profile(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
        Ok(self.profiles.load(user_id)?)
    }

    pub fn reset_profile(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
        Ok(self.profiles.reset(user_id)?)
    }

    fn run(&self, user_id: &str, query: &Query, mode: RankMode) -> Result<Vec<VenueResult>, ServiceError> {
        let profile = if query.personalize {
            Some(self.profiles.load(user_id)?)
        } else {
            None
        };

        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        let result = self.ranker.rank(
            catalog.venues(),
            query,
            profile.as_ref(),
            catalog.max_review_count(),
            mode,
        );

        tracing::info!(
            "Returning {} venues for {} (from {} candidates, keywords: {:?})",
            result.ranked.len(),
            user_id,
            result.total_candidates,
            query.keywords
        );

        Ok(result.ranked.iter().map(VenueResult::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_recommender() -> Recommender {
        let catalog = VenueCatalog::from_json_str(
            r#"[
                {"business_id": "r1", "name": "Ramen Ya", "stars": 4.0, "review_count": 200,
                 "categories": "Ramen, Japanese", "attributes": "{'RestaurantsPriceRange2': '2'}", "is_open": 1},
                {"business_id": "p1", "name": "Pie Hole", "stars": 4.5, "review_count": 800,
                 "categories": "Pizza", "attributes": "{'RestaurantsPriceRange2': '1'}", "is_open": 1}
            ]"#,
        )
        .unwrap();
        Recommender::new(catalog, Ranker::with_default_policy(), ProfileStore::in_memory())
    }

    #[test]
    fn test_rank_returns_all() {
        let service = create_recommender();
        let results = service.rank("default", &Query::from_keyword_string("ramen")).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].venue_id, "r1");
    }

    #[test]
    fn test_search_filters() {
        let service = create_recommender();
        let results = service.search("default", "ramen", None, None, false).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched_categories, vec!["Ramen"]);
    }

    #[test]
    fn test_replace_venues() {
        let service = create_recommender();
        service.replace_venues(vec![]);
        assert_eq!(service.venue_count(), 0);
        assert!(service.rank("default", &Query::default()).unwrap().is_empty());
    }

    #[test]
    fn test_profile_operations() {
        let service = create_recommender();
        let outcome = service
            .record_interaction("default", &InteractionEvent::new("r1", "save", "Ramen, Japanese"))
            .unwrap();
        assert!(matches!(outcome, RecordOutcome::Success { .. }));
        assert_eq!(service.profile("default").unwrap().short_term.len(), 1);
        assert_eq!(service.reset_profile("default").unwrap(), UserProfile::default());
    }
}
