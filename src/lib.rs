//! Venue Rank - personalized venue ranking service
//!
//! This library scores candidate venues against a user's stated intent
//! (keywords, budget, meal period), optionally blends in a persisted interest
//! profile built from past interactions, and explains when personalization
//! changed the ranking.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{RankMode, Ranker, ScoringPolicy};
pub use models::{InteractionEvent, MealPeriod, Query, ScoreBreakdown, UserProfile, VenueRecord, VenueResult};
pub use services::{ProfileStore, Recommender, VenueCatalog};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let ranker = Ranker::default();
        assert_eq!(ranker.policy().version, "v1");
    }
}
