// Integration tests for Venue Rank
//
// These drive the Recommender end to end: catalog loading, ranking,
// interaction recording and profile persistence.

use std::sync::Arc;

use venue_rank::core::policy::EventWeights;
use venue_rank::models::{InteractionEvent, MealPeriod, Query};
use venue_rank::services::{FileProfileBackend, ProfileStore, RecordOutcome, ServiceError};
use venue_rank::{Ranker, Recommender, VenueCatalog};

const VENUES_JSON: &str = r#"[
    {"business_id": "ramen-1", "name": "Menya Ramen", "stars": 4.0, "review_count": 200,
     "categories": "Ramen, Japanese", "attributes": "{'RestaurantsPriceRange2': '2'}",
     "morning_rate": 0.0, "lunch_rate": 0.6, "dinner_rate": 0.9, "is_open": 1},
    {"business_id": "pizza-1", "name": "Slice House", "stars": 4.5, "review_count": 800,
     "categories": "Pizza, Italian", "attributes": "{'RestaurantsPriceRange2': '1'}",
     "morning_rate": 0.1, "lunch_rate": 0.8, "dinner_rate": 0.5, "is_open": 1},
    {"business_id": "kbbq-1", "name": "Seoul Grill", "stars": 4.5, "review_count": 500,
     "categories": "Korean, BBQ", "attributes": "{'RestaurantsPriceRange2': '3', 'GoodForMeal': \"{'dinner': True}\"}",
     "sent_pos_mean": 0.6, "sent_neg_mean": 0.1, "dinner_rate": 0.95, "is_open": "1"},
    {"business_id": "cafe-1", "name": "Morning Cup", "stars": 3.5, "review_count": 50,
     "categories": "Coffee & Tea, Cafes", "attributes": null,
     "morning_rate": 0.9, "lunch_rate": 0.3, "dinner_rate": 0.0, "is_open": 0}
]"#;

fn create_recommender(store: ProfileStore) -> Recommender {
    let catalog = VenueCatalog::from_json_str(VENUES_JSON).unwrap();
    Recommender::new(catalog, Ranker::with_default_policy(), store)
}

fn save_ramen(service: &Recommender, user_id: &str, times: usize) {
    for i in 0..times {
        let event = InteractionEvent::new(format!("ramen-{}", i), "save", "Ramen, Japanese")
            .with_price_level(Some(2));
        let outcome = service.record_interaction(user_id, &event).unwrap();
        assert!(matches!(outcome, RecordOutcome::Success { .. }));
    }
}

#[test]
fn test_recommend_returns_whole_small_pool() {
    let service = create_recommender(ProfileStore::in_memory());
    let results = service.rank("u1", &Query::default()).unwrap();

    assert_eq!(results.len(), 4);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for result in &results {
        assert!((0.0..=1.0).contains(&result.score));
        assert_eq!(result.score, result.baseline_score);
        assert!(result.explanation.is_none());
    }
}

#[test]
fn test_keyword_search_excludes_unmatched_venues() {
    let service = create_recommender(ProfileStore::in_memory());
    let results = service
        .search("u1", "korean, bbq", Some(3), Some(MealPeriod::Dinner), false)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].venue_id, "kbbq-1");
    assert_eq!(results[0].matched_categories, vec!["Korean", "BBQ"]);
    assert_eq!(results[0].price_level, Some(3));
    assert!(results[0].good_for_meal.contains(&"dinner".to_string()));
}

#[test]
fn test_keyword_recommend_keeps_unmatched_venues() {
    let service = create_recommender(ProfileStore::in_memory());
    let results = service.rank("u1", &Query::from_keyword_string("ramen")).unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].venue_id, "ramen-1");
}

#[test]
fn test_saved_ramen_lifts_ramen_with_explanation() {
    let service = create_recommender(ProfileStore::in_memory());
    save_ramen(&service, "u1", 3);

    let query = Query::default().personalized(true);
    let results = service.rank("u1", &query).unwrap();

    let ramen = results.iter().find(|r| r.venue_id == "ramen-1").unwrap();
    assert!(ramen.score > ramen.baseline_score);
    let explanation = ramen.explanation.as_deref().unwrap();
    assert!(explanation.starts_with("Recommended because "));
    assert!(explanation.contains("you recently showed interest in ramen"));
    assert!(explanation.ends_with('.'));

    // Same user without personalization sees plain content scores
    let plain = service.rank("u1", &Query::default()).unwrap();
    let ramen = plain.iter().find(|r| r.venue_id == "ramen-1").unwrap();
    assert_eq!(ramen.score, ramen.baseline_score);
    assert!(ramen.explanation.is_none());
}

#[test]
fn test_personalization_without_history_matches_baseline() {
    let service = create_recommender(ProfileStore::in_memory());
    let personalized = service.rank("fresh", &Query::default().personalized(true)).unwrap();
    let plain = service.rank("fresh", &Query::default()).unwrap();

    assert_eq!(personalized.len(), plain.len());
    for (a, b) in personalized.iter().zip(plain.iter()) {
        assert_eq!(a.venue_id, b.venue_id);
        assert_eq!(a.score, b.score);
        assert!(a.explanation.is_none());
    }
}

#[test]
fn test_profiles_are_per_user() {
    let service = create_recommender(ProfileStore::in_memory());
    save_ramen(&service, "alice", 2);

    assert_eq!(service.profile("alice").unwrap().short_term.len(), 2);
    assert!(service.profile("bob").unwrap().has_no_history());
}

#[test]
fn test_reset_clears_personalization() {
    let service = create_recommender(ProfileStore::in_memory());
    save_ramen(&service, "u1", 3);

    let reset = service.reset_profile("u1").unwrap();
    assert!(reset.has_no_history());

    let results = service.rank("u1", &Query::default().personalized(true)).unwrap();
    assert!(results.iter().all(|r| r.score == r.baseline_score));
}

#[test]
fn test_unknown_event_is_ignored() {
    let service = create_recommender(ProfileStore::in_memory());
    let outcome = service
        .record_interaction("u1", &InteractionEvent::new("ramen-1", "purchase", "Ramen"))
        .unwrap();

    assert!(matches!(outcome, RecordOutcome::Ignored { .. }));
    assert!(service.profile("u1").unwrap().has_no_history());
}

#[test]
fn test_invalid_user_id_rejected() {
    let service = create_recommender(ProfileStore::in_memory());
    let result = service.profile("../etc/passwd");
    assert!(matches!(result, Err(ServiceError::Profile(_))));
}

#[test]
fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = ProfileStore::new(Arc::new(FileProfileBackend::new(dir.path())), EventWeights::default());
        let service = create_recommender(store);
        save_ramen(&service, "u1", 3);
    }

    let store = ProfileStore::new(Arc::new(FileProfileBackend::new(dir.path())), EventWeights::default());
    let service = create_recommender(store);
    let profile = service.profile("u1").unwrap();

    assert_eq!(profile.short_term.len(), 3);
    assert_eq!(profile.cuisine_weight("ramen"), 15.0);
    assert_eq!(profile.price_weight(2), 15.0);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("u1.json")).unwrap()).unwrap();
    assert!(raw["long_term"]["cuisine"].is_object());
    assert!(raw["long_term"]["price_level"].is_object());
    assert!(raw["short_term"].is_array());
}

#[test]
fn test_replacing_pool_changes_candidates() {
    let service = create_recommender(ProfileStore::in_memory());
    assert_eq!(service.venue_count(), 4);

    let catalog = VenueCatalog::from_json_str(
        r#"[{"business_id": "only", "name": "Only One", "categories": "Tacos", "review_count": 10}]"#,
    )
    .unwrap();
    service.replace_venues(catalog.venues().to_vec());

    let results = service.rank("u1", &Query::default()).unwrap();
    assert_eq!(service.venue_count(), 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].venue_id, "only");
}
