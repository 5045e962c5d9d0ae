// HTTP surface tests for Venue Rank

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use venue_rank::routes::{self, AppState};
use venue_rank::services::{ProfileStore, Recommender, VenueCatalog};
use venue_rank::Ranker;

fn build_state() -> AppState {
    let catalog = VenueCatalog::from_json_str(
        r#"[
            {"business_id": "ramen-1", "name": "Menya Ramen", "stars": 4.0, "review_count": 200,
             "categories": "Ramen, Japanese", "attributes": "{'RestaurantsPriceRange2': '2'}", "is_open": 1},
            {"business_id": "pizza-1", "name": "Slice House", "stars": 4.5, "review_count": 800,
             "categories": "Pizza, Italian", "attributes": "{'RestaurantsPriceRange2': '1'}", "is_open": 1}
        ]"#,
    )
    .unwrap();

    AppState {
        recommender: Arc::new(Recommender::new(
            catalog,
            Ranker::with_default_policy(),
            ProfileStore::in_memory(),
        )),
        default_user: "default".to_string(),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_pool_size() {
    let app = init_app!(build_state());

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["venues"], 2);
    assert_eq!(body["policyVersion"], "v1");
}

#[actix_web::test]
async fn test_recommend_ranks_keyword_match_first() {
    let app = init_app!(build_state());

    let req = test::TestRequest::get()
        .uri("/api/v1/recommend?keywords=ramen&maxPrice=2&meal=dinner")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["venueId"], "ramen-1");
    assert_eq!(results[0]["matchedCategories"], json!(["Ramen"]));
}

#[actix_web::test]
async fn test_recommend_rejects_out_of_range_price() {
    let app = init_app!(build_state());

    let req = test::TestRequest::get()
        .uri("/api/v1/recommend?maxPrice=9")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_meal_name_is_bad_request() {
    let app = init_app!(build_state());

    let req = test::TestRequest::get()
        .uri("/api/v1/recommend?meal=brunch")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({ "query": "ramen", "preferences": { "meal": "breakfast" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_search_filters_irrelevant() {
    let app = init_app!(build_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({ "query": "pizza", "preferences": { "maxPrice": 2 } }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["venueId"], "pizza-1");
}

#[actix_web::test]
async fn test_interact_then_personalized_recommend() {
    let app = init_app!(build_state());

    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/interact")
            .set_json(json!({
                "userId": "alice",
                "venueId": "ramen-1",
                "eventType": "save",
                "categories": "Ramen, Japanese",
                "priceLevel": 2
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "success");
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/recommend?userId=alice&personalize=true")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ramen = body
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["venueId"] == "ramen-1")
        .unwrap();
    let explanation = ramen["explanation"].as_str().unwrap();
    assert!(explanation.contains("ramen"));
}

#[actix_web::test]
async fn test_unknown_event_type_is_ignored() {
    let app = init_app!(build_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/interact")
        .set_json(json!({ "venueId": "ramen-1", "eventType": "share" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ignored");
}

#[actix_web::test]
async fn test_profile_reset_round_trip() {
    let app = init_app!(build_state());

    let req = test::TestRequest::post()
        .uri("/api/v1/interact")
        .set_json(json!({ "venueId": "pizza-1", "eventType": "click", "categories": "Pizza" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/v1/profile").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["long_term"]["cuisine"]["pizza"], 1.0);
    assert_eq!(body["short_term"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::post().uri("/api/v1/profile/reset").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "long_term": { "cuisine": {}, "price_level": {} }, "short_term": [] }));
}

#[actix_web::test]
async fn test_invalid_user_id_is_bad_request() {
    let app = init_app!(build_state());

    let req = test::TestRequest::get()
        .uri("/api/v1/profile?userId=bad%2Fuser")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
