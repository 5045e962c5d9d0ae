use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::models::{ErrorResponse, HealthResponse, InteractionRequest, ProfileParams, RecommendParams, SearchRequest};
use crate::services::{ProfileStoreError, Recommender, ServiceError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub default_user: String,
}

impl AppState {
    fn user_id(&self, requested: Option<&str>) -> String {
        requested.unwrap_or(&self.default_user).to_string()
    }
}

/// Configure all ranking and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommend", web::get().to(recommend))
        .route("/search", web::post().to(search))
        .route("/interact", web::post().to(record_interaction))
        .route("/profile", web::get().to(get_profile))
        .route("/profile/reset", web::post().to(reset_profile));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let venues = state.recommender.venue_count();
    let status = if venues > 0 { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        policy_version: state.recommender.ranker().policy().version.clone(),
        venues,
        timestamp: chrono::Utc::now(),
    })
}

/// Broad recommendation endpoint
///
/// GET /api/v1/recommend?keywords=ramen,japanese&maxPrice=2&meal=dinner&personalize=true
async fn recommend(
    state: web::Data<AppState>,
    params: web::Query<RecommendParams>,
) -> impl Responder {
    if let Err(errors) = params.validate() {
        return validation_failed(errors);
    }

    let user_id = state.user_id(params.user_id.as_deref());
    let query = params.to_query();
    tracing::info!("Recommending for user: {}, keywords: {:?}", user_id, query.keywords);

    run_blocking(&state, move |recommender| recommender.rank(&user_id, &query)).await
}

/// Keyword search endpoint
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "query": "ramen, japanese",
///   "preferences": { "maxPrice": 2, "meal": "dinner" },
///   "personalize": false
/// }
/// ```
async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let user_id = state.user_id(req.user_id.as_deref());
    tracing::info!("Searching for user: {}, query: {:?}", user_id, req.query);

    run_blocking(&state, move |recommender| {
        recommender.search(
            &user_id,
            &req.query,
            req.preferences.max_price,
            req.preferences.meal_period(),
            req.personalize,
        )
    })
    .await
}

/// Record interaction endpoint
///
/// POST /api/v1/interact
///
/// Request body:
/// ```json
/// {
///   "venueId": "string",
///   "eventType": "click|details_view|save|route_started|skip",
///   "categories": "Ramen, Japanese",
///   "priceLevel": 2
/// }
/// ```
async fn record_interaction(
    state: web::Data<AppState>,
    req: web::Json<InteractionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let user_id = state.user_id(req.user_id.as_deref());
    let event = req.to_event();

    run_blocking(&state, move |recommender| recommender.record_interaction(&user_id, &event)).await
}

/// GET /api/v1/profile?userId={userId}
async fn get_profile(
    state: web::Data<AppState>,
    params: web::Query<ProfileParams>,
) -> impl Responder {
    if let Err(errors) = params.validate() {
        return validation_failed(errors);
    }

    let user_id = state.user_id(params.user_id.as_deref());
    run_blocking(&state, move |recommender| recommender.profile(&user_id)).await
}

/// POST /api/v1/profile/reset?userId={userId}
async fn reset_profile(
    state: web::Data<AppState>,
    params: web::Query<ProfileParams>,
) -> impl Responder {
    if let Err(errors) = params.validate() {
        return validation_failed(errors);
    }

    let user_id = state.user_id(params.user_id.as_deref());
    run_blocking(&state, move |recommender| recommender.reset_profile(&user_id)).await
}

/// Run a recommender call on the blocking pool; profile persistence does
/// synchronous file I/O
async fn run_blocking<T, F>(state: &AppState, f: F) -> HttpResponse
where
    F: FnOnce(&Recommender) -> Result<T, ServiceError> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let recommender = state.recommender.clone();
    match web::block(move || f(&recommender)).await {
        Ok(Ok(body)) => HttpResponse::Ok().json(body),
        Ok(Err(e)) => service_error(e),
        Err(e) => {
            tracing::error!("Blocking task failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal error".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn service_error(err: ServiceError) -> HttpResponse {
    match &err {
        ServiceError::Profile(ProfileStoreError::InvalidUserId(_)) => {
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid user id".to_string(),
                message: err.to_string(),
                status_code: 400,
            })
        }
        ServiceError::Profile(_) => {
            tracing::error!("Profile persistence failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Profile persistence failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}
