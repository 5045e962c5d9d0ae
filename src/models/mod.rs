// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    split_keywords, tokenize_categories, EventKind, InteractionEvent, LongTermPreferences, MealPeriod, MealRates,
    Query, ScoreBreakdown, ShortTermRecord, UserProfile, VenueRecord,
};
pub use requests::{InteractionRequest, ProfileParams, RecommendParams, SearchPreferences, SearchRequest};
pub use responses::{ErrorResponse, HealthResponse, VenueResult};
