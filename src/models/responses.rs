use serde::{Deserialize, Serialize};

use crate::core::ranker::RankedVenue;

/// One ranked venue as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueResult {
    #[serde(rename = "venueId")]
    pub venue_id: String,
    pub name: String,
    pub stars: Option<f64>,
    #[serde(rename = "reviewCount")]
    pub review_count: Option<u64>,
    #[serde(rename = "priceLevel")]
    pub price_level: Option<u8>,
    pub score: f64,
    #[serde(rename = "baselineScore")]
    pub baseline_score: f64,
    pub explanation: Option<String>,
    #[serde(rename = "matchedCategories")]
    pub matched_categories: Vec<String>,
    #[serde(rename = "goodForMeal")]
    pub good_for_meal: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&RankedVenue<'_>> for VenueResult {
    fn from(ranked: &RankedVenue<'_>) -> Self {
        let venue = ranked.venue;
        let breakdown = &ranked.breakdown;
        Self {
            venue_id: venue.venue_id.clone(),
            name: venue.name.clone(),
            stars: venue.stars,
            review_count: venue.review_count,
            price_level: ranked.price_level,
            score: breakdown.final_score,
            baseline_score: breakdown.baseline,
            explanation: breakdown.explanation.clone(),
            matched_categories: breakdown.matched_categories.clone(),
            good_for_meal: ranked
                .attributes
                .meal_suitability()
                .flags()
                .into_iter()
                .map(str::to_string)
                .collect(),
            latitude: venue.latitude,
            longitude: venue.longitude,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "policyVersion")]
    pub policy_version: String,
    pub venues: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
