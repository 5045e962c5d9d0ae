use crate::core::features::{clamp01, extract_features, FeatureVector, QueryContext};
use crate::core::policy::ContentWeights;
use crate::models::VenueRecord;

/// Calculate the content (baseline) score of a venue in `[0, 1]`
///
/// Scoring formula:
/// score = (
///     cuisine_match * 0.30 +     # Keyword hits a category tag
///     price_match * 0.20 +       # Within the user's budget
///     quality * 0.20 +           # Stars + relative popularity
///     sentiment * 0.15 +         # Net review sentiment
///     mealtime_fit * 0.10 +      # Visit rate for the meal period
///     open_flag * 0.05           # Business still operating
/// )
pub fn calculate_content_score(
    venue: &VenueRecord,
    ctx: &QueryContext,
    max_review_count: u64,
    weights: &ContentWeights,
) -> (f64, FeatureVector) {
    let features = extract_features(venue, venue.price_level(), ctx, max_review_count);
    (baseline_score(&features, weights), features)
}

/// Weighted combination of already extracted sub-scores
#[inline]
pub fn baseline_score(features: &FeatureVector, weights: &ContentWeights) -> f64 {
    clamp01(
        features.cuisine * weights.cuisine
            + features.price * weights.price
            + features.quality * weights.quality
            + features.sentiment * weights.sentiment
            + features.mealtime * weights.mealtime
            + features.open * weights.open,
    )
}
