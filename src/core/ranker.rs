use std::cmp::Ordering;

use crate::core::{
    attributes::Attributes,
    features::{extract_features, matched_categories, QueryContext},
    personalize::{blend, VenueSignals},
    policy::{ScoringPolicy, TOP_K},
    scoring::baseline_score,
};
use crate::models::{Query, ScoreBreakdown, UserProfile, VenueRecord};

/// Which product surface a ranking call serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Broad recommendation: every candidate competes
    Recommend,
    /// Keyword search: zero-relevance candidates are dropped before truncation
    Search,
}

/// A scored venue, borrowing the record from the candidate pool
#[derive(Debug, Clone)]
pub struct RankedVenue<'a> {
    pub venue: &'a VenueRecord,
    /// Attributes parsed once while scoring
    pub attributes: Attributes,
    pub price_level: Option<u8>,
    pub breakdown: ScoreBreakdown,
}

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult<'a> {
    pub ranked: Vec<RankedVenue<'a>>,
    pub total_candidates: usize,
}

/// Ranking orchestrator
///
/// # Pipeline Stages
/// 1. Feature extraction per venue
/// 2. Baseline content score
/// 3. Optional personalization blend
/// 4. Relevance filter (search only), sort, top-K
#[derive(Debug, Clone)]
pub struct Ranker {
    policy: ScoringPolicy,
}

impl Ranker {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn with_default_policy() -> Self {
        Self {
            policy: ScoringPolicy::default(),
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score a single venue. The profile is only consulted when the query asks
    /// for personalization.
    pub fn score_venue(
        &self,
        venue: &VenueRecord,
        ctx: &QueryContext,
        profile: Option<&UserProfile>,
        max_review_count: u64,
    ) -> (ScoreBreakdown, Attributes) {
        let attributes = venue.parsed_attributes();
        let price_level = attributes.price_level();
        let features = extract_features(venue, price_level, ctx, max_review_count);
        let baseline = baseline_score(&features, &self.policy.content);

        let (final_score, explanation) = match profile {
            Some(profile) => {
                let categories = venue.category_tokens();
                let signals = VenueSignals {
                    categories: &categories,
                    price_level,
                };
                let blended = blend(baseline, profile, signals, &self.policy);
                (blended.final_score, blended.explanation)
            }
            None => (baseline, None),
        };

        let breakdown = ScoreBreakdown {
            venue_id: venue.venue_id.clone(),
            final_score,
            baseline,
            explanation,
            matched_categories: matched_categories(&ctx.keywords, &venue.categories),
        };
        (breakdown, attributes)
    }

    /// Rank a candidate pool for a query
    ///
    /// # Arguments
    /// * `venues` - The candidate pool
    /// * `query` - Keywords, budget, meal period and personalization flag
    /// * `profile` - The user's profile; ignored unless `query.personalize`
    /// * `max_review_count` - Largest review count in the pool
    /// * `mode` - Recommend or search surface
    ///
    /// # Returns
    /// At most `TOP_K` venues, best first; equal scores keep pool order
    pub fn rank<'a>(
        &self,
        venues: &'a [VenueRecord],
        query: &Query,
        profile: Option<&UserProfile>,
        max_review_count: u64,
        mode: RankMode,
    ) -> RankResult<'a> {
        let total_candidates = venues.len();
        let ctx = QueryContext::new(query);
        let profile = profile.filter(|_| query.personalize);

        let mut ranked: Vec<RankedVenue<'a>> = venues
            .iter()
            .map(|venue| {
                let (breakdown, attributes) =
                    self.score_venue(venue, &ctx, profile, max_review_count);
                RankedVenue {
                    venue,
                    price_level: attributes.price_level(),
                    attributes,
                    breakdown,
                }
            })
            .filter(|r| mode == RankMode::Recommend || is_relevant(r, &ctx))
            .collect();

        // Stable sort: ties stay in pool order
        ranked.sort_by(|a, b| {
            b.breakdown
                .final_score
                .partial_cmp(&a.breakdown.final_score)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(TOP_K);

        tracing::debug!(
            "Ranked {} of {} candidates ({:?}, personalized: {})",
            ranked.len(),
            total_candidates,
            mode,
            profile.is_some()
        );

        RankResult {
            ranked,
            total_candidates,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_policy()
    }
}

fn is_relevant(ranked: &RankedVenue<'_>, ctx: &QueryContext) -> bool {
    ranked.breakdown.final_score > 0.0
        && (ctx.keywords.is_empty() || !ranked.breakdown.matched_categories.is_empty())
}
