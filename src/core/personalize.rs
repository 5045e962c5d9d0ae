//! Blend a content score with the user's interest profile.
//!
//! Two signals come from the profile: a session match over the bounded
//! short-term log and a long-term match over the cumulative preference maps.
//! When the blend lifts a venue by more than the policy margin, a sentence
//! explaining the lift is attached if a reason can be named.

use crate::core::features::clamp01;
use crate::core::policy::ScoringPolicy;
use crate::models::UserProfile;

/// The profile-facing facts about one venue
#[derive(Debug, Clone, Copy)]
pub struct VenueSignals<'a> {
    /// Lowercased category tokens
    pub categories: &'a [String],
    pub price_level: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongTermMatch {
    pub score: f64,
    /// Weighted cuisine part (`share * clamp01(sum / normalizer)`)
    pub cuisine: f64,
    /// Weighted price part
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blended {
    pub final_score: f64,
    pub session: f64,
    pub long_term: f64,
    pub explanation: Option<String>,
}

impl Blended {
    fn unchanged(baseline: f64) -> Self {
        Self {
            final_score: baseline,
            session: 0.0,
            long_term: 0.0,
            explanation: None,
        }
    }
}

/// Sum of recent event weights whose categories overlap the venue's, plus half
/// the weight again for a matching price level
pub fn session_match(profile: &UserProfile, venue: VenueSignals<'_>, policy: &ScoringPolicy) -> f64 {
    let total: f64 = profile
        .short_term
        .iter()
        .map(|event| {
            let mut contribution = 0.0;
            if event.categories.iter().any(|c| venue.categories.contains(c)) {
                contribution += event.weight;
            }
            if venue.price_level.is_some() && event.price_level == venue.price_level {
                contribution += 0.5 * event.weight;
            }
            contribution
        })
        .sum();

    clamp01(total / policy.normalizers.session)
}

pub fn long_term_match(profile: &UserProfile, venue: VenueSignals<'_>, policy: &ScoringPolicy) -> LongTermMatch {
    let norms = &policy.normalizers;

    let cuisine_sum: f64 = venue
        .categories
        .iter()
        .map(|c| profile.cuisine_weight(c))
        .sum();
    let price_sum = venue
        .price_level
        .map(|level| profile.price_weight(level))
        .unwrap_or(0.0);

    let cuisine = norms.long_term_cuisine_share * clamp01(cuisine_sum / norms.long_term_cuisine);
    let price = norms.long_term_price_share * clamp01(price_sum / norms.long_term_price);

    LongTermMatch {
        score: clamp01(cuisine + price),
        cuisine,
        price,
    }
}

/// Blend `baseline` with the profile. A profile without any history leaves
/// the baseline untouched.
pub fn blend(baseline: f64, profile: &UserProfile, venue: VenueSignals<'_>, policy: &ScoringPolicy) -> Blended {
    if profile.has_no_history() {
        return Blended::unchanged(baseline);
    }

    let session = session_match(profile, venue, policy);
    let long_term = long_term_match(profile, venue, policy);
    let weights = &policy.blend;

    let final_score = clamp01(
        weights.baseline * baseline + weights.session * session + weights.long_term * long_term.score,
    );

    let explanation = if final_score > baseline + policy.explanation_margin {
        explain(profile, venue, session, &long_term, policy)
    } else {
        None
    };

    Blended {
        final_score,
        session,
        long_term: long_term.score,
        explanation,
    }
}

fn explain(
    profile: &UserProfile,
    venue: VenueSignals<'_>,
    session: f64,
    long_term: &LongTermMatch,
    policy: &ScoringPolicy,
) -> Option<String> {
    let mut reasons = Vec::new();

    if session > policy.reason_threshold {
        if let Some(category) = recent_category(profile, venue) {
            reasons.push(format!("you recently showed interest in {}", category));
        } else if recent_price_match(profile, venue) {
            reasons.push("you recently looked at similar priced places".to_string());
        }
    }

    if long_term.score > policy.reason_threshold && long_term.cuisine > long_term.price {
        if let Some(category) = favourite_category(profile, venue) {
            reasons.push(format!("you often choose {}", category));
        }
    }

    if reasons.is_empty() {
        None
    } else {
        Some(format!("Recommended because {}.", reasons.join(" and ")))
    }
}

/// First category of the newest event that overlaps the venue
fn recent_category<'a>(profile: &'a UserProfile, venue: VenueSignals<'_>) -> Option<&'a str> {
    profile
        .short_term
        .iter()
        .flat_map(|event| event.categories.iter())
        .find(|c| venue.categories.contains(c))
        .map(String::as_str)
}

fn recent_price_match(profile: &UserProfile, venue: VenueSignals<'_>) -> bool {
    venue.price_level.is_some()
        && profile
            .short_term
            .iter()
            .any(|event| event.price_level == venue.price_level)
}

/// Venue category with the highest long-term weight; earliest tag wins ties
fn favourite_category<'a>(profile: &UserProfile, venue: VenueSignals<'a>) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for category in venue.categories {
        let Some(&weight) = profile.long_term.cuisine.get(category) else {
            continue;
        };
        if best.map_or(true, |(_, w)| weight > w) {
            best = Some((category.as_str(), weight));
        }
    }
    best.map(|(category, _)| category)
}
