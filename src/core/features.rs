use regex::Regex;

use crate::models::{tokenize_categories, MealPeriod, MealRates, Query, VenueRecord};

/// Clamp into `[0, 1]`; non-finite input maps to `0.0`
#[inline]
pub fn clamp01(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

#[inline]
fn finite_or_zero(x: Option<f64>) -> f64 {
    x.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Case-insensitive whole-word matcher compiled once per query
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    patterns: Vec<Regex>,
}

impl KeywordMatcher {
    /// Blank keywords are dropped
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let patterns = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .filter_map(|k| Regex::new(&format!(r"\b{}\b", regex::escape(&k))).ok())
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any keyword occurs in `text` as a whole word (text is lowercased first)
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.patterns.iter().any(|p| p.is_match(&lowered))
    }
}

/// Query parameters prepared for scoring many venues
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    pub keywords: KeywordMatcher,
    pub max_price: Option<u8>,
    pub meal: Option<MealPeriod>,
}

impl QueryContext {
    pub fn new(query: &Query) -> Self {
        Self {
            keywords: KeywordMatcher::new(&query.keywords),
            max_price: query.max_price,
            meal: query.meal,
        }
    }
}

/// The six normalized content sub-scores of one venue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub cuisine: f64,
    pub price: f64,
    pub quality: f64,
    pub sentiment: f64,
    pub mealtime: f64,
    pub open: f64,
}

/// `venue_price` is the level already parsed from the venue's attributes
pub fn extract_features(
    venue: &VenueRecord,
    venue_price: Option<u8>,
    ctx: &QueryContext,
    max_review_count: u64,
) -> FeatureVector {
    FeatureVector {
        cuisine: cuisine_match(&ctx.keywords, &venue.categories),
        price: price_match(ctx.max_price, venue_price),
        quality: quality_score(venue.stars, venue.review_count, max_review_count),
        sentiment: sentiment_score(venue.sentiment_positive, venue.sentiment_negative),
        mealtime: mealtime_fit(ctx.meal, &venue.meal_rates()),
        open: open_flag(&venue.is_open),
    }
}

/// 0.5 with no keywords, 1.0 if any keyword whole-word matches the tags, else 0.0
pub fn cuisine_match(keywords: &KeywordMatcher, categories: &str) -> f64 {
    if keywords.is_empty() {
        return 0.5;
    }
    let joined = tokenize_categories(categories).join(" ");
    if keywords.matches(&joined) {
        1.0
    } else {
        0.0
    }
}

/// Venue tags that match a keyword; every tag when no keywords are given
pub fn matched_categories(keywords: &KeywordMatcher, categories: &str) -> Vec<String> {
    tokenize_categories(categories)
        .into_iter()
        .filter(|tag| keywords.is_empty() || keywords.matches(tag))
        .map(str::to_string)
        .collect()
}

/// Within budget scores 1.0, one level over 0.5, anything pricier 0.0.
/// Unknown on either side is neutral.
pub fn price_match(max_price: Option<u8>, venue_price: Option<u8>) -> f64 {
    match (max_price, venue_price) {
        (Some(budget), Some(price)) if price <= budget => 1.0,
        (Some(budget), Some(price)) if u16::from(price) == u16::from(budget) + 1 => 0.5,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    }
}

/// Stars plus log-normalized review count relative to the pool maximum
pub fn quality_score(stars: Option<f64>, review_count: Option<u64>, max_review_count: u64) -> f64 {
    let stars_norm = clamp01(finite_or_zero(stars) / 5.0);

    let denom = (max_review_count.max(1) as f64).ln_1p();
    let reviews_norm = clamp01((review_count.unwrap_or(0) as f64).ln_1p() / denom);

    clamp01(0.6 * stars_norm + 0.4 * reviews_norm)
}

/// Net sentiment mapped from `[-1, 1]` onto `[0, 1]`
pub fn sentiment_score(positive: Option<f64>, negative: Option<f64>) -> f64 {
    let net = finite_or_zero(positive) - finite_or_zero(negative);
    clamp01((net + 1.0) / 2.0)
}

/// Rate for the requested period, or the mean of all three
pub fn mealtime_fit(period: Option<MealPeriod>, rates: &MealRates) -> f64 {
    let morning = clamp01(finite_or_zero(rates.morning));
    let lunch = clamp01(finite_or_zero(rates.lunch));
    let dinner = clamp01(finite_or_zero(rates.dinner));

    match period {
        Some(MealPeriod::Morning) => morning,
        Some(MealPeriod::Lunch) => lunch,
        Some(MealPeriod::Dinner) => dinner,
        None => (morning + lunch + dinner) / 3.0,
    }
}

/// 1.0 only for a value that reads as the integer 1
pub fn open_flag(value: &serde_json::Value) -> f64 {
    use serde_json::Value;

    let as_int = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    if as_int == Some(1) {
        1.0
    } else {
        0.0
    }
}
