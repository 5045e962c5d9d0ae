use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::attributes::{parse_attributes, Attributes};

/// One candidate venue as delivered by the data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueRecord {
    #[serde(rename = "venueId", alias = "business_id")]
    pub venue_id: String,
    pub name: String,
    #[serde(default)]
    pub stars: Option<f64>,
    #[serde(rename = "reviewCount", alias = "review_count", default)]
    pub review_count: Option<u64>,
    /// Comma-separated category tags, e.g. `"Korean, BBQ, Restaurants"`
    #[serde(default)]
    pub categories: String,
    /// Raw attributes payload (dict literal or JSON object)
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(rename = "morningRate", alias = "morning_rate", default)]
    pub morning_rate: Option<f64>,
    #[serde(rename = "lunchRate", alias = "lunch_rate", default)]
    pub lunch_rate: Option<f64>,
    #[serde(rename = "dinnerRate", alias = "dinner_rate", default)]
    pub dinner_rate: Option<f64>,
    #[serde(rename = "sentimentPositive", alias = "sent_pos_mean", default)]
    pub sentiment_positive: Option<f64>,
    #[serde(rename = "sentimentNegative", alias = "sent_neg_mean", default)]
    pub sentiment_negative: Option<f64>,
    /// Business-level open flag; any JSON scalar, only an integer 1 counts as open
    #[serde(rename = "isOpen", alias = "is_open", default)]
    pub is_open: serde_json::Value,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl VenueRecord {
    /// Category tags in their original casing, blanks dropped
    pub fn category_tags(&self) -> Vec<&str> {
        tokenize_categories(&self.categories)
    }

    /// Lowercased category tokens used for profile lookups
    pub fn category_tokens(&self) -> Vec<String> {
        self.category_tags()
            .into_iter()
            .map(str::to_lowercase)
            .collect()
    }

    pub fn parsed_attributes(&self) -> Attributes {
        parse_attributes(self.attributes.as_deref())
    }

    pub fn price_level(&self) -> Option<u8> {
        self.parsed_attributes().price_level()
    }

    pub fn meal_rates(&self) -> MealRates {
        MealRates {
            morning: self.morning_rate,
            lunch: self.lunch_rate,
            dinner: self.dinner_rate,
        }
    }
}

/// Split a comma-separated tag list, trimming whitespace and dropping empties
pub fn tokenize_categories(categories: &str) -> Vec<&str> {
    categories
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Historical visit rates per meal period, each nominally in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MealRates {
    pub morning: Option<f64>,
    pub lunch: Option<f64>,
    pub dinner: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealPeriod {
    Morning,
    Lunch,
    Dinner,
}

impl MealPeriod {
    /// Parse a meal period name. `"none"` and anything unrecognised yield `None`,
    /// which means "no preferred period". Request validation rejects names
    /// other than these four before they reach here.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "morning" => Some(MealPeriod::Morning),
            "lunch" => Some(MealPeriod::Lunch),
            "dinner" => Some(MealPeriod::Dinner),
            _ => None,
        }
    }

    /// Bucket an hour of day: 5-10 morning, 11-15 lunch, everything else dinner
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            5..=10 => MealPeriod::Morning,
            11..=15 => MealPeriod::Lunch,
            _ => MealPeriod::Dinner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealPeriod::Morning => "morning",
            MealPeriod::Lunch => "lunch",
            MealPeriod::Dinner => "dinner",
        }
    }
}

/// A ranking request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub keywords: Vec<String>,
    pub max_price: Option<u8>,
    pub meal: Option<MealPeriod>,
    pub personalize: bool,
}

impl Query {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            ..Self::default()
        }
    }

    /// Build a query from a comma-separated keyword string such as `"ramen, sushi"`
    pub fn from_keyword_string(keywords: &str) -> Self {
        Self::new(split_keywords(keywords))
    }

    pub fn with_max_price(mut self, max_price: Option<u8>) -> Self {
        self.max_price = max_price;
        self
    }

    pub fn with_meal(mut self, meal: Option<MealPeriod>) -> Self {
        self.meal = meal;
        self
    }

    pub fn personalized(mut self, personalize: bool) -> Self {
        self.personalize = personalize;
        self
    }
}

pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Kinds of interaction that feed the interest profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    DetailsView,
    Save,
    RouteStarted,
    Skip,
}

impl EventKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "click" => Some(EventKind::Click),
            "details_view" => Some(EventKind::DetailsView),
            "save" => Some(EventKind::Save),
            "route_started" => Some(EventKind::RouteStarted),
            "skip" => Some(EventKind::Skip),
            _ => None,
        }
    }
}

/// An interaction reported by a client. `kind` stays a raw string so that
/// unknown kinds can be soft-rejected instead of failing deserialization.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEvent {
    pub venue_id: String,
    pub kind: String,
    pub categories: String,
    pub price_level: Option<u8>,
}

impl InteractionEvent {
    pub fn new(venue_id: impl Into<String>, kind: impl Into<String>, categories: impl Into<String>) -> Self {
        Self {
            venue_id: venue_id.into(),
            kind: kind.into(),
            categories: categories.into(),
            price_level: None,
        }
    }

    pub fn with_price_level(mut self, price_level: Option<u8>) -> Self {
        self.price_level = price_level;
        self
    }

    pub fn category_tokens(&self) -> Vec<String> {
        tokenize_categories(&self.categories)
            .into_iter()
            .map(str::to_lowercase)
            .collect()
    }
}

/// Cumulative preference weights, keyed by lowercased category and by price level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermPreferences {
    #[serde(default)]
    pub cuisine: BTreeMap<String, f64>,
    #[serde(default)]
    pub price_level: BTreeMap<String, f64>,
}

/// One entry of the short-term interaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortTermRecord {
    #[serde(default)]
    pub event_id: Uuid,
    pub venue_id: String,
    pub kind: EventKind,
    pub weight: f64,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub recorded_at: DateTime<Utc>,
}

/// Per-user interest profile.
///
/// The serialized layout (`long_term.cuisine`, `long_term.price_level`,
/// `short_term`) is the durable contract read by other tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub long_term: LongTermPreferences,
    /// Newest first, never longer than the short-term cap
    #[serde(default)]
    pub short_term: VecDeque<ShortTermRecord>,
}

impl UserProfile {
    /// True when no interaction has ever been accumulated
    pub fn has_no_history(&self) -> bool {
        self.short_term.is_empty()
            && self.long_term.cuisine.is_empty()
            && self.long_term.price_level.is_empty()
    }

    /// Fold one weighted interaction into both memories
    pub fn apply(&mut self, record: ShortTermRecord, cap: usize) {
        for token in &record.categories {
            *self.long_term.cuisine.entry(token.clone()).or_insert(0.0) += record.weight;
        }
        if let Some(level) = record.price_level {
            *self
                .long_term
                .price_level
                .entry(level.to_string())
                .or_insert(0.0) += record.weight;
        }

        self.short_term.push_front(record);
        self.short_term.truncate(cap);
    }

    pub fn cuisine_weight(&self, token: &str) -> f64 {
        self.long_term.cuisine.get(token).copied().unwrap_or(0.0)
    }

    pub fn price_weight(&self, level: u8) -> f64 {
        self.long_term
            .price_level
            .get(&level.to_string())
            .copied()
            .unwrap_or(0.0)
    }
}

/// Score of one venue plus the evidence behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "venueId")]
    pub venue_id: String,
    #[serde(rename = "score")]
    pub final_score: f64,
    #[serde(rename = "baselineScore")]
    pub baseline: f64,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(rename = "matchedCategories")]
    pub matched_categories: Vec<String>,
}
