use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{InteractionEvent, MealPeriod, Query};

/// Query string of the recommend endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendParams {
    #[validate(length(min = 1, max = 128))]
    #[serde(rename = "userId", alias = "user_id", default)]
    pub user_id: Option<String>,
    /// Comma-separated keywords
    #[serde(default)]
    pub keywords: String,
    #[validate(range(min = 1, max = 4))]
    #[serde(rename = "maxPrice", alias = "max_price", default)]
    pub max_price: Option<u8>,
    #[validate(custom(function = "validate_meal"))]
    #[serde(default)]
    pub meal: Option<String>,
    /// Local hour of day, used when no meal is given
    #[validate(range(max = 23))]
    #[serde(default)]
    pub hour: Option<u8>,
    #[serde(default)]
    pub personalize: bool,
}

impl RecommendParams {
    pub fn to_query(&self) -> Query {
        Query::from_keyword_string(&self.keywords)
            .with_max_price(self.max_price)
            .with_meal(resolve_meal(self.meal.as_deref(), self.hour))
            .personalized(self.personalize)
    }
}

/// Search request body
///
/// ```json
/// {
///   "query": "ramen, japanese",
///   "preferences": { "maxPrice": 2, "meal": "dinner" },
///   "personalize": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 512))]
    pub query: String,
    #[validate(nested)]
    #[serde(default)]
    pub preferences: SearchPreferences,
    #[serde(default)]
    pub personalize: bool,
    #[validate(length(min = 1, max = 128))]
    #[serde(rename = "userId", alias = "user_id", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchPreferences {
    #[validate(range(min = 1, max = 4))]
    #[serde(rename = "maxPrice", alias = "max_price", default)]
    pub max_price: Option<u8>,
    #[validate(custom(function = "validate_meal"))]
    #[serde(default)]
    pub meal: Option<String>,
    #[validate(range(max = 23))]
    #[serde(default)]
    pub hour: Option<u8>,
}

impl SearchPreferences {
    pub fn meal_period(&self) -> Option<MealPeriod> {
        resolve_meal(self.meal.as_deref(), self.hour)
    }
}

/// Interaction report body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InteractionRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(rename = "userId", alias = "user_id", default)]
    pub user_id: Option<String>,
    #[validate(length(min = 1))]
    #[serde(rename = "venueId", alias = "business_id")]
    pub venue_id: String,
    #[serde(rename = "eventType", alias = "event_type")]
    pub event_type: String,
    #[serde(default)]
    pub categories: Option<String>,
    #[validate(range(min = 1, max = 4))]
    #[serde(rename = "priceLevel", alias = "price_level", default)]
    pub price_level: Option<u8>,
}

impl InteractionRequest {
    pub fn to_event(&self) -> InteractionEvent {
        InteractionEvent::new(
            self.venue_id.clone(),
            self.event_type.clone(),
            self.categories.clone().unwrap_or_default(),
        )
        .with_price_level(self.price_level)
    }
}

/// Query string of the profile endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileParams {
    #[validate(length(min = 1, max = 128))]
    #[serde(rename = "userId", alias = "user_id", default)]
    pub user_id: Option<String>,
}

/// Accepts `morning`, `lunch`, `dinner`, `none` (any case) or blank
fn validate_meal(meal: &str) -> Result<(), ValidationError> {
    let name = meal.trim().to_lowercase();
    if name.is_empty() || name == "none" || MealPeriod::parse(&name).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_meal_period"))
    }
}

/// An explicit meal name wins; otherwise the hour is bucketed
fn resolve_meal(meal: Option<&str>, hour: Option<u8>) -> Option<MealPeriod> {
    match meal {
        Some(name) if !name.trim().is_empty() => MealPeriod::parse(name),
        _ => hour.map(MealPeriod::from_hour),
    }
}
