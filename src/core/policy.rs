//! Versioned scoring policy.
//!
//! Every hand-tuned constant that shapes the ranking lives here so that a
//! change to any of them is a visible, versioned policy change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::EventKind;

pub const POLICY_VERSION: &str = "v1";

/// Maximum number of records kept in the short-term log
pub const SHORT_TERM_CAP: usize = 20;

/// Number of results returned by a ranking call
pub const TOP_K: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("{0} weights must be finite and non-negative")]
    InvalidWeight(&'static str),

    #[error("{group} weights must sum to 1.0, got {sum}")]
    WeightSum { group: &'static str, sum: f64 },

    #[error("{0} must be finite and positive")]
    InvalidNormalizer(&'static str),
}

/// Weights of the six content sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentWeights {
    pub cuisine: f64,
    pub price: f64,
    pub quality: f64,
    pub sentiment: f64,
    pub mealtime: f64,
    pub open: f64,
}

impl ContentWeights {
    pub fn sum(&self) -> f64 {
        self.cuisine + self.price + self.quality + self.sentiment + self.mealtime + self.open
    }

    fn values(&self) -> [f64; 6] {
        [self.cuisine, self.price, self.quality, self.sentiment, self.mealtime, self.open]
    }
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            cuisine: 0.30,
            price: 0.20,
            quality: 0.20,
            sentiment: 0.15,
            mealtime: 0.10,
            open: 0.05,
        }
    }
}

/// Mix of baseline, session and long-term signals in the final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub baseline: f64,
    pub session: f64,
    pub long_term: f64,
}

impl BlendWeights {
    pub fn sum(&self) -> f64 {
        self.baseline + self.session + self.long_term
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            baseline: 0.5,
            session: 0.3,
            long_term: 0.2,
        }
    }
}

/// Weight each interaction kind adds to the profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventWeights {
    pub click: f64,
    pub details_view: f64,
    pub save: f64,
    pub route_started: f64,
    pub skip: f64,
}

impl EventWeights {
    pub fn weight(&self, kind: EventKind) -> f64 {
        match kind {
            EventKind::Click => self.click,
            EventKind::DetailsView => self.details_view,
            EventKind::Save => self.save,
            EventKind::RouteStarted => self.route_started,
            EventKind::Skip => self.skip,
        }
    }
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            click: 1.0,
            details_view: 2.0,
            save: 5.0,
            route_started: 10.0,
            skip: -1.0,
        }
    }
}

/// Divisors that map raw profile sums into `[0, 1]`, and the split of the
/// long-term match between cuisine and price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizers {
    pub session: f64,
    pub long_term_cuisine: f64,
    pub long_term_price: f64,
    pub long_term_cuisine_share: f64,
    pub long_term_price_share: f64,
}

impl Default for Normalizers {
    fn default() -> Self {
        Self {
            session: 20.0,
            long_term_cuisine: 50.0,
            long_term_price: 20.0,
            long_term_cuisine_share: 0.7,
            long_term_price_share: 0.3,
        }
    }
}

/// Complete scoring policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub version: String,
    pub content: ContentWeights,
    pub blend: BlendWeights,
    pub events: EventWeights,
    pub normalizers: Normalizers,
    /// Minimum boost over baseline before an explanation is attempted
    pub explanation_margin: f64,
    /// A session or long-term match must exceed this to become a reason
    pub reason_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            content: ContentWeights::default(),
            blend: BlendWeights::default(),
            events: EventWeights::default(),
            normalizers: Normalizers::default(),
            explanation_margin: 0.05,
            reason_threshold: 0.3,
        }
    }
}

impl ScoringPolicy {
    /// Check weight groups and normalizers, returning the policy unchanged
    pub fn validate(self) -> Result<Self, PolicyError> {
        check_group("content", &self.content.values())?;
        check_group(
            "blend",
            &[self.blend.baseline, self.blend.session, self.blend.long_term],
        )?;
        check_group(
            "long-term share",
            &[
                self.normalizers.long_term_cuisine_share,
                self.normalizers.long_term_price_share,
            ],
        )?;

        let events = &self.events;
        if [events.click, events.details_view, events.save, events.route_started, events.skip]
            .iter()
            .any(|w| !w.is_finite())
        {
            return Err(PolicyError::InvalidWeight("event"));
        }

        for (name, value) in [
            ("session normalizer", self.normalizers.session),
            ("long-term cuisine normalizer", self.normalizers.long_term_cuisine),
            ("long-term price normalizer", self.normalizers.long_term_price),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PolicyError::InvalidNormalizer(name));
            }
        }
        if !self.explanation_margin.is_finite() || !self.reason_threshold.is_finite() {
            return Err(PolicyError::InvalidNormalizer("explanation threshold"));
        }

        Ok(self)
    }
}

fn check_group(group: &'static str, values: &[f64]) -> Result<(), PolicyError> {
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(PolicyError::InvalidWeight(group));
    }
    let sum: f64 = values.iter().sum();
    if (sum - 1.0).abs() > 1e-9 {
        return Err(PolicyError::WeightSum { group, sum });
    }
    Ok(())
}
