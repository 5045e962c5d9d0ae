// Core algorithm exports
pub mod attributes;
pub mod features;
pub mod personalize;
pub mod policy;
pub mod ranker;
pub mod scoring;

pub use attributes::{parse_attributes, Attributes, MealSuitability, ParsedAttributes};
pub use features::{extract_features, FeatureVector, KeywordMatcher, QueryContext};
pub use personalize::{blend, Blended, VenueSignals};
pub use policy::{ScoringPolicy, SHORT_TERM_CAP, TOP_K};
pub use ranker::{RankMode, RankResult, RankedVenue, Ranker};
pub use scoring::calculate_content_score;
