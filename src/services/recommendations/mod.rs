//! Recommendation and social-ranking engine.
//!
//! `RecommendationEngine` drives a pass over the section categories; the
//! trending and feed components are standalone reads of interaction data.

pub mod ai_fallback;
pub mod feed;
pub mod orchestrator;
pub mod seeds;
pub mod similarity;
pub mod social;
pub mod trending;

pub use ai_fallback::{parse_suggestions, resolve_titles, AiFallbackResolver, HistoryEntry};
pub use feed::FeedAssembler;
pub use orchestrator::{static_sections, RecommendationEngine};
pub use seeds::{SeedPicker, SeedSelector, UniformPicker};
pub use similarity::SimilarityRecommender;
pub use social::SocialAggregator;
pub use trending::{TrendingFormula, TrendingRanker};
