pub mod catalog;
pub mod recommendations;
pub mod scoring;
pub mod similarity;

pub use catalog::{MovieCatalog, UserDirectory};
pub use recommendations::RecommendationService;
pub use scoring::ScoringWeights;
pub use similarity::SimilarityEngine;
