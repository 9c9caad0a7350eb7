use std::sync::Arc;

use crate::{
    config::Config,
    db::{CatalogSeed, InMemoryStore},
    models::PageRequest,
    services::{MovieCatalog, RecommendationService, SimilarityEngine, UserDirectory},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(recommendations: RecommendationService, config: &Config) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Builds the suggestion service over stores for both collaborator roles
    pub fn service_for<S>(store: Arc<S>, config: &Config) -> RecommendationService
    where
        S: MovieCatalog + UserDirectory + 'static,
    {
        let movies: Arc<dyn MovieCatalog> = store.clone();
        let users: Arc<dyn UserDirectory> = store;
        let engine = SimilarityEngine::new(movies.clone(), users.clone(), config.scoring_weights());
        RecommendationService::new(movies, users, engine)
    }

    /// State backed by an in-memory store, without caching
    pub fn in_memory(seed: CatalogSeed, config: &Config) -> Self {
        let store = Arc::new(InMemoryStore::new(seed));
        Self::new(Self::service_for(store, config), config)
    }

    /// Applies the configured defaults and bounds to raw query parameters
    pub fn page_request(&self, page: Option<u32>, size: Option<u32>) -> PageRequest {
        PageRequest::bounded(page, size, self.default_page_size, self.max_page_size)
    }
}
