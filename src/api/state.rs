use std::sync::Arc;

use crate::{
    db::InteractionStore,
    services::{
        plot_search::PlotSearch,
        providers::{CatalogGateway, TextGenerator},
        recommendations::{
            FeedAssembler, RecommendationEngine, SeedPicker, TrendingFormula, TrendingRanker,
            UniformPicker,
        },
        social::SocialService,
    },
};

/// Engine tuning that comes from configuration
#[derive(Clone)]
pub struct EngineSettings {
    pub seed_count: usize,
    pub trending_formula: TrendingFormula,
    pub picker: Arc<dyn SeedPicker>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed_count: 5,
            trending_formula: TrendingFormula::default(),
            picker: Arc::new(UniformPicker),
        }
    }
}

/// Shared application state; every component is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub engine: RecommendationEngine,
    pub feed: FeedAssembler,
    pub trending: TrendingRanker,
    pub plot_search: PlotSearch,
    pub social: SocialService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn InteractionStore>,
        catalog: Arc<dyn CatalogGateway>,
        generator: Arc<dyn TextGenerator>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            engine: RecommendationEngine::new(
                store.clone(),
                catalog.clone(),
                generator.clone(),
                settings.picker,
                settings.seed_count,
            ),
            feed: FeedAssembler::new(store.clone()),
            trending: TrendingRanker::new(store.clone(), settings.trending_formula),
            plot_search: PlotSearch::new(generator, catalog),
            social: SocialService::new(store),
        }
    }
}
