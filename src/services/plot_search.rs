use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::CatalogItem,
    services::{
        providers::{CatalogGateway, TextGenerator},
        recommendations::{parse_suggestions, resolve_titles},
    },
};

/// Finds films from a free-text plot description
#[derive(Clone)]
pub struct PlotSearch {
    generator: Arc<dyn TextGenerator>,
    catalog: Arc<dyn CatalogGateway>,
}

pub fn plot_prompt(plot: &str) -> String {
    format!(
        "Based on the following plot summary, suggest up to 5 film titles that match. \
         Return only the titles, separated by newlines. Plot: \"{}\"",
        plot.trim()
    )
}

impl PlotSearch {
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: Arc<dyn CatalogGateway>) -> Self {
        Self { generator, catalog }
    }

    /// Catalog matches for the generator's guesses, deduplicated by id.
    ///
    /// A blank plot is rejected; an unavailable generator yields no matches.
    pub async fn search(&self, plot: &str) -> AppResult<Vec<CatalogItem>> {
        if plot.trim().is_empty() {
            return Err(AppError::InvalidInput("Plot is required".to_string()));
        }

        let text = match self.generator.complete(&plot_prompt(plot)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Plot suggestions unavailable");
                return Ok(vec![]);
            }
        };

        let titles = parse_suggestions(&text);
        let films = resolve_titles(self.catalog.as_ref(), &titles).await;

        tracing::info!(
            suggested = titles.len(),
            resolved = films.len(),
            "Plot search completed"
        );

        Ok(films)
    }
}
