use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;
use std::sync::Arc;

use crate::{
    models::{Category, CatalogItem, Rating},
    services::providers::{CatalogGateway, TextGenerator},
};

/// Most suggestions kept from one generated answer
pub const MAX_SUGGESTIONS: usize = 5;

/// One line of viewing history handed to the generator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub title: String,
    pub rating: Rating,
}

pub fn recommendation_prompt(
    category: Category,
    history: &[HistoryEntry],
    exclude_titles: &[String],
) -> String {
    let mut prompt = String::from(
        "You are a film recommendation expert. Based on the user's viewing history, \
         ratings, and the chosen category, suggest films they might enjoy.\n\n",
    );
    let _ = writeln!(prompt, "Category: {}", category);
    let _ = writeln!(prompt, "For this category, {}\n", category.prompt_hint());

    prompt.push_str("Viewing History:\n");
    for entry in history {
        let _ = writeln!(
            prompt,
            "- Film: {}, Rating: {} stars",
            entry.title,
            entry.rating.value()
        );
    }

    if !exclude_titles.is_empty() {
        prompt.push_str("\nDo not suggest any of the following films:\n");
        for title in exclude_titles {
            let _ = writeln!(prompt, "- {}", title);
        }
    }

    let _ = write!(
        prompt,
        "\nReturn only the titles of up to {} films, one per line.",
        MAX_SUGGESTIONS
    );
    prompt
}

/// Splits generated text into at most five clean titles.
///
/// Leading list markers ("1.", "2)", "-", "*", "•") are stripped and blank
/// lines dropped.
pub fn parse_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_enumeration)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn strip_enumeration(line: &str) -> &str {
    let line = line.trim();

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
        // A title that merely starts with a number, e.g. "2001: A Space Odyssey"
        return line;
    }

    line.strip_prefix(['-', '*', '•'])
        .map(str::trim)
        .unwrap_or(line)
}

/// Resolves free-text titles to catalog items, first search hit each.
///
/// Titles with no hit, or whose search failed, are dropped. Output keeps
/// suggestion order and has no duplicate ids.
pub async fn resolve_titles(catalog: &dyn CatalogGateway, titles: &[String]) -> Vec<CatalogItem> {
    let lookups = titles.iter().map(|title| async move {
        match catalog.search(title).await {
            Ok(hits) => {
                let first = hits.into_iter().next();
                if first.is_none() {
                    tracing::debug!(title = %title, "Suggested title has no catalog match");
                }
                first
            }
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Catalog search failed for suggestion");
                None
            }
        }
    });

    let mut seen = HashSet::new();
    join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .filter(|item| seen.insert(item.id))
        .collect()
}

/// Generative fallback for sections the similarity path left empty
#[derive(Clone)]
pub struct AiFallbackResolver {
    generator: Arc<dyn TextGenerator>,
    catalog: Arc<dyn CatalogGateway>,
}

impl AiFallbackResolver {
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: Arc<dyn CatalogGateway>) -> Self {
        Self { generator, catalog }
    }

    /// Suggestions for `category`, never failing: a generator error is empty
    pub async fn suggest(
        &self,
        category: Category,
        history: &[HistoryEntry],
        exclude_titles: &[String],
    ) -> Vec<CatalogItem> {
        let prompt = recommendation_prompt(category, history, exclude_titles);

        let text = match self.generator.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    error = %e,
                    "Generative suggestions unavailable"
                );
                return vec![];
            }
        };

        let titles = parse_suggestions(&text);
        let items = resolve_titles(self.catalog.as_ref(), &titles).await;

        tracing::info!(
            category = %category,
            suggested = titles.len(),
            resolved = items.len(),
            "Generative fallback resolved"
        );

        items
    }
}
