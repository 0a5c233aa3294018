//! The pipeline controller: owns search and selection state and sequences
//! the generation client and enrichers.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info_span, Instrument};

use crate::client::{validate_ingredients, validate_photo, GenerationClient};
use crate::config::PipelineConfig;
use crate::enrichment::{enrich_cover_images, enrich_detail};
use crate::error::GenerationError;
use crate::types::Suggestion;

use super::state::{
    PipelineSnapshot, SearchPhase, SearchState, SelectionPhase, SelectionState,
    EMPTY_RESULT_MESSAGE, SEARCH_FAILED_MESSAGE,
};

/// Rejection of an inbound request. Nothing in the published state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid search input: {0}")]
    InvalidInput(String),

    #[error("No selectable suggestion at position {index}")]
    NotSelectable { index: usize },
}

/// What the user searched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Free-text ingredient list.
    Text(String),
    /// Raw bytes of a photo of ingredients.
    Image(Vec<u8>),
}

impl SearchQuery {
    pub fn text(ingredients: impl Into<String>) -> Self {
        SearchQuery::Text(ingredients.into())
    }

    pub fn image(data: Vec<u8>) -> Self {
        SearchQuery::Image(data)
    }

    fn kind(&self) -> &'static str {
        match self {
            SearchQuery::Text(_) => "text",
            SearchQuery::Image(_) => "image",
        }
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let checked = match self {
            SearchQuery::Text(text) => validate_ingredients(text).map(|_| ()),
            SearchQuery::Image(data) => validate_photo(data).map(|_| ()),
        };
        checked.map_err(|e| match e {
            GenerationError::InvalidInput(reason) => PipelineError::InvalidInput(reason),
            other => PipelineError::InvalidInput(other.to_string()),
        })
    }
}

/// Owns the current search and selection, and is their only writer.
///
/// Consumers read via [`snapshot`](Self::snapshot) or
/// [`subscribe`](Self::subscribe). Clones share the same state.
///
/// The `start_*` methods are fire-and-forget: they validate and move the
/// state into its loading phase immediately, then finish the work on a
/// spawned task (so they must be called from within a Tokio runtime). The
/// returned handle can be ignored. The awaitable variants do the same work
/// inline.
#[derive(Clone)]
pub struct PipelineController {
    client: Arc<dyn GenerationClient>,
    config: PipelineConfig,
    state: Arc<watch::Sender<PipelineSnapshot>>,
}

impl PipelineController {
    pub fn new(client: Arc<dyn GenerationClient>, config: PipelineConfig) -> Self {
        let (state, _) = watch::channel(PipelineSnapshot::default());
        Self {
            client,
            config,
            state: Arc::new(state),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.state.subscribe()
    }

    /// Start a new search, superseding any search or selection in flight.
    pub fn start_search(&self, query: SearchQuery) -> Result<JoinHandle<()>, PipelineError> {
        query.validate()?;
        let generation = self.begin_search();
        let span = info_span!("search", generation, kind = query.kind());

        let controller = self.clone();
        Ok(tokio::spawn(
            async move { controller.run_search(generation, query).await }.instrument(span),
        ))
    }

    /// Run a search to completion.
    pub async fn search(&self, query: SearchQuery) -> Result<(), PipelineError> {
        query.validate()?;
        let generation = self.begin_search();
        let span = info_span!("search", generation, kind = query.kind());

        self.run_search(generation, query).instrument(span).await;
        Ok(())
    }

    /// Select the suggestion at `index` of the ready search and load its detail.
    pub fn start_select(&self, index: usize) -> Result<JoinHandle<()>, PipelineError> {
        let (generation, suggestion) = self.begin_selection(index)?;
        let span = info_span!("select", generation, recipe = %suggestion.name);

        let controller = self.clone();
        Ok(tokio::spawn(
            async move { controller.run_selection(generation, suggestion).await }
                .instrument(span),
        ))
    }

    /// Select a suggestion and wait for its detail to load.
    pub async fn select(&self, index: usize) -> Result<(), PipelineError> {
        let (generation, suggestion) = self.begin_selection(index)?;
        let span = info_span!("select", generation, recipe = %suggestion.name);

        self.run_selection(generation, suggestion)
            .instrument(span)
            .await;
        Ok(())
    }

    /// Drop the current selection. Does nothing if nothing is selected.
    pub fn clear_selection(&self) {
        self.state.send_if_modified(|snap| {
            if snap.selection.phase == SelectionPhase::None {
                return false;
            }
            snap.selection_generation += 1;
            snap.selection = SelectionState::default();
            true
        });
    }

    fn begin_search(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|snap| {
            snap.search_generation += 1;
            // A new search also invalidates whatever was selected from the old one.
            snap.selection_generation += 1;
            snap.search = SearchState::searching();
            snap.selection = SelectionState::default();
            generation = snap.search_generation;
        });
        generation
    }

    async fn run_search(&self, generation: u64, query: SearchQuery) {
        let next = match self.discover(&query).await {
            Ok(suggestions) if suggestions.is_empty() => {
                tracing::info!("Search returned no recipes");
                SearchState::failed(EMPTY_RESULT_MESSAGE)
            }
            Ok(suggestions) => {
                tracing::info!(count = suggestions.len(), "Search ready");
                SearchState::ready(suggestions)
            }
            Err(e) if e.is_upstream() => {
                tracing::warn!(error = %e, "Recipe search failed");
                SearchState::failed(SEARCH_FAILED_MESSAGE)
            }
            Err(e) => {
                tracing::error!(error = %e, "Generation client rejected a validated query");
                SearchState::failed(SEARCH_FAILED_MESSAGE)
            }
        };

        self.state.send_if_modified(|snap| {
            if snap.search_generation != generation {
                tracing::debug!(
                    current = snap.search_generation,
                    "Dropping result of superseded search"
                );
                return false;
            }
            snap.search = next;
            true
        });
    }

    /// Suggest, then attach covers. An empty suggestion list skips enrichment.
    async fn discover(&self, query: &SearchQuery) -> Result<Vec<Suggestion>, GenerationError> {
        let suggestions = match query {
            SearchQuery::Text(text) => self.client.suggest_from_text(text).await?,
            SearchQuery::Image(data) => self.client.suggest_from_image(data).await?,
        };

        if suggestions.is_empty() {
            return Ok(suggestions);
        }

        enrich_cover_images(self.client.as_ref(), suggestions, &self.config).await
    }

    fn begin_selection(&self, index: usize) -> Result<(u64, Suggestion), PipelineError> {
        let mut started = None;
        self.state.send_if_modified(|snap| {
            if snap.search.phase != SearchPhase::Ready {
                return false;
            }
            let Some(suggestion) = snap.search.suggestions.get(index).cloned() else {
                return false;
            };
            snap.selection_generation += 1;
            snap.selection = SelectionState::loading(suggestion.clone());
            started = Some((snap.selection_generation, suggestion));
            true
        });
        started.ok_or(PipelineError::NotSelectable { index })
    }

    async fn run_selection(&self, generation: u64, suggestion: Suggestion) {
        let next = match enrich_detail(self.client.as_ref(), &suggestion, &self.config).await {
            Ok(enriched) => {
                tracing::info!(steps = enriched.step_images.len(), "Detail ready");
                SelectionState::ready(suggestion, enriched)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Detail fetch failed");
                SelectionState::failed(suggestion)
            }
        };

        self.state.send_if_modified(|snap| {
            if snap.selection_generation != generation {
                tracing::debug!(
                    current = snap.selection_generation,
                    "Dropping result of superseded selection"
                );
                return false;
            }
            snap.selection = next;
            true
        });
    }
}
