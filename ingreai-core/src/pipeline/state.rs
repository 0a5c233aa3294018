//! Search and selection state published by the pipeline controller.

use serde::Serialize;

use crate::enrichment::EnrichedDetail;
use crate::types::{Detail, ImageRef, Suggestion};

/// Shown when discovery succeeds but yields nothing.
pub const EMPTY_RESULT_MESSAGE: &str = "Could not find any recipes. Try different ingredients.";

/// Shown when discovery or cover generation fails.
pub const SEARCH_FAILED_MESSAGE: &str =
    "Failed to fetch recipes. Please check your connection and API key.";

/// Message for a failed detail fetch.
pub fn detail_failed_message(name: &str) -> String {
    format!("Failed to fetch details for {}.", name)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Ready,
    Failed,
}

/// The current search. `suggestions` is non-empty only when `Ready`,
/// `error` is set only when `Failed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub phase: SearchPhase,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchState {
    pub(crate) fn searching() -> Self {
        Self {
            phase: SearchPhase::Searching,
            ..Default::default()
        }
    }

    pub(crate) fn ready(suggestions: Vec<Suggestion>) -> Self {
        Self {
            phase: SearchPhase::Ready,
            suggestions,
            error: None,
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            phase: SearchPhase::Failed,
            suggestions: Vec::new(),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPhase {
    #[default]
    None,
    LoadingDetail,
    DetailReady,
    DetailFailed,
}

/// The currently selected suggestion and its detail.
///
/// `selected` is `None` exactly when `phase` is `None`; `detail` is present
/// only when `DetailReady`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Suggestion>,
    pub phase: SelectionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Detail>,
    /// Index-aligned with `detail.instructions`.
    pub step_images: Vec<Option<ImageRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SelectionState {
    pub(crate) fn loading(selected: Suggestion) -> Self {
        Self {
            selected: Some(selected),
            phase: SelectionPhase::LoadingDetail,
            ..Default::default()
        }
    }

    pub(crate) fn ready(selected: Suggestion, enriched: EnrichedDetail) -> Self {
        Self {
            selected: Some(selected),
            phase: SelectionPhase::DetailReady,
            detail: Some(enriched.detail),
            step_images: enriched.step_images,
            error: None,
        }
    }

    pub(crate) fn failed(selected: Suggestion) -> Self {
        let error = detail_failed_message(&selected.name);
        Self {
            selected: Some(selected),
            phase: SelectionPhase::DetailFailed,
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Everything a consumer needs to render the current state.
///
/// The generation counters are the staleness tokens: each search or
/// selection lifecycle bumps its counter, and a continuation only applies
/// its result if the counter still holds the value it started with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    pub search: SearchState,
    pub selection: SelectionState,
    #[serde(skip)]
    pub(crate) search_generation: u64,
    #[serde(skip)]
    pub(crate) selection_generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_selection_message() {
        let state = SelectionState::failed(Suggestion::new("Paella", ""));
        assert_eq!(state.phase, SelectionPhase::DetailFailed);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch details for Paella."));
        assert!(state.detail.is_none());
    }

    #[test]
    fn test_snapshot_serializes_without_tokens() {
        let snapshot = PipelineSnapshot {
            search: SearchState::failed(EMPTY_RESULT_MESSAGE),
            search_generation: 4,
            ..Default::default()
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["search"]["phase"], "failed");
        assert_eq!(json["search"]["error"], EMPTY_RESULT_MESSAGE);
        assert_eq!(json["selection"]["phase"], "none");
        assert!(json.get("search_generation").is_none());
    }
}
