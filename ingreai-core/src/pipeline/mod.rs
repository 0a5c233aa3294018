//! Search/selection state machine driving the generation pipeline.
//!
//! Data flows one way: an inbound request (search, select, clear) moves the
//! state into a loading phase, the controller calls the generation client
//! and enrichers, and the outcome is published as a new snapshot:
//!
//! ```text
//! search:  Idle/Ready/Failed -> Searching -> Ready | Failed
//! select:  Ready search      -> LoadingDetail -> DetailReady | DetailFailed
//! clear:   any selection     -> None
//! ```
//!
//! Starting a search or changing the selection supersedes older work of the
//! same kind; late results from superseded work are dropped, never applied.

mod controller;
mod state;

pub use controller::{PipelineController, PipelineError, SearchQuery};
pub use state::{
    detail_failed_message, PipelineSnapshot, SearchPhase, SearchState, SelectionPhase,
    SelectionState, EMPTY_RESULT_MESSAGE, SEARCH_FAILED_MESSAGE,
};
