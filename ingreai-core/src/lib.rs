pub mod ai;
pub mod client;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod types;

pub use client::{AiGenerationClient, GenerationClient};
pub use config::PipelineConfig;
pub use enrichment::{enrich_cover_images, enrich_detail, EnrichedDetail};
pub use error::GenerationError;
pub use pipeline::{
    PipelineController, PipelineError, PipelineSnapshot, SearchPhase, SearchQuery, SearchState,
    SelectionPhase, SelectionState,
};
pub use types::{Detail, ImageRef, Suggestion};
