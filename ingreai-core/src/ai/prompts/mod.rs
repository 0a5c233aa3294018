//! AI prompt templates.

pub mod detail;
pub mod image;
pub mod suggest;

pub use detail::{render_detail_prompt, DETAIL_PROMPT_NAME};
pub use image::{render_cover_image_prompt, render_step_image_prompt, IMAGE_PROMPT_NAME};
pub use suggest::{
    render_suggest_from_image_prompt, render_suggest_from_text_prompt,
    SUGGEST_FROM_IMAGE_PROMPT_NAME, SUGGEST_FROM_TEXT_PROMPT_NAME,
};
