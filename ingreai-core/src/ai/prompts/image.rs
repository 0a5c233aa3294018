//! Prompt templates for cover and step illustrations.

/// Prompt name for every image generation call.
pub const IMAGE_PROMPT_NAME: &str = "image";

/// Prompt for a suggestion's cover image.
pub fn render_cover_image_prompt(name: &str) -> String {
    format!(
        "A vibrant, appetizing, professional food photograph of {}, plated and ready to serve, natural light.",
        name
    )
}

/// Prompt for illustrating a single instruction step.
pub fn render_step_image_prompt(step: &str) -> String {
    format!(
        "A clear, well-lit photograph of a home kitchen showing this cooking step in progress: {}",
        step
    )
}
