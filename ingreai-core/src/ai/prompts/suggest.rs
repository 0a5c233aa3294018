//! Prompt templates for suggesting recipes from available ingredients.

/// Prompt name for text-based suggestions.
pub const SUGGEST_FROM_TEXT_PROMPT_NAME: &str = "suggest_from_text";

/// Prompt name for photo-based suggestions.
pub const SUGGEST_FROM_IMAGE_PROMPT_NAME: &str = "suggest_from_image";

const RESPONSE_FORMAT: &str = r#"Respond with JSON only, no other text:
{"recipes": [{"name": "Recipe Name", "description": "One or two appetising sentences"}]}"#;

/// Render the prompt for a free-text ingredient list.
pub fn render_suggest_from_text_prompt(ingredients: &str) -> String {
    format!(
        r#"You are a creative home-cooking assistant. Suggest up to 6 distinct recipes that can be made mainly with the ingredients below. Assume common pantry staples (salt, pepper, oil, water) are available.

Ingredients: {ingredients}

{format}"#,
        ingredients = ingredients,
        format = RESPONSE_FORMAT
    )
}

/// Render the prompt sent alongside a photo of ingredients.
pub fn render_suggest_from_image_prompt() -> String {
    format!(
        r#"You are a creative home-cooking assistant. Identify the food ingredients visible in the attached photo, then suggest up to 6 distinct recipes that can be made mainly with them. Assume common pantry staples (salt, pepper, oil, water) are available. If no food is visible, return an empty list.

{format}"#,
        format = RESPONSE_FORMAT
    )
}
