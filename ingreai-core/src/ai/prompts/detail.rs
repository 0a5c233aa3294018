//! Prompt template for fetching the full recipe for a suggestion.

pub const DETAIL_PROMPT_NAME: &str = "recipe_detail";

pub fn render_detail_prompt(name: &str) -> String {
    format!(
        r#"You are a recipe writer. Write the complete recipe for "{name}".

Respond with JSON only, no other text:
{{
  "ingredients": ["each ingredient with its quantity"],
  "instructions": ["one clear step per entry, in order"],
  "prepTime": "e.g. 10 minutes",
  "cookTime": "e.g. 25 minutes",
  "servings": "e.g. 4"
}}

If you cannot write a recipe for this dish, return {{"instructions": []}}."#,
        name = name
    )
}
