//! Terminal rendering and image export for pipeline results.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ingreai_core::{Detail, ImageRef, SelectionPhase, SelectionState, Suggestion};

pub fn print_suggestions(suggestions: &[Suggestion]) {
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("{}. {}", i + 1, suggestion.name);
        if !suggestion.description.is_empty() {
            println!("   {}", suggestion.description);
        }
    }
}

pub fn print_selection(selection: &SelectionState) {
    let name = selection
        .selected
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or_default();

    match (&selection.phase, &selection.detail) {
        (SelectionPhase::DetailReady, Some(detail)) => {
            println!();
            print_detail(name, detail, &selection.step_images);
        }
        _ => {
            if let Some(error) = &selection.error {
                eprintln!("{}", error);
            }
        }
    }
}

pub fn print_detail(name: &str, detail: &Detail, step_images: &[Option<ImageRef>]) {
    println!("{}", name);

    let timings: Vec<String> = [
        ("Prep", &detail.prep_time),
        ("Cook", &detail.cook_time),
        ("Serves", &detail.servings),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
    .collect();
    if !timings.is_empty() {
        println!("{}", timings.join(" | "));
    }

    if !detail.ingredients.is_empty() {
        println!("\nIngredients:");
        for ingredient in &detail.ingredients {
            println!("  - {}", ingredient);
        }
    }

    println!("\nInstructions:");
    for (i, step) in detail.instructions.iter().enumerate() {
        let marker = match step_images.get(i) {
            Some(Some(_)) => "",
            _ => " (no image)",
        };
        println!("  {}. {}{}", i + 1, step, marker);
    }
}

/// Write each suggestion's cover as `cover-<n>-<slug>.<ext>`.
pub fn save_covers(dir: &Path, suggestions: &[Suggestion]) -> Result<()> {
    for (i, suggestion) in suggestions.iter().enumerate() {
        if let Some(cover) = &suggestion.cover_image {
            let stem = format!("cover-{}-{}", i + 1, slugify(&suggestion.name));
            write_image(dir, &stem, cover)?;
        }
    }
    Ok(())
}

/// Write each illustrated step as `<slug>-step-<n>.<ext>`. Steps without
/// an image are skipped.
pub fn save_step_images(dir: &Path, name: &str, step_images: &[Option<ImageRef>]) -> Result<()> {
    let slug = slugify(name);
    for (i, image) in step_images.iter().enumerate() {
        if let Some(image) = image {
            write_image(dir, &format!("{}-step-{}", slug, i + 1), image)?;
        }
    }
    Ok(())
}

fn write_image(dir: &Path, stem: &str, image: &ImageRef) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(format!("{}.{}", stem, extension_for(image.mime_type())));
    let data = image
        .decode()
        .with_context(|| format!("Image for {} is not valid base64", stem))?;
    fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "Saved image");
    Ok(path)
}

fn extension_for(mime_type: &str) -> &str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
