mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ingreai_core::ai::create_backend_from_env;
use ingreai_core::{
    enrich_detail, AiGenerationClient, GenerationClient, PipelineConfig, PipelineController,
    SearchPhase, SearchQuery, SelectionPhase, Suggestion,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "ingreai")]
#[command(about = "Recipe ideas from the ingredients you have", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest recipes from an ingredient list or a photo of ingredients
    Suggest {
        #[command(flatten)]
        source: Source,
        /// Load the full recipe for the Nth suggestion (1-based)
        #[arg(long)]
        select: Option<usize>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch the full recipe for a dish by name
    Detail {
        /// Recipe name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Comma-separated ingredients, e.g. "eggs, onion, cheese"
    #[arg(long)]
    ingredients: Option<String>,
    /// Path to a photo of ingredients
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write generated images into this directory
    #[arg(long)]
    save_images: Option<PathBuf>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::from_env();
    let backend = create_backend_from_env()?;
    tracing::info!(
        backend = backend.backend_name(),
        max_concurrency = config.max_concurrency,
        "Using AI backend"
    );
    let client: Arc<dyn GenerationClient> = Arc::new(AiGenerationClient::new(backend, &config));

    match cli.command {
        Commands::Suggest {
            source,
            select,
            output,
        } => {
            let query = match (source.ingredients, source.image) {
                (Some(text), _) => SearchQuery::text(text),
                (None, Some(path)) => {
                    let data = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    SearchQuery::image(data)
                }
                (None, None) => bail!("Provide --ingredients or --image"),
            };
            suggest(client, config, query, select, &output).await?;
        }
        Commands::Detail { name, output } => {
            detail(client.as_ref(), &config, &name, &output).await?;
        }
    }

    Ok(())
}

async fn suggest(
    client: Arc<dyn GenerationClient>,
    config: PipelineConfig,
    query: SearchQuery,
    select: Option<usize>,
    output: &OutputArgs,
) -> Result<()> {
    let controller = PipelineController::new(client, config);

    let mut updates = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            tracing::debug!(
                search = ?snapshot.search.phase,
                selection = ?snapshot.selection.phase,
                "Pipeline state changed"
            );
        }
    });

    controller.search(query).await?;
    let search = controller.snapshot().search;
    if search.phase != SearchPhase::Ready {
        watcher.abort();
        bail!(search.error.unwrap_or_default());
    }

    if let Some(position) = select {
        let index = position
            .checked_sub(1)
            .context("--select counts from 1")?;
        controller.select(index).await?;
    }
    watcher.abort();

    let snapshot = controller.snapshot();
    if output.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        output::print_suggestions(&snapshot.search.suggestions);
        if snapshot.selection.phase != SelectionPhase::None {
            output::print_selection(&snapshot.selection);
        }
    }

    if let Some(dir) = &output.save_images {
        output::save_covers(dir, &snapshot.search.suggestions)?;
        if let Some(selected) = &snapshot.selection.selected {
            output::save_step_images(dir, &selected.name, &snapshot.selection.step_images)?;
        }
    }

    if snapshot.selection.phase == SelectionPhase::DetailFailed {
        bail!(snapshot.selection.error.unwrap_or_default());
    }

    Ok(())
}

async fn detail(
    client: &dyn GenerationClient,
    config: &PipelineConfig,
    name: &str,
    output: &OutputArgs,
) -> Result<()> {
    let suggestion = Suggestion::new(name, "");
    let enriched = enrich_detail(client, &suggestion, config).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&enriched)?);
    } else {
        output::print_detail(name, &enriched.detail, &enriched.step_images);
    }

    if let Some(dir) = &output.save_images {
        output::save_step_images(dir, name, &enriched.step_images)?;
    }

    Ok(())
}
