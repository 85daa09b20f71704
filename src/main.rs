use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use qpmatch::app;
use qpmatch::{Config, TransformContext};

#[derive(Parser)]
#[command(name = "qpmatch", about = "Turn text into Wikidata entity/property id sequences")]
struct Cli {
    /// Write debug logs to $TMPDIR/qpmatch-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Config file to use instead of ~/.config/qpmatch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform text into an identifier sequence.
    Transform(TransformArgs),
    /// Inspect or maintain the lookup cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
struct TransformArgs {
    /// Text to transform; multiple words are joined with spaces.
    #[arg(required = true)]
    text: Vec<String>,

    #[arg(long, value_name = "N")]
    max_candidates: Option<usize>,

    /// Emit labels alongside ids.
    #[arg(long)]
    labels: bool,

    #[arg(long, value_name = "N")]
    search_limit: Option<usize>,

    /// Look every phrase up as a property.
    #[arg(long)]
    prefer_properties: bool,

    #[arg(long = "max-span", value_name = "N")]
    max_span_size: Option<usize>,

    /// Narrow ambiguous matches to candidates whose description mentions this.
    #[arg(long)]
    domain: Option<String>,

    /// Answer lookups from a JSON fixture instead of the Wikidata API.
    #[arg(long, value_name = "PATH")]
    fixture: Option<PathBuf>,

    /// Print the full result as JSON.
    #[arg(long, conflicts_with = "links")]
    json: bool,

    /// Print the sequence with HTML links.
    #[arg(long)]
    links: bool,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show memory and durable tier statistics.
    Stats,
    /// Remove every cached lookup.
    Clear,
    /// Remove expired and corrupted entries.
    Sweep,
    /// Write every valid durable entry to a JSON file.
    Export {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Load entries from a file written by `cache export`.
    Import {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    if debug {
        let path = std::env::temp_dir().join("qpmatch-debug.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("qpmatch debug log started: tail -f {}", path.display());
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Transform(args) => transform(&config, args).await,
        Command::Cache { action } => cache(&config, action).await,
    }
}

async fn transform(config: &Config, args: TransformArgs) -> anyhow::Result<()> {
    let mut options = config.engine.transform_options();
    if let Some(n) = args.max_candidates {
        options.max_candidates = n;
    }
    if let Some(n) = args.search_limit {
        options.search_limit = n;
    }
    if let Some(n) = args.max_span_size {
        options.max_span_size = n;
    }
    options.include_labels |= args.labels;
    options.prefer_properties |= args.prefer_properties;

    let backend = app::build_backend(config, args.fixture.as_deref())?;
    let cache = app::build_cache(config)?;
    let transformer = app::build_transformer(config, backend, cache);

    let text = args.text.join(" ");
    let context = TransformContext {
        domain: args.domain,
    };
    let result = transformer
        .transform_with_context(&text, &context, &options)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if args.links {
        println!("{}", result.formatted_with_links);
    } else {
        println!("{}", result.formatted);
        for alt in &result.alternatives {
            eprintln!("alternative (low confidence): {}", alt.sequence);
        }
    }
    Ok(())
}

async fn cache(config: &Config, action: CacheAction) -> anyhow::Result<()> {
    let cache = app::build_cache(config)?;
    match action {
        CacheAction::Stats => {
            let stats = cache.stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        CacheAction::Clear => {
            cache.clear().await;
            println!("cache cleared");
        }
        CacheAction::Sweep => {
            let removed = cache.sweep().await;
            println!("removed {removed} entries");
        }
        CacheAction::Export { path } => {
            let exported = app::export_cache(cache.as_ref(), &path).await?;
            println!("exported {exported} entries to {}", path.display());
        }
        CacheAction::Import { path } => {
            let imported = app::import_cache(cache.as_ref(), &path).await?;
            println!("imported {imported} entries");
        }
    }
    Ok(())
}
