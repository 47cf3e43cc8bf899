use std::path::PathBuf;

use clap::{Parser, Subcommand};
use visionflow::Result;
use visionflow::commands::{run_analyze, run_detect, run_embed, run_ocr};
use visionflow::config::{
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_MAX_TEXT_CHARS, DEFAULT_TEXT_FIELD, PipelineConfig,
};
use visionflow::http::DEFAULT_TIMEOUT_SECONDS;

#[derive(Parser)]
#[command(name = "visionflow")]
#[command(about = "Enrich NDJSON datasets with embeddings and query vision APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a text field of every record in a line-delimited JSON dataset
    Embed {
        /// Path to the input NDJSON file
        #[arg(long)]
        input: PathBuf,
        /// Path for the enriched NDJSON output
        #[arg(long)]
        output: PathBuf,
        /// Record field holding the text to embed
        #[arg(long, default_value = DEFAULT_TEXT_FIELD)]
        field: String,
        /// Write a checkpoint file after every N successful embeddings
        #[arg(long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
        checkpoint_interval: usize,
        /// Truncate text to this many characters before embedding
        #[arg(long, default_value_t = DEFAULT_MAX_TEXT_CHARS)]
        max_chars: usize,
        /// Request timeout in seconds for embedding calls
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        timeout_secs: u64,
    },
    /// Analyze an image: description, categories, colors
    Analyze {
        /// URL of the image to analyze
        url: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        timeout_secs: u64,
    },
    /// Detect objects in an image
    Detect {
        /// URL of the image to analyze
        url: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        timeout_secs: u64,
    },
    /// Recognize printed text in an image
    Ocr {
        /// URL of the image to analyze
        url: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        timeout_secs: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Embed {
            input,
            output,
            field,
            checkpoint_interval,
            max_chars,
            timeout_secs,
        } => {
            let config = PipelineConfig {
                input_path: input,
                output_path: output,
                text_field: field,
                checkpoint_interval,
                max_text_chars: max_chars,
            };
            run_embed(&config, timeout_secs)?;
        }
        Commands::Analyze { url, timeout_secs } => {
            run_analyze(&url, timeout_secs)?;
        }
        Commands::Detect { url, timeout_secs } => {
            run_detect(&url, timeout_secs)?;
        }
        Commands::Ocr { url, timeout_secs } => {
            run_ocr(&url, timeout_secs)?;
        }
    }

    Ok(())
}
