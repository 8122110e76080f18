use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mausam::config::AppConfig;
use mausam::live::LiveDataClient;
use mausam::rag::{GenerationEngine, RagPipeline};
use mausam::search::SearchClient;
use mausam::{cli, server};

#[derive(Parser)]
#[command(name = "mausam")]
#[command(about = "RAG-backed weather and air quality assistant for Indian cities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session
    Chat,

    /// Answer one query and print the result as JSON
    Ask {
        /// The question to answer
        query: String,
    },

    /// Launch the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "127.0.0.1:5001")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mausam=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let live = Arc::new(LiveDataClient::new(config.openweather_api_key.clone())?);
    let search = Arc::new(SearchClient::new(config.serpapi_key.clone())?);
    let engine = Arc::new(GenerationEngine::new(config.engine_config())?);
    let pipeline = Arc::new(RagPipeline::new(live, search, engine));

    match cli.command {
        Commands::Chat => cli::chat(&pipeline).await?,
        Commands::Ask { query } => cli::ask(&pipeline, &query).await?,
        Commands::Serve { addr } => server::serve(pipeline, &addr).await?,
    }

    Ok(())
}
