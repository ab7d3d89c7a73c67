use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "leadmatch")]
#[command(about = "Company deduplication, competitor scoring and product gap analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(short, long, default_value = "8787")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Classify a search result as empresa, vaga, artigo, perfil, associacao, educacional or outro
    Classify {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        snippet: String,
        #[arg(short, long, default_value = "")]
        url: String,
    },
    /// Similarity score (0-100) of a search result against a target profile
    Score {
        #[arg(short, long)]
        industry: String,
        #[arg(short, long = "product")]
        products: Vec<String>,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        snippet: String,
    },
    /// Primary and relevant product gaps for a sector
    Gaps {
        #[arg(short, long)]
        sector: String,
        #[arg(short, long = "detected")]
        detected: Vec<String>,
    },
    /// Import a JSON array of rows for a tenant
    Import {
        /// JSON file with an array of row objects, `-` for stdin
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        tenant: String,
        #[arg(long)]
        icp: String,
        #[arg(short, long)]
        source: String,
        /// Source batch id; a random one is generated when omitted
        #[arg(short, long)]
        batch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Classify { title, snippet, url } => {
            commands::analyze::run_classify(&title, &snippet, &url);
        },
        Commands::Score { industry, products, title, snippet } => {
            commands::analyze::run_score(industry, products, &title, &snippet);
        },
        Commands::Gaps { sector, detected } => commands::analyze::run_gaps(&sector, &detected)?,
        Commands::Import { file, tenant, icp, source, batch } => {
            commands::import::run(&file, tenant, icp, source, batch).await?;
        },
    }

    Ok(())
}
