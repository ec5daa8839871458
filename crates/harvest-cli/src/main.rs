use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use harvest_client::{ReqwestFetcher, ScraperSelector};
use harvest_core::{ExportFormat, HarvestOutcome, HarvestRequest, HarvestService};

#[derive(Parser)]
#[command(name = "harvest", version, about = "Pull tables and text out of web pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and extract every element with the given tag
    Extract {
        /// Page to fetch
        #[arg(short, long)]
        url: String,

        /// Tag name to select, e.g. "table", "p", "h2"
        #[arg(short, long)]
        tag: String,

        /// Export format for tables: csv, excel or pdf
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Where to write the result. Exports default to tables_separate.<ext>,
        /// text goes to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the supported export formats
    Formats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("harvest=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            url,
            tag,
            format,
            output,
        } => {
            cmd_extract(url, tag, format, output.as_deref()).await?;
        }
        Commands::Formats => {
            for format in ExportFormat::ALL {
                println!("{format}\t{}", format.file_name());
            }
        }
    }

    Ok(())
}

async fn cmd_extract(
    url: String,
    tag: String,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    // Loopback and LAN targets are allowed from the command line.
    let fetcher = ReqwestFetcher::new()
        .and_then(ReqwestFetcher::allow_private_urls)
        .context("Failed to create HTTP client")?;
    let service = HarvestService::new(fetcher, ScraperSelector::new());

    let request = HarvestRequest {
        url,
        tag,
        format: Some(format),
    };

    tracing::info!(url = %request.url, tag = %request.tag, "Harvesting");

    let outcome = service.harvest(&request).await.map_err(|e| {
        tracing::debug!("{e}");
        anyhow::anyhow!(e.user_message())
    })?;

    match outcome {
        HarvestOutcome::Text(text) => match output {
            Some(path) => write_file(path, text.as_bytes())?,
            None => println!("{text}"),
        },
        HarvestOutcome::Export(artifact) => {
            let path = output.unwrap_or_else(|| Path::new(artifact.file_name));
            write_file(path, &artifact.bytes)?;
        }
    }

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
