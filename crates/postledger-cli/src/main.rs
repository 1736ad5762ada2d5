// crates/postledger-cli/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;
use tracing_subscriber::EnvFilter;

use postledger_ingest::mapping::COLUMN_MAP;
use postledger_ingest::process_report;

/// A CLI for the post performance ingestion pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Processes one exported performance report CSV and prints a per-post
    /// summary.
    Report {
        file: PathBuf,
        /// Emit the full process result as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Lists the source columns the ingester recognizes.
    Columns,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Report { file, json } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let result = process_report(&content)
                .with_context(|| format!("failed to process {}", file.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let mut posts: Vec<_> = result.aggregated.iter().collect();
            posts.sort_by(|a, b| a.0.cmp(b.0));

            let mut table = Table::new();
            table.set_header([
                "Post ID",
                "Type",
                "Quarter",
                "Snapshots",
                "Lifetime earnings",
                "Qualified views",
                "Seconds viewed",
            ]);
            for (post_id, post) in posts {
                table.add_row([
                    post_id.clone(),
                    post.post_type.clone().unwrap_or_default(),
                    post.quarter_range.clone().unwrap_or_default(),
                    post.snapshots.len().to_string(),
                    format!("{:.2}", post.lifetime_earnings),
                    format!("{}", post.lifetime_qualified_views),
                    format!("{}", post.lifetime_seconds_viewed),
                ]);
            }
            println!("{table}");

            let meta = &result.metadata;
            println!("\n--- Report Summary ---");
            println!("  Rows processed:       {}", meta.total_rows);
            println!("  Unique posts:         {}", meta.unique_posts);
            println!("  Rows without post id: {}", meta.rows_missing_post_id);
            if let Some(range) = &meta.date_range {
                println!("  Report dates:         {} .. {}", range.start, range.end);
            }
        }
        Commands::Columns => {
            let mut table = Table::new();
            table.set_header(["Source column", "Canonical field"]);
            for (source, canonical) in COLUMN_MAP {
                table.add_row([*source, *canonical]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
