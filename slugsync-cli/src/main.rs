//! slugsync command line tool
//!
//! Previews the slug a configured pattern derives for an entry, or
//! normalizes text the way the slug input does.
//!
//! Usage:
//!   slugsync preview --config app.json --entry post.json --locale de-DE
//!   slugsync normalize --config app.json "Grüße & Co"

use anyhow::Result;
use clap::{Parser, Subcommand};
use slugsync_cli::{StaticFetcher, load_config, load_entry, load_references, normalize_text, preview};
use slugsync_model::AppConfig;
use slugsync_types::{LocaleCode, SystemDate};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "slugsync")]
#[command(about = "Derive and normalize entry slugs from slug patterns")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the slug derived for an entry
    Preview {
        /// Installation parameters (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Entry to derive the slug for (JSON)
        #[arg(short, long)]
        entry: PathBuf,

        /// Referenced entries (JSON array)
        #[arg(short, long)]
        references: Option<PathBuf>,

        /// Locale to derive the slug in
        #[arg(short, long, default_value = "en-US")]
        locale: String,

        /// Default locale of the space
        #[arg(long, default_value = "en-US")]
        default_locale: String,
    },
    /// Normalize text like a manual slug edit
    Normalize {
        /// Installation parameters (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Preview {
            config,
            entry,
            references,
            locale,
            default_locale,
        } => {
            let config = load_config(&config)?;
            let entry = load_entry(&entry)?;
            let references = match references {
                Some(path) => load_references(&path)?,
                None => StaticFetcher::default(),
            };
            info!("Loaded {} referenced entries", references.len());

            let locale = LocaleCode::parse(&locale)?;
            let default_locale = LocaleCode::parse(&default_locale)?;
            let result = preview(
                &config,
                &entry,
                Arc::new(references),
                &locale,
                &default_locale,
                &SystemDate,
            )
            .await?;

            println!("{}", result.outcome.slug);
            for gap in &result.outcome.gaps {
                eprintln!("partial: {:?}", gap);
            }
            if result.locked {
                eprintln!("note: entry is published, the live editor keeps its current slug");
            }
            if let Some(url) = result.url {
                eprintln!("preview: {}", url);
            }
        }
        Command::Normalize { config, text } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => AppConfig::default(),
            };
            println!("{}", normalize_text(&config, &text).unwrap_or_default());
        }
    }

    Ok(())
}
