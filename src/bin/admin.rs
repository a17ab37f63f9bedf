//! CLI administration tool for hashid-shortener.
//!
//! Runs the same operations as the admin HTTP endpoints directly against the configured
//! storage backend, plus offline token encoding for debugging.
//!
//! # Usage
//!
//! ```bash
//! # Inspect an entry
//! cargo run --bin admin -- details k5Y
//!
//! # Delete an entry (asks for confirmation)
//! cargo run --bin admin -- delete k5Y
//!
//! # Remove expired entries
//! cargo run --bin admin -- sweep
//!
//! # Translate between ids and tokens (no storage connection)
//! cargo run --bin admin -- encode 42
//! cargo run --bin admin -- decode k5Y
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `HASHIDS_SALT`, `STORAGE_BACKEND` and the backend URL.

use hashid_shortener::application::services::ShortenerService;
use hashid_shortener::config::{self, Config};
use hashid_shortener::domain::entities::{Validity, now_millis};
use hashid_shortener::infrastructure::persistence;
use hashid_shortener::server::build_service;
use hashid_shortener::utils::hash_id::HashIdCodec;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing hashid-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored entry behind a token
    Details { token: String },

    /// Delete the entry behind a token
    Delete {
        token: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Remove entries whose validity window has ended
    Sweep,

    /// Show entry count and service settings
    Stats,

    /// Check storage and encoder health
    Health,

    /// Encode a numeric id into a token
    Encode { id: i64 },

    /// Decode a token into its numeric id
    Decode { token: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Details { token } => show_details(&connect(&config).await?, &token).await?,
        Commands::Delete { token, yes } => delete(&connect(&config).await?, &token, yes).await?,
        Commands::Sweep => sweep(&connect(&config).await?).await?,
        Commands::Stats => show_stats(&connect(&config).await?).await?,
        Commands::Health => health(&connect(&config).await?).await?,
        Commands::Encode { id } => encode(&codec(&config)?, id)?,
        Commands::Decode { token } => decode(&codec(&config)?, &token)?,
    }

    Ok(())
}

fn codec(config: &Config) -> Result<HashIdCodec> {
    HashIdCodec::new(&config.hashids_salt, config.hashids_min_length)
        .context("Invalid hashids configuration")
}

async fn connect(config: &Config) -> Result<ShortenerService> {
    let repository = persistence::connect(config)
        .await
        .with_context(|| format!("Failed to connect to {} storage", config.storage_backend))?;
    build_service(config, repository)
}

fn encode(codec: &HashIdCodec, id: i64) -> Result<()> {
    let token = codec.encode(id)?;
    println!(
        "  {} → {}",
        id.to_string().bright_black(),
        token.bright_yellow().bold()
    );
    Ok(())
}

fn decode(codec: &HashIdCodec, token: &str) -> Result<()> {
    let id = codec.decode(token)?;
    println!(
        "  {} → {}",
        token.bright_yellow(),
        id.to_string().bright_white().bold()
    );
    Ok(())
}

/// Prints the entry behind a token.
///
/// ```text
/// 🔎 Entry k5Y
///
///   Id:         42
///   URL:        https://example.com/
///   Valid from: -
///   Valid till: 1767225600000
///   Status:     ACTIVE
/// ```
async fn show_details(service: &ShortenerService, token: &str) -> Result<()> {
    let entry = service.details(token).await?;

    println!("{}", format!("🔎 Entry {token}").bright_blue().bold());
    println!();
    println!("  Id:         {}", entry.id.to_string().bright_black());
    println!("  URL:        {}", entry.url.cyan());
    println!("  Valid from: {}", format_bound(entry.valid_from));
    println!("  Valid till: {}", format_bound(entry.valid_till));

    let status = match entry.status_at(now_millis()) {
        Validity::Active => "ACTIVE".green(),
        Validity::NotYetActive => "NOT YET ACTIVE".yellow(),
        Validity::Expired => "EXPIRED".red(),
    };
    println!("  Status:     {status}");
    println!();

    Ok(())
}

fn format_bound(bound: Option<i64>) -> String {
    bound.map_or_else(|| "-".to_string(), |ms| ms.to_string())
}

async fn delete(service: &ShortenerService, token: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Entry".bright_blue().bold());
    println!();

    let entry = service.details(token).await?;
    println!("  Token: {}", token.bright_yellow());
    println!("  URL:   {}", entry.url.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this entry?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let id = service.delete(token).await?;

    println!();
    println!(
        "{} (id {})",
        "✅ Entry deleted".green().bold(),
        id.to_string().bright_black()
    );
    println!();

    Ok(())
}

async fn sweep(service: &ShortenerService) -> Result<()> {
    println!("{}", "🧹 Removing expired entries...".bright_blue());

    let removed = service.sweep_expired().await?;

    println!(
        "{} {}",
        "✅ Removed:".green().bold(),
        removed.to_string().bright_white().bold()
    );

    Ok(())
}

async fn show_stats(service: &ShortenerService) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = service.stats().await?;

    println!(
        "  Entries:        {}",
        stats.total_urls.to_string().bright_green().bold()
    );
    println!("  Storage:        {}", stats.storage_backend.bright_white());
    println!("  Min length:     {}", stats.min_length);
    println!(
        "  Multi-instance: {}",
        if stats.multi_instance { "yes" } else { "no" }
    );
    println!(
        "  Context path:   {}",
        if stats.context_path.is_empty() {
            "/"
        } else {
            &stats.context_path
        }
    );
    println!();

    Ok(())
}

async fn health(service: &ShortenerService) -> Result<()> {
    println!("{}", "🔍 Checking health...".bright_blue());

    let report = service.health().await;
    print_check("Storage", &report.storage);
    print_check("Encoder", &report.encoder);

    if !report.is_healthy() {
        anyhow::bail!("Service is unhealthy");
    }

    println!("{}", "✅ All checks passed".green().bold());
    Ok(())
}

fn print_check(name: &str, result: &Result<(), String>) {
    match result {
        Ok(()) => println!("  {:<8} {}", name, "OK".green()),
        Err(reason) => println!(
            "  {:<8} {} {}",
            name,
            "FAILED".red().bold(),
            reason.bright_black()
        ),
    }
}
