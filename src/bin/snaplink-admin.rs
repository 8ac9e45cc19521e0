use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use snaplink::analytics::AnalyticsSummary;
use snaplink::config::Config;
use snaplink::links::{self, CreateLinkError};
use snaplink::models::CreateLinkRequest;
use snaplink::{seed, storage};

#[derive(Parser)]
#[command(name = "snaplink-admin")]
#[command(about = "SnapLink management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Create {
        /// Destination URL (absolute)
        url: String,
        /// Custom alias; generated when omitted
        #[arg(long)]
        alias: Option<String>,
        /// Expiration time (RFC 3339, e.g. 2026-12-31T23:59:59Z)
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
    },
    /// List all links with click counts
    List,
    /// Show click analytics for a link id
    Analytics {
        /// Link id
        id: i64,
    },
    /// Insert demo links if the database is empty
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let storage = storage::connect(&config.database).await?;

    match cli.command {
        Commands::Create {
            url,
            alias,
            expires_at,
        } => {
            let request = CreateLinkRequest {
                original_url: Some(url),
                alias,
                expires_at,
            };
            match links::create_link(storage.as_ref(), request, config.links.alias_max_length)
                .await
            {
                Ok(link) => println!("✓ Created '{}' -> {}", link.alias, link.original_url),
                Err(CreateLinkError::Validation(e)) => {
                    bail!("{}: {}", e.field.unwrap_or("request"), e.message)
                }
                Err(CreateLinkError::Conflict) => bail!("alias already exists"),
                Err(CreateLinkError::Storage(e)) => return Err(e),
            }
        }
        Commands::List => {
            let links = storage.list_links().await?;
            if links.is_empty() {
                println!("No links found.");
            } else {
                println!("{:<6} {:<20} {:<8} {}", "ID", "Alias", "Clicks", "Destination");
                println!("{}", "-".repeat(80));
                for entry in links {
                    println!(
                        "{:<6} {:<20} {:<8} {}",
                        entry.link.id, entry.link.alias, entry.clicks, entry.link.original_url
                    );
                }
            }
        }
        Commands::Analytics { id } => {
            let Some(link) = storage.get_link_by_id(id).await? else {
                bail!("no link with id {id}");
            };
            let events = storage.list_clicks(id).await?;
            let summary = AnalyticsSummary::from_events(id, &events);

            println!("{} -> {}", link.alias, link.original_url);
            println!("Total clicks: {}", summary.total_clicks);
            println!("\nDevices:");
            for d in &summary.devices {
                println!("  {:<20} {}", d.name, d.count);
            }
            println!("\nCountries:");
            for c in &summary.countries {
                println!("  {:<20} {}", c.name, c.count);
            }
            println!("\nClicks by day:");
            for day in &summary.clicks_by_day {
                println!("  {}  {}", day.date, day.clicks);
            }
        }
        Commands::Seed => {
            if seed::seed_if_empty(storage.as_ref()).await? {
                println!("✓ Seeded demo links");
            } else {
                println!("⚠ Database already contains links, nothing seeded");
            }
        }
    }

    Ok(())
}
