use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use news_site::lifecycle::load_site_config;
use news_site::lifecycle::startup::load_route_table;
use news_site::policy::cache_control::cache_control;

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Inspection CLI for the news site server", long_about = None)]
struct Cli {
    /// Base URL of a running server
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Admin API key
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the route table offline and print every route with its policy
    Check {
        /// Path to the site configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check server status
    Status,
    /// List the active route table
    Routes,
    /// Inspect render cache occupancy
    Cache,
    /// Drop every cached page
    Purge,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let client = reqwest::Client::new();
    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let request = match cli.command {
        Commands::Check { config } => return check(config.as_deref()),
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Routes => client.get(format!("{}/admin/routes", cli.url)),
        Commands::Cache => client.get(format!("{}/admin/cache", cli.url)),
        Commands::Purge => client.post(format!("{}/admin/cache/purge", cli.url)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

fn check(config: Option<&std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_site_config(config)?;
    let table = load_route_table(&config)?;

    println!("{} ({} routes from {})", config.site.name, table.len(), config.routes_path.0);
    for entry in table.entries() {
        println!(
            "  {:<32} {:<20} {:<18} {}",
            entry.pattern.to_string(),
            entry.descriptor.component.to_string(),
            entry.policy.to_string(),
            cache_control(&entry.policy)
        );
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("admin API returned status {}: {}", status, text).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
