use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use issue_autocomplete::SearchClient;
use reqwest::Client;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "issue-search-cli")]
#[command(about = "Issue search client", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    /// Session token sent as a bearer credential
    #[arg(short, long, env = "ISSUE_AC_TOKEN")]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search issues
    Search {
        #[arg(value_name = "TERM")]
        term: String,

        /// Endpoint path
        #[arg(short, long, default_value = "/plugin/issue-search")]
        path: String,

        /// Separator between printed fields
        #[arg(short, long, default_value = " | ")]
        separator: String,

        /// Print raw JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the widget settings the server embeds into pages
    Settings,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Search {
            term,
            path,
            separator,
            json,
        } => {
            let mut client = SearchClient::new(format!("{}{}", cli.endpoint, path), timeout)?;
            if let Some(token) = &cli.token {
                client = client.with_session_token(token);
            }

            let records = client
                .search(&term)
                .await
                .with_context(|| format!("search for {:?} failed", term))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No issues found");
            } else {
                for record in records {
                    println!(
                        "{}",
                        [record.id, record.project, record.status, record.summary].join(&separator)
                    );
                }
            }
        }

        Commands::Settings => {
            let client = Client::builder().timeout(timeout).build()?;
            let mut request = client.get(format!("{}/widget/settings", cli.endpoint));
            if let Some(token) = &cli.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                bail!("server returned {}", response.status());
            }
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let client = Client::builder().timeout(timeout).build()?;
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
