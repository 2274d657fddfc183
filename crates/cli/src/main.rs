//! brandscout CLI - command-line interface for the domain search engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8177";

#[derive(Parser)]
#[command(name = "brandscout")]
#[command(about = "brandscout domain search CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "BRANDSCOUT_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new search
    Search {
        /// Business name
        #[arg(short, long)]
        business_name: String,

        /// Preferred TLDs, comma-separated (e.g. com,io,co)
        #[arg(short, long, default_value = "com")]
        tlds: String,

        /// Stylistic vibe (e.g. "playful", "modern")
        #[arg(short, long)]
        vibe: String,

        /// Optional seed domain idea
        #[arg(long)]
        domain_idea: Option<String>,

        /// Optional extra keywords
        #[arg(long)]
        keywords: Option<String>,

        /// Email to notify when results are ready
        #[arg(long)]
        email: Option<String>,

        /// Client id to attribute this search to
        #[arg(short, long, default_value = "cli")]
        client_id: String,
    },

    /// Show status for a job
    Status {
        /// Job id
        job_id: String,
    },

    /// Show ranked results for a job
    Results {
        /// Job id
        job_id: String,
    },

    /// Cancel a running job
    Cancel {
        /// Job id
        job_id: String,
    },

    /// List recently created jobs
    Recent {
        /// Number of jobs to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct SearchStarted {
    job_id: String,
    status: String,
}

#[derive(Deserialize, Tabled)]
struct RankedDomainRow {
    domain: String,
    score: f64,
    #[tabled(display_with = "display_price")]
    price_cents: Option<i64>,
    pricing_category: String,
}

fn display_price(price: &Option<i64>) -> String {
    match price {
        Some(cents) => format!("${:.2}", *cents as f64 / 100.0),
        None => "-".to_string(),
    }
}

#[derive(Deserialize, Tabled)]
struct RecentJobRow {
    job_id: String,
    client_id: String,
    status: String,
    batch_num: i64,
    good_results: i64,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("failed to connect to daemon")?
        .json()
        .await
        .context("failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("no result in response"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            business_name,
            tlds,
            vibe,
            domain_idea,
            keywords,
            email,
            client_id,
        } => {
            let tld_preferences: Vec<String> = tlds.split(',').map(|s| s.trim().to_string()).collect();
            let params = json!({
                "client_id": client_id,
                "quiz_responses": {
                    "business_name": business_name,
                    "tld_preferences": tld_preferences,
                    "vibe": vibe,
                    "domain_idea": domain_idea,
                    "keywords": keywords,
                    "client_email": email,
                },
            });

            let result = call_rpc(&cli.rpc_url, "registry.search", params).await?;
            let started: SearchStarted = serde_json::from_value(result)?;

            println!("{}", "Search started".green().bold());
            println!();
            println!("{}", Table::new(vec![started]));
        }

        Commands::Status { job_id } => {
            let params = json!({ "job_id": job_id });
            let result = call_rpc(&cli.rpc_url, "search.status", params).await?;

            println!("{}", format!("Status for {job_id}").cyan().bold());
            println!();
            println!("  {} {}", "Status:".bold(), result["status"]);
            println!("  {} {}", "Batch:".bold(), result["batch_num"]);
            println!("  {} {}", "Checked:".bold(), result["domains_checked"]);
            println!("  {} {}", "Available:".bold(), result["domains_available"]);
            println!("  {} {}", "Good results:".bold(), result["good_results"]);
            if let Some(err) = result.get("error").and_then(|v| v.as_str()) {
                println!("  {} {}", "Error:".bold().red(), err);
            }
        }

        Commands::Results { job_id } => {
            let params = json!({ "job_id": job_id });
            let result = call_rpc(&cli.rpc_url, "search.results", params).await?;

            let domains: Vec<RankedDomainRow> = result["domains"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect();

            if domains.is_empty() {
                println!("{}", "No results yet".yellow());
            } else {
                println!("{}", Table::new(domains));
            }
        }

        Commands::Cancel { job_id } => {
            let params = json!({ "job_id": job_id });
            call_rpc(&cli.rpc_url, "search.cancel", params).await?;
            println!("{}", format!("Job {job_id} cancelled").green().bold());
        }

        Commands::Recent { limit } => {
            let params = json!({ "limit": limit });
            let result = call_rpc(&cli.rpc_url, "registry.recent", params).await?;

            let rows: Vec<RecentJobRow> = result
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect();

            if rows.is_empty() {
                println!("{}", "No jobs yet".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}
