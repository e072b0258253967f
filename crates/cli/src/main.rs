//! Waitroom CLI - Command-line interface for the Waitroom daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};
use thiserror::Error;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9010";
const DEFAULT_QUEUE: &str = "default";
const ALREADY_REGISTERED_CODE: i32 = 4002;

#[derive(Parser)]
#[command(name = "waitroom")]
#[command(about = "Waitroom admission queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WAITROOM_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Put a user in the wait structure
    Register {
        /// User ID
        user_id: String,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Admit the earliest waiting users
    Allow {
        /// Maximum number of users to admit
        #[arg(short = 'n', long)]
        count: u64,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Show a user's position in line
    Rank {
        /// User ID
        user_id: String,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Check whether a user has been admitted
    Admitted {
        /// User ID
        user_id: String,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Issue the admission token for a user
    Touch {
        /// User ID
        user_id: String,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Verify a presented admission token
    Verify {
        /// User ID
        user_id: String,

        /// Token to check
        token: String,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Simulate a waiting-room page visit
    Enter {
        /// User ID
        user_id: String,

        /// Token from the user's cookie, if any
        #[arg(short, long)]
        token: Option<String>,

        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
    },

    /// Show queue sizes
    Stats {
        /// Queue name
        #[arg(short, long, default_value = DEFAULT_QUEUE)]
        queue: String,
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

#[derive(Debug, Deserialize, Error)]
#[error("RPC error ({code}): {message}")]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct TouchResult {
    cookie_name: String,
    token: String,
    max_age_secs: u64,
    path: String,
}

#[derive(Deserialize, Tabled)]
struct StatsResult {
    queue: String,
    waiting: u64,
    admitted: u64,
    uptime_seconds: i64,
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
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        return Err(error.into());
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn print_rank(user_id: &str, queue: &str, rank: i64) {
    if rank > 0 {
        println!("User {} is number {} in {}", user_id, rank.to_string().bold(), queue);
    } else {
        println!("{}", format!("User {} is not waiting in {}", user_id, queue).yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Register { user_id, queue } => {
            let params = json!({ "queue": queue, "user_id": user_id });

            match call_rpc(&cli.rpc_url, "queue.register.v1", params.clone()).await {
                Ok(result) => {
                    println!("{}", "✓ Registered".green().bold());
                    print_rank(&user_id, &queue, result["rank"].as_i64().unwrap_or(-1));
                }
                Err(e)
                    if e.downcast_ref::<JsonRpcError>()
                        .is_some_and(|rpc| rpc.code == ALREADY_REGISTERED_CODE) =>
                {
                    println!("{}", "○ Already registered".yellow().bold());
                    let result = call_rpc(&cli.rpc_url, "queue.rank.v1", params).await?;
                    print_rank(&user_id, &queue, result["rank"].as_i64().unwrap_or(-1));
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Allow { count, queue } => {
            let params = json!({ "queue": queue, "count": count });

            let result = call_rpc(&cli.rpc_url, "queue.allow.v1", params).await?;

            println!(
                "{}",
                format!(
                    "✓ Admitted {} of {} requested from {}",
                    result["allowed_count"], result["requested_count"], queue
                )
                .green()
                .bold()
            );
        }

        Commands::Rank { user_id, queue } => {
            let params = json!({ "queue": queue, "user_id": user_id });

            let result = call_rpc(&cli.rpc_url, "queue.rank.v1", params).await?;
            print_rank(&user_id, &queue, result["rank"].as_i64().unwrap_or(-1));
        }

        Commands::Admitted { user_id, queue } => {
            let params = json!({ "queue": queue, "user_id": user_id });

            let result = call_rpc(&cli.rpc_url, "queue.admitted.v1", params).await?;

            if result["admitted"].as_bool().unwrap_or(false) {
                println!("{}", format!("✓ User {} is admitted", user_id).green().bold());
            } else {
                println!("{}", format!("○ User {} is not admitted", user_id).yellow());
            }
        }

        Commands::Touch { user_id, queue } => {
            let params = json!({ "queue": queue, "user_id": user_id });

            let result = call_rpc(&cli.rpc_url, "queue.touch.v1", params).await?;
            let touch_result: TouchResult = serde_json::from_value(result)?;

            println!("{}", "✓ Token issued".green().bold());
            println!();

            let table = Table::new(vec![touch_result]).to_string();
            println!("{}", table);
        }

        Commands::Verify {
            user_id,
            token,
            queue,
        } => {
            let params = json!({ "queue": queue, "user_id": user_id, "token": token });

            let result = call_rpc(&cli.rpc_url, "queue.allowed.v1", params).await?;

            if result["allowed"].as_bool().unwrap_or(false) {
                println!("{}", "✓ Token valid".green().bold());
            } else {
                println!("{}", "✗ Token invalid".red().bold());
            }
        }

        Commands::Enter {
            user_id,
            token,
            queue,
        } => {
            let params = json!({ "queue": queue, "user_id": user_id, "token": token });

            let result = call_rpc(&cli.rpc_url, "queue.enter.v1", params).await?;

            match result["status"].as_str() {
                Some("admitted") => {
                    println!("{}", format!("✓ User {} may proceed", user_id).green().bold());
                }
                _ => {
                    println!("{}", "Please wait".cyan().bold());
                    print_rank(&user_id, &queue, result["rank"].as_i64().unwrap_or(-1));
                }
            }
        }

        Commands::Stats { queue } => {
            println!("{}", "Queue Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({ "queue": queue })).await {
                Ok(result) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();

                    let stats: StatsResult = serde_json::from_value(result)?;
                    println!("{}", Table::new(vec![stats]));
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
