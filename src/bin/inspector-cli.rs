use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspector-cli")]
#[command(about = "Query a running edge inspector", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show inspector status
    Status,
    /// Print recent audit lines
    Logs {
        /// Only print the last N lines
        #[arg(short, long)]
        tail: Option<usize>,
    },
    /// List stored security reports
    Reports,
    /// Submit a JSON security report from a file
    Submit { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/api/status", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Logs { tail } => {
            let res = client.get(format!("{}/api/live-logs", base)).send().await?;
            if !res.status().is_success() {
                return print_response(res).await;
            }
            let body: Value = res.json().await?;
            let lines: Vec<&str> = body["logs"]
                .as_array()
                .map(|logs| logs.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let skip = tail.map(|n| lines.len().saturating_sub(n)).unwrap_or(0);
            for line in &lines[skip..] {
                println!("{}", line);
            }
        }
        Commands::Reports => {
            let res = client.get(format!("{}/api/security-reports", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Submit { file } => {
            let report: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let res = client
                .post(format!("{}/api/security-reports", base))
                .json(&report)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: inspector returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
