use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Command-line client for the model router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question
    Ask {
        question: String,
        /// Request category used for routing
        #[arg(short = 't', long = "type")]
        category: Option<String>,
    },
    /// Show the routing snapshot in effect
    Config,
    /// Check server liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Ask { question, category } => {
            let mut body = json!({ "question": question });
            if let Some(category) = category {
                body["type"] = Value::String(category);
            }
            let res = client.post(format!("{}/ask", base)).json(&body).send().await?;
            print_response(res).await?;
        }
        Commands::Config => {
            let res = client.get(format!("{}/config", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(stage) = res.headers().get("x-answer-stage").and_then(|v| v.to_str().ok()) {
        eprintln!("stage: {}", stage);
    }

    if status != StatusCode::OK {
        eprintln!("Error: router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
