use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "guard-cli")]
#[command(about = "Management CLI for chat-guard circuit breakers", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Bearer key configured on the host's admin router.
    #[arg(short, long, env = "CHAT_GUARD_API_KEY", hide_env_values = true)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate health and open circuits
    Health,
    /// Service version and overall status
    Status,
    /// Stats for every known circuit
    Circuits,
    /// Stats for one circuit
    Stats { name: String },
    /// Force a circuit back to CLOSED
    Reset { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Circuits => {
            client
                .get(format!("{}/admin/circuits", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Stats { name } => {
            client
                .get(format!("{}/admin/circuits/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Reset { name } => {
            client
                .post(format!("{}/admin/circuits/{}/reset", cli.url, name))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    // /health answers 503 with a useful body when degraded.
    if !status.is_success() && status != reqwest::StatusCode::SERVICE_UNAVAILABLE {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
