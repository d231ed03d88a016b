use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "backend-check")]
#[command(about = "Check that the backend API behind the dev relay is reachable", long_about = None)]
struct Cli {
    /// Backend base URL.
    #[arg(short, long, env = "DEV_RELAY_BACKEND", default_value = "http://localhost:8000")]
    url: String,

    /// Per-request timeout in seconds.
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: could not build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Testing backend connection...");
    println!("Backend URL: {}\n", base);

    println!("1. Testing /api/health endpoint...");
    match fetch_json(&client, &format!("{}/api/health", base)).await {
        Ok(body) => println!("   Health check passed: {}", body),
        Err(e) => {
            println!("   Cannot reach backend: {}", e);
            println!("\n   Please ensure the backend is running:");
            println!("   cd .. && uv run uvicorn api.app:app --reload");
            return ExitCode::FAILURE;
        }
    }

    println!("\n2. Testing /api/env-check endpoint...");
    match fetch_json(&client, &format!("{}/api/env-check", base)).await {
        Ok(body) => {
            println!("   Environment check: {}", body);
            if !api_key_present(&body) {
                println!("   Warning: OPENAI_API_KEY is not set!");
                println!("   Set it with: export OPENAI_API_KEY=your-key");
            }
        }
        Err(e) => println!("   Could not check environment: {}", e),
    }

    println!("\nBackend appears to be running correctly!");
    ExitCode::SUCCESS
}

async fn fetch_json(client: &reqwest::Client, url: &str) -> Result<Value, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await
}

fn api_key_present(body: &Value) -> bool {
    body.get("OPENAI_API_KEY_present")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
