mod openai;
mod pipeline;
mod prompt;
mod tavily;

pub const USER_AGENT: &str = concat!("deep-research/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use openai::OpenAiClient;
use tavily::TavilyClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Answer a research question from fresh web results.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Research question to answer
    query: String,

    /// Chat model override (defaults to OPENAI_MODEL or gpt-4o-mini)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deep_research=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    if cli.query.trim().is_empty() {
        return Err("query must not be empty".into());
    }

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let tavily = TavilyClient::from_env(http.clone())?;
    let mut llm = OpenAiClient::from_env(http)?;
    if let Some(model) = cli.model {
        llm = llm.with_model(model);
    }

    info!(query = %cli.query, "starting research run");

    let state = pipeline::run(&tavily, &llm, &cli.query).await?;

    println!("{}", state.final_answer);
    Ok(())
}
