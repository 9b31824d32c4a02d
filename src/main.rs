//! WS-Trust response inspector.
//!
//! Run with: `wstrust-inspect --config config.yaml response.xml`

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wstrust_response::{GrantType, ParsedResponse, ResponseParser, TokenType, WsTrustConfig};

/// Parse a WS-Trust STS response and report the token it carries.
///
/// Exits non-zero when the response is a fault or carries no usable token.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the STS response (SOAP envelope)
    input: PathBuf,

    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    token_type: TokenType,
    grant_type: GrantType,
    token: &'a str,
}

impl<'a> From<&'a ParsedResponse> for Summary<'a> {
    fn from(response: &'a ParsedResponse) -> Self {
        Self {
            token_type: response.token_type(),
            grant_type: response.grant_type(),
            token: response.token(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // Load configuration
    let config = if args.config.exists() {
        let content = std::fs::read_to_string(&args.config)
            .with_context(|| format!("Failed to read config file {}", args.config.display()))?;
        WsTrustConfig::from_yaml(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        WsTrustConfig::default()
    };

    let body = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read response {}", args.input.display()))?;

    let parser = ResponseParser::new(config);
    let response = parser
        .parse_bytes(&body)
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))
        .with_context(|| format!("Rejected STS response {}", args.input.display()))?;

    info!(
        token_type = %response.token_type(),
        grant_type = %response.grant_type(),
        token_len = response.token().len(),
        "Token extracted"
    );

    match args.format {
        OutputFormat::Text => {
            println!("token_type: {}", response.token_type());
            println!("grant_type: {}", response.grant_type());
            println!("token: {}", response.token());
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&Summary::from(&response))
                .context("Failed to render summary")?;
            print!("{}", yaml);
        }
    }

    Ok(())
}
