//! # Sales Assistant CLI
//!
//! Command-line entry point for the sales assistant pipeline.
//!
//! ## Subcommands
//!
//! - `serve`: Run the HTTP API (the default when no subcommand is given)
//! - `analyze`: Run one analysis and print the report as JSON
//! - `scrape`: Scrape one company website and print the extracted record
//!
//! Every option can also be set through the environment, and a `.env` file in
//! the working directory is loaded before parsing.

mod telemetry;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use sales_assistant::analysis::AnalysisService;
use sales_assistant::insight::InsightGenerator;
use sales_assistant::model::{self, DEFAULT_MODEL, DEFAULT_REQUESTS_PER_MINUTE, OpenAiSettings};
use sales_assistant::request::{AnalysisForm, validate_request};
use sales_assistant::scraper::{ScraperConfig, ScraperService};
use sales_assistant::server::{self, ServerConfig};
use telemetry::TelemetryOptions;
use tracing::{info, instrument};

#[derive(Parser)]
#[command(author, version, about = "Company research and sales strategy assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    server: ServerArgs,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Analyze a company for a product and print the report
    Analyze(AnalyzeArgs),

    /// Scrape a company website and print the extracted information
    Scrape(ScrapeArgs),
}

#[derive(Args, Debug)]
struct ServerArgs {
    /// Address to bind
    #[arg(long, global = true, env = "SALES_ASSISTANT_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind
    #[arg(long, global = true, env = "SALES_ASSISTANT_PORT", default_value = "8000")]
    port: u16,

    /// Browser origin allowed by CORS (repeatable)
    #[arg(
        long,
        global = true,
        env = "SALES_ASSISTANT_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    allowed_origin: Vec<String>,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// OpenAI API key
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    /// Chat model to use
    #[arg(long, global = true, env = "SALES_ASSISTANT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Completion requests allowed per minute
    #[arg(long, global = true, env = "SALES_ASSISTANT_LLM_RPM", default_value_t = DEFAULT_REQUESTS_PER_MINUTE)]
    llm_requests_per_minute: u32,

    /// Lifetime of cached company records and responses in seconds
    #[arg(long, global = true, env = "SALES_ASSISTANT_CACHE_TTL_SECS", default_value = "3600")]
    cache_ttl_secs: u64,

    /// Maximum number of company records kept in memory
    #[arg(long, global = true, env = "SALES_ASSISTANT_CACHE_CAPACITY", default_value = "100")]
    cache_capacity: usize,

    /// Minimum interval between outbound fetches in milliseconds
    #[arg(long, global = true, env = "SALES_ASSISTANT_RATE_LIMIT_MS", default_value = "1000")]
    rate_limit_ms: u64,

    /// Directory for the on-disk response cache
    #[arg(
        long,
        global = true,
        env = "SALES_ASSISTANT_HTTP_CACHE_DIR",
        default_value = ".sales-assistant/http-cache"
    )]
    http_cache_dir: PathBuf,

    /// Disable the on-disk response cache
    #[arg(long, global = true, env = "SALES_ASSISTANT_NO_HTTP_CACHE")]
    no_http_cache: bool,

    /// Timeout for a single website fetch in seconds
    #[arg(long, global = true, env = "SALES_ASSISTANT_REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true, env = "SALES_ASSISTANT_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Export traces and metrics over OTLP
    #[arg(long, global = true, env = "SALES_ASSISTANT_OTLP")]
    otlp: bool,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Company website to research
    #[arg(long)]
    company_url: String,

    /// Product name
    #[arg(long)]
    product_name: String,

    /// Product description
    #[arg(long)]
    product_description: String,

    /// Product price
    #[arg(long)]
    price: String,

    /// Competitor hosts, comma-separated
    #[arg(long)]
    competitors: Option<String>,

    /// Free-form notes for the strategy
    #[arg(long)]
    additional_notes: Option<String>,

    /// Company identifier to echo into the report
    #[arg(long)]
    company_id: Option<String>,

    /// Product identifier to echo into the report
    #[arg(long)]
    product_id: Option<String>,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// URL to scrape
    #[arg(required = true)]
    url: String,
}

impl CommonArgs {
    fn scraper_config(&self) -> ScraperConfig {
        let ttl = Duration::from_secs(self.cache_ttl_secs);
        ScraperConfig::builder()
            .cache_ttl(ttl)
            .cache_capacity(self.cache_capacity)
            .rate_limit_ms(self.rate_limit_ms)
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .http_cache_dir((!self.no_http_cache).then(|| self.http_cache_dir.clone()))
            .http_cache_ttl(ttl)
            .build()
    }

    fn openai_settings(&self) -> anyhow::Result<OpenAiSettings> {
        let api_key = self
            .openai_api_key
            .clone()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY must be set or passed with --openai-api-key"))?;
        Ok(OpenAiSettings {
            base_url: self.openai_base_url.clone(),
            model: self.model.clone(),
            requests_per_minute: self.llm_requests_per_minute,
            ..OpenAiSettings::new(api_key)
        })
    }

    fn telemetry(&self) -> TelemetryOptions {
        TelemetryOptions {
            log_dir: self.log_dir.clone(),
            otlp: self.otlp,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(&cli.common.telemetry())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve_command(cli.server, cli.common).await?,
        Commands::Analyze(args) => analyze_command(args, cli.common).await?,
        Commands::Scrape(args) => scrape_command(args, cli.common).await?,
    }

    Ok(())
}

#[instrument(skip(common))]
async fn serve_command(args: ServerArgs, common: CommonArgs) -> anyhow::Result<()> {
    let scraper = Arc::new(ScraperService::new(common.scraper_config())?);
    let client = model::new_openai(common.openai_settings()?)?;
    let service = AnalysisService::new(scraper, InsightGenerator::new(client.into_completion()));

    let config = ServerConfig {
        addr: SocketAddr::new(args.host, args.port),
        allowed_origins: args.allowed_origin,
    };
    info!("Using model {}", common.model);
    server::run_server(config, service).await
}

#[instrument(skip(common))]
async fn analyze_command(args: AnalyzeArgs, common: CommonArgs) -> anyhow::Result<()> {
    // Validate first so bad input never costs a fetch or a completion
    let request = validate_request(AnalysisForm {
        product_name: Some(args.product_name),
        product_description: Some(args.product_description),
        price: Some(args.price),
        company_url: Some(args.company_url),
        competitors: args.competitors.map(|c| c.replace(',', "\n")),
        additional_notes: args.additional_notes,
        company_id: args.company_id,
        product_id: args.product_id,
        file: None,
    })?;

    let scraper = Arc::new(ScraperService::new(common.scraper_config())?);
    let client = model::new_openai(common.openai_settings()?)?;
    let service = AnalysisService::new(scraper, InsightGenerator::new(client.into_completion()));

    let report = service.run(&request).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[instrument(skip(common))]
async fn scrape_command(args: ScrapeArgs, common: CommonArgs) -> anyhow::Result<()> {
    let scraper = ScraperService::new(common.scraper_config())?;
    let info = scraper.scrape_company_info(&args.url).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
