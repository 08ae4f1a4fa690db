pub mod api;
pub mod cache;
pub mod clients;
pub mod compress;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod models;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::Config;
use gateway::Gateway;
use models::{CrawlRequest, SearchQuery};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "foray")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" | "-s" | "--serve" => run_server(config, prometheus_handle).await,

        "search" | "s" => {
            if args.len() < 3 {
                println!("Usage: foray search <query>");
                return Ok(());
            }
            let query = args[2..].join(" ");
            cmd_search(&config, &query).await
        }

        "crawl" | "c" => {
            if args.len() < 3 {
                println!("Usage: foray crawl <url>");
                return Ok(());
            }
            cmd_crawl(&config, &args[2]).await
        }

        "health" | "h" => cmd_health(&config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Foray - Query-and-Scrape Aggregation Gateway");
    println!("One HTTP surface over a meta-search backend and a page scraper");
    println!();
    println!("USAGE:");
    println!("  foray <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  serve             Start the HTTP gateway");
    println!("  search <query>    Run a one-off search against the backend");
    println!("  crawl <url>       Fetch one page as markdown");
    println!("  health            Check backend reachability");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  foray serve                           # Start the gateway");
    println!("  foray search \"rust async runtime\"     # Print search results");
    println!("  foray crawl https://example.com       # Print page markdown");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure backends, cache, and compression.");
    println!("  Set OPENROUTER_API_KEY to enable the compression pass.");
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Foray v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state(config, prometheus_handle)?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Gateway running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    info!("Gateway running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Gateway stopped");

    Ok(())
}

async fn cmd_search(config: &Config, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {}", query);

    let gateway = Gateway::from_config(config)?;
    let search = SearchQuery {
        text: query.to_string(),
        page: 1,
        categories: Vec::new(),
        time_range: None,
    };

    let gateway::GatewayResult::Raw { payload, .. } = gateway.search(&search, None).await? else {
        anyhow::bail!("unexpected compressed response");
    };

    if payload.is_empty() {
        println!("No results found for '{}'", query);
        return Ok(());
    }

    println!();
    println!("Results ({} total):", payload.len());
    println!("{:-<70}", "");

    for (i, result) in payload.iter().enumerate() {
        println!("[{}] {}", i + 1, result.title);
        println!("    {}", result.url);
        if !result.snippet.is_empty() {
            println!("    {}", result.snippet);
        }
        println!();
    }

    Ok(())
}

async fn cmd_crawl(config: &Config, url: &str) -> anyhow::Result<()> {
    let url = url::Url::parse(url).context("Invalid URL")?;

    let gateway = Gateway::from_config(config)?;
    let request = CrawlRequest {
        url,
        css_selector: None,
        wait_for: None,
        timeout: config.scrape.default_timeout_seconds,
    };

    let gateway::GatewayResult::Raw { payload, .. } = gateway.crawl(&request, None).await? else {
        anyhow::bail!("unexpected compressed response");
    };

    if let Some(title) = payload.metadata.get("title") {
        println!("Title: {}", title);
        println!("{:-<70}", "");
    }
    println!("{}", payload.markdown);
    println!();
    println!("({} links on page)", payload.links.len());

    Ok(())
}

async fn cmd_health(config: &Config) -> anyhow::Result<()> {
    let gateway = Gateway::from_config(config)?;
    let health = gateway.health().await;

    let mark = |ok: bool| if ok { "✓" } else { "✗" };
    println!("{} search backend  {}", mark(health.search), config.search.base_url);
    println!("{} scrape backend  {}", mark(health.scrape), config.scrape.base_url);

    if !health.all_ok() {
        println!();
        println!("One or more backends are unreachable. Check config.toml.");
    }

    Ok(())
}
