use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marketdash::{
    arguments::{enabled_debug_flags, get_cmd_args, without_logger_flags},
    charts::{ChartResolver, Timeframe},
    config::{self, CONFIG_FILE_PATH},
    logger::{self, LogLevel, LogTag},
    resources::{
        demo_fetcher, keys, refresh_interval_for, CacheSnapshot, HttpFetcher, ResourceCache,
        ResourceFetcher, CATALOGUE,
    },
};
use std::sync::Arc;

/// Logger flags (--quiet, --verbose, --log-level, --debug-<tag>,
/// --verbose-<tag>, --log-tags) are read by the logger and accepted anywhere
/// on the line.
#[derive(Parser, Debug)]
#[command(name = "marketdash")]
#[command(about = "Market dashboard data core: resource cache and chart resolver", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, default_value = CONFIG_FILE_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Subscribe to dashboard resources and log every change until ctrl-c
    Watch {
        /// Override server.base_url
        #[arg(long)]
        base_url: Option<String>,

        /// Serve canned payloads instead of calling the server
        #[arg(long)]
        demo: bool,

        /// Resource key to watch (repeatable; default: the whole catalogue)
        #[arg(long = "key")]
        keys: Vec<String>,
    },

    /// Print the chart source and external links for a symbol
    Chart {
        symbol: String,

        /// Timeframe label or interval code (5min, 30min, 1hr, Daily, Weekly)
        #[arg(long, default_value = "Daily")]
        tf: String,
    },

    /// List catalogued resource keys and their refresh intervals
    Resources,
}

#[tokio::main]
async fn main() {
    logger::init();

    let cli = Cli::parse_from(without_logger_flags(&get_cmd_args()));

    let debug_flags = enabled_debug_flags();
    if !debug_flags.is_empty() {
        logger::info(LogTag::System, &format!("Debug flags: {}", debug_flags.join(" ")));
    }

    if let Err(e) = run(cli).await {
        logger::error(LogTag::System, &format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    config::load_config_from_path(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    match cli.command {
        Command::Watch { base_url, demo, keys: selected } => watch(base_url, demo, selected).await,
        Command::Chart { symbol, tf } => chart(&symbol, &tf),
        Command::Resources => {
            list_resources();
            Ok(())
        }
    }
}

async fn watch(base_url: Option<String>, demo: bool, selected: Vec<String>) -> Result<()> {
    let cfg = config::get_config_clone();

    let fetcher: Arc<dyn ResourceFetcher> = if demo {
        logger::info(LogTag::System, "Demo mode: serving canned payloads");
        Arc::new(demo_fetcher())
    } else {
        let mut server = cfg.server.clone();
        if let Some(url) = base_url {
            server.base_url = url;
        }
        let fetcher = HttpFetcher::new(&server).context("Failed to create HTTP fetcher")?;
        logger::info(LogTag::System, &format!("Watching {}", fetcher.base_url()));
        Arc::new(fetcher)
    };

    let cache = ResourceCache::new(fetcher, &cfg.cache);

    let watched: Vec<String> = if selected.is_empty() {
        CATALOGUE
            .iter()
            .filter(|spec| spec.key != keys::POST_MARKET_RUNDOWN)
            .map(|spec| spec.key.to_string())
            .collect()
    } else {
        selected
    };

    let mut tasks = Vec::with_capacity(watched.len());
    for key in watched {
        let interval = refresh_interval_for(&key, &cfg.cache);
        let mut subscription = cache
            .subscribe(&key, interval)
            .with_context(|| format!("Failed to subscribe to {}", key))?;

        logger::info(
            LogTag::System,
            &format!(
                "Subscribed to {} ({})",
                key,
                interval.map_or("once".to_string(), |d| format!("every {}s", d.as_secs()))
            ),
        );

        tasks.push(tokio::spawn(async move {
            while let Some(snapshot) = subscription.changed().await {
                report(&snapshot);
            }
        }));
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    logger::info(LogTag::System, "Shutting down");
    for task in tasks {
        task.abort();
    }
    Ok(())
}

fn report(snapshot: &CacheSnapshot) {
    if snapshot.is_loading {
        logger::debug(LogTag::Cache, &format!("{}: loading", snapshot.key));
        return;
    }

    if let Some(error) = &snapshot.error {
        let retained = match snapshot.last_fetched_at {
            Some(at) => format!("showing data from {}", at.format("%H:%M:%S")),
            None => "no data yet".to_string(),
        };
        logger::warning(LogTag::Cache, &format!("{} ({})", error, retained));
        return;
    }

    let summary = match snapshot.data.as_deref() {
        Some(value) => match value {
            serde_json::Value::Array(items) => format!("{} items", items.len()),
            serde_json::Value::Object(fields) => format!("{} fields", fields.len()),
            other => other.to_string(),
        },
        None => "empty".to_string(),
    };
    logger::info(LogTag::Cache, &format!("{}: {}", snapshot.key, summary));

    if logger::enabled(LogTag::Cache, LogLevel::Verbose) {
        if let Some(value) = snapshot.data.as_deref() {
            logger::verbose(LogTag::Cache, &format!("{}: {}", snapshot.key, value));
        }
    }
}

fn chart(symbol: &str, tf: &str) -> Result<()> {
    let timeframe: Timeframe = tf.parse()?;
    let symbol = symbol.trim().to_uppercase();
    let resolver = ChartResolver::new(config::get_config_clone().charts);
    let overrides = resolver.overrides_for(&symbol);

    let source = resolver.resolve(&symbol, timeframe, &overrides);

    println!("{}", "=".repeat(80));
    println!("{}", source.title);
    println!("{}", "=".repeat(80));
    println!("Kind:    {:?}", source.kind);
    println!("URL:     {}", source.url);
    match resolver.preview(&symbol, &overrides) {
        Some(preview) => println!("Preview: {}", preview.url),
        None => println!("Preview: none"),
    }
    for link in resolver.external_links(&symbol, &overrides) {
        println!("{}: {}", link.label, link.url);
    }
    Ok(())
}

fn list_resources() {
    let cache_config = config::get_config_clone().cache;
    for spec in CATALOGUE {
        let interval = refresh_interval_for(spec.key, &cache_config)
            .map_or("on demand".to_string(), |d| format!("{}s", d.as_secs()));
        println!("{:<32} {:>10}  {}", spec.key, interval, spec.consumer);
    }
}
