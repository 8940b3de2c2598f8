//! jumbo-facets command line entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use jumbo_facets::application::{FilterPipeline, SiteProbe, report};
use jumbo_facets::infrastructure::{AppConfig, ConfigManager, LoggingConfig, init_logging_with_config};

#[derive(Debug, Parser)]
#[command(name = "jumbo-facets", version, about = "Extract categories and filters from the Jumbo store")]
struct Cli {
    /// Configuration file (default: config/config.yaml, then the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Force DEBUG logging
    #[arg(short, long)]
    verbose: bool,

    /// Fetch the site root and check it belongs to the site
    #[arg(long, conflicts_with_all = ["site_info", "validate_content", "offline_html"])]
    test_connection: bool,

    /// Print length, title and status of the site root
    #[arg(long, conflicts_with_all = ["validate_content", "offline_html"])]
    site_info: bool,

    /// Fetch the site root and run the content validation
    #[arg(long, conflicts_with = "offline_html")]
    validate_content: bool,

    /// Extract filters from a saved category page instead of fetching
    #[arg(long, value_name = "FILE")]
    offline_html: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    manager
        .load_config()
        .with_context(|| format!("Invalid configuration in {}", manager.config_path().display()))
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 Interrupt received, finishing the current category");
            cancel.cancel();
        }
    });
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;

    let mut logging = LoggingConfig::from_app_config(&config)?;
    if cli.verbose {
        logging = logging.verbose();
    }
    let _guard = init_logging_with_config(&logging)?;
    info!("🛒 jumbo-facets {} targeting {}", env!("CARGO_PKG_VERSION"), config.site_url);

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());
    let pipeline = FilterPipeline::from_config(&config, cancel.clone())?;

    if let Some(path) = &cli.offline_html {
        let html = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filters = pipeline.extract_filters_from_html(&html)?;
        println!("📄 {} filters in {}:", filters.len(), path.display());
        for filter in &filters {
            println!("  - {}", filter.name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let probe = SiteProbe::new(pipeline.client(), config.site_url.clone(), config.site_identity.clone());

    if cli.test_connection {
        let ok = probe.test_connection().await;
        println!("{}", if ok { "✅ Connection OK" } else { "❌ Connection failed" });
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    if cli.site_info {
        let info = probe.site_info().await;
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(ExitCode::SUCCESS);
    }

    if cli.validate_content {
        let valid = probe.validate_site_content().await;
        println!("{}", if valid { "✅ Content is valid" } else { "❌ Content is not valid" });
        return Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let categories = pipeline
        .categories()
        .await
        .context("Could not obtain the category list")?;
    let results = pipeline.run(&categories).await;
    if cancel.is_cancelled() {
        warn!("⚠️ Run interrupted, writing {} of {} categories", results.len(), categories.len());
    }

    report::write_reports(&config.output_file, &config.json_output_file(), &results).await?;
    if !report::validate_report(&config.output_file).await? {
        error!("❌ Written report failed validation: {}", config.output_file.display());
        return Ok(ExitCode::FAILURE);
    }

    info!("🎉 Done: {}", config.output_file.display());
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {:#}", e);
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}
