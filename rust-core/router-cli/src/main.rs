//! las-router - route a natural-language well-log request to an analysis tool
//!
//! Prints the clarification decision or the processed response envelope
//! as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use las_router::config::CatalogKind;
use las_router::observability::setup_logging;
use las_router::security::validate_query;
use las_router::{Action, ModelConfig, QueryRouter, RouterConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum ActionArg {
    CheckClarification,
    ProcessQuery,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::CheckClarification => Action::CheckClarification,
            ActionArg::ProcessQuery => Action::ProcessQuery,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum CatalogArg {
    Static,
    StaticExtended,
    Discovered,
    Command,
}

impl From<CatalogArg> for CatalogKind {
    fn from(arg: CatalogArg) -> Self {
        match arg {
            CatalogArg::Static => CatalogKind::Static,
            CatalogArg::StaticExtended => CatalogKind::StaticExtended,
            CatalogArg::Discovered => CatalogKind::Discovered,
            CatalogArg::Command => CatalogKind::Command,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "las-router", version, about = "Route well-log analysis requests to tools")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured tool catalog source
    #[arg(long, value_enum)]
    catalog: Option<CatalogArg>,

    /// Run the selected script instead of only planning it
    #[arg(long)]
    execute: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Dump Prometheus metrics to stderr when done
    #[arg(long)]
    metrics: bool,

    #[arg(value_enum)]
    action: ActionArg,

    query: String,

    /// Provider/model selection as a JSON object; malformed input falls back to defaults
    model_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => match RouterConfig::load(path) {
            Ok(config) => config.with_env_overrides(),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Configuration file rejected");
                return Err(e).with_context(|| format!("loading {}", path.display()));
            }
        },
        None => RouterConfig::from_env(),
    };
    if let Some(catalog) = cli.catalog {
        config.catalog = catalog.into();
    }
    config.execute |= cli.execute;

    let model = cli
        .model_config
        .as_deref()
        .map(ModelConfig::parse_lenient)
        .unwrap_or_default();
    let valid_query = validate_query(&cli.query, config.max_query_length).is_ok();

    let router = QueryRouter::new(config)
        .context("building router")?
        .with_model_config(&model);

    let action = Action::from(cli.action);
    tracing::debug!(%action, "Dispatching request");
    let output = match action {
        Action::CheckClarification => {
            serde_json::to_string_pretty(&router.check_clarification(&cli.query).await)?
        }
        Action::ProcessQuery => {
            serde_json::to_string_pretty(&router.process_query(&cli.query).await)?
        }
    };
    println!("{}", output);

    if cli.metrics {
        eprintln!("{}", router.metrics().export()?);
    }

    Ok(if valid_query {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
