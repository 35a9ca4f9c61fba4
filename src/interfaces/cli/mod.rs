//! CLI command execution
//!
//! Link commands talk to the store directly, so they work whether or not a
//! server is running against the same database.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cache::{NullUrlCache, UrlCache};
use crate::cli::Commands;
use crate::config::AppConfig;
use crate::errors::LinktallyError;
use crate::services::{AnalyticsService, LinkService};
use crate::storage::StorageFactory;
use commands::{add_link, config_generate, list_links, show_stats};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinktallyError> for CliError {
    fn from(err: LinktallyError) -> Self {
        match err {
            LinktallyError::StoreUnavailable(_) | LinktallyError::DatabaseConfig(_) => {
                CliError::StorageError(err.to_string())
            }
            LinktallyError::Validation(_)
            | LinktallyError::InvalidUrlFormat(_)
            | LinktallyError::InvalidAliasFormat(_) => CliError::ParseError(err.to_string()),
            _ => CliError::CommandError(err.to_string()),
        }
    }
}

/// Run every subcommand except `serve`
pub async fn run_cli_command(cmd: Commands, config: &AppConfig) -> Result<(), CliError> {
    if let Commands::ConfigGen { output_path, force } = cmd {
        return config_generate(output_path, force).await;
    }

    let store = StorageFactory::create(&config.database, config.analytics.max_retained_clicks)
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    // CLI 不预热缓存：进程马上退出
    let cache: Arc<dyn UrlCache> = Arc::new(NullUrlCache);

    match cmd {
        Commands::Add { args, expires_in } => {
            let (alias, url) = Commands::parse_add_args(&args);
            let links = LinkService::new(store, cache, &config.links, config.cache.default_ttl);
            add_link(&links, alias, url, expires_in, &config.server.base_url).await
        }
        Commands::List {
            page,
            limit,
            sort_by,
            order,
        } => {
            let links = LinkService::new(store, cache, &config.links, config.cache.default_ttl);
            list_links(&links, page, limit, &sort_by, &order).await
        }
        Commands::Stats { code, json } => {
            let analytics = AnalyticsService::new(store, config.analytics.recent_limit);
            show_stats(&analytics, &code, json).await
        }
        Commands::Serve | Commands::ConfigGen { .. } => Err(CliError::CommandError(
            "not a CLI command".to_string(),
        )),
    }
}
