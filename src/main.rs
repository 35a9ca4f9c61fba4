use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use linktally::cli::{Cli, Commands};
use linktally::config::{AppConfig, DEFAULT_CONFIG_PATH};
use linktally::interfaces::cli::run_cli_command;
use linktally::runtime::lifetime::startup::install_crypto_provider;
use linktally::runtime::modes::run_server;
use linktally::system::logging::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    // config-gen 不需要加载配置
    if let Commands::ConfigGen { .. } = command {
        return finish_cli(run_cli_command(command, &AppConfig::default()).await);
    }

    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = match AppConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = install_crypto_provider() {
        eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
        return ExitCode::FAILURE;
    }

    match command {
        Commands::Serve => {
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    return ExitCode::FAILURE;
                }
            };
            match run_server(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("{:#}", e);
                    eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
                    ExitCode::FAILURE
                }
            }
        }
        command => finish_cli(run_cli_command(command, &config).await),
    }
}

fn finish_cli(result: Result<(), linktally::interfaces::cli::CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            ExitCode::FAILURE
        }
    }
}
