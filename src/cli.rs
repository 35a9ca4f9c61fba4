//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// linktally - URL shortener with click analytics
#[derive(Parser, Debug)]
#[command(name = "linktally")]
#[command(version)]
#[command(about = "URL shortener with click analytics", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Shorten a URL directly against the store
    ///
    /// Usage: add [ALIAS] <URL>
    Add {
        /// Positional args: [alias] <url>
        #[arg(required = true, num_args = 1..=2)]
        args: Vec<String>,

        /// Seconds until the link expires
        #[arg(long)]
        expires_in: Option<u64>,
    },

    /// List short links
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 20)]
        limit: u64,

        /// createdAt, totalClicks, lastAccessed, shortCode or expiresAt
        #[arg(long, default_value = "createdAt")]
        sort_by: String,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: String,
    },

    /// Show click analytics for a short code
    Stats {
        code: String,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate an example configuration file
    ConfigGen {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Split add args into (alias, url)
    pub fn parse_add_args(args: &[String]) -> (Option<String>, String) {
        match args {
            [url] => (None, url.clone()),
            [alias, url, ..] => (Some(alias.clone()), url.clone()),
            [] => (None, String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["linktally"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "linktally",
            "--config",
            "prod.toml",
            "add",
            "docs",
            "https://example.com/docs",
            "--expires-in",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
        let Some(Commands::Add { args, expires_in }) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(expires_in, Some(60));
        assert_eq!(
            Commands::parse_add_args(&args),
            (Some("docs".to_string()), "https://example.com/docs".to_string())
        );
        assert_eq!(
            Commands::parse_add_args(&["https://example.com".to_string()]),
            (None, "https://example.com".to_string())
        );
    }

    #[test]
    fn test_add_rejects_three_args() {
        assert!(Cli::try_parse_from(["linktally", "add", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["linktally", "list"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::List {
                page: 1,
                limit: 20,
                sort_by: "createdAt".to_string(),
                order: "desc".to_string(),
            })
        );
    }
}
