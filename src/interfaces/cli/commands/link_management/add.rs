//! Add link command

use colored::Colorize;

use crate::api::types::short_url;
use crate::interfaces::cli::CliError;
use crate::services::{CreateLinkRequest, LinkService};

pub async fn add_link(
    links: &LinkService,
    alias: Option<String>,
    url: String,
    expires_in: Option<u64>,
    base_url: &str,
) -> Result<(), CliError> {
    let link = links
        .create_link(CreateLinkRequest {
            original_url: url,
            custom_alias: alias,
            ttl_seconds: expires_in,
        })
        .await?;

    if !link.is_custom_alias {
        println!(
            "{} Generated random code: {}",
            "ℹ".bold().blue(),
            link.code.magenta()
        );
    }

    let mut line = format!(
        "{} Added short link: {} -> {}",
        "✓".bold().green(),
        short_url(base_url, &link.code).cyan(),
        link.original_url.blue().underline()
    );
    if let Some(expires_at) = link.expires_at {
        line.push_str(&format!(
            " (expires: {})",
            expires_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .yellow()
        ));
    }
    println!("{}", line);
    Ok(())
}
