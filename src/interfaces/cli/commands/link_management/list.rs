//! List links command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::LinkService;
use crate::storage::ListQuery;

pub async fn list_links(
    links: &LinkService,
    page: u64,
    limit: u64,
    sort_by: &str,
    order: &str,
) -> Result<(), CliError> {
    let query = ListQuery::new(page, limit, sort_by.parse()?, order.parse()?);
    let result = links.list_links(&query).await?;

    if result.links.is_empty() {
        println!("{} No short links found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Short link list:".bold().green());
    println!();
    for link in &result.links {
        let mut parts = vec![format!(
            "{} -> {}",
            link.code.cyan(),
            link.original_url.blue().underline()
        )];

        if let Some(expires_at) = link.expires_at {
            let label = if link.is_expired() { "expired" } else { "expires" };
            parts.push(
                format!("({}: {})", label, expires_at.format("%Y-%m-%d %H:%M:%S UTC"))
                    .dimmed()
                    .yellow()
                    .to_string(),
            );
        }
        if link.total_clicks > 0 {
            parts.push(
                format!("(clicks: {})", link.total_clicks)
                    .dimmed()
                    .cyan()
                    .to_string(),
            );
        }
        println!("  {}", parts.join(" "));
    }
    println!();
    println!(
        "{} Page {}/{}, {} short links in total",
        "ℹ".bold().blue(),
        query.page,
        result.total_pages(query.page_size).max(1),
        result.total.to_string().green()
    );
    Ok(())
}
