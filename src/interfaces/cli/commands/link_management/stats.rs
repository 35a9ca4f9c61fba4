//! Link analytics command

use std::collections::BTreeMap;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::AnalyticsService;

pub async fn show_stats(
    analytics: &AnalyticsService,
    code: &str,
    json: bool,
) -> Result<(), CliError> {
    let stats = analytics.link_analytics(code).await?;

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "{} -> {}",
        stats.link.code.cyan().bold(),
        stats.link.original_url.blue().underline()
    );
    println!("  total clicks: {}", stats.link.total_clicks.to_string().green());
    if let Some(last) = stats.link.last_accessed {
        println!("  last access:  {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    print_counts("By country", &stats.analytics.by_country);
    print_counts("By city", &stats.analytics.by_city);
    print_counts("By date", &stats.analytics.by_date);

    if !stats.analytics.recent.is_empty() {
        println!();
        println!("{}", "Recent clicks:".bold());
        for click in &stats.analytics.recent {
            println!(
                "  {}  {} / {}  {}",
                click.timestamp.format("%Y-%m-%d %H:%M:%S"),
                click.country.as_deref().unwrap_or("-"),
                click.city.as_deref().unwrap_or("-"),
                click.referer.as_deref().unwrap_or("").dimmed()
            );
        }
    }
    Ok(())
}

fn print_counts(title: &str, counts: &BTreeMap<String, u64>) {
    if counts.is_empty() {
        return;
    }
    println!();
    println!("{}", format!("{}:", title).bold());

    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (bucket, count) in rows {
        println!("  {:<24} {}", bucket, count);
    }
}
