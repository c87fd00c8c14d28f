use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use watchfeed_config::Config;

use super::{build_service, resolve_username, star_glyphs};

const BAR_WIDTH: u32 = 30;

pub async fn run_analytics(config: &Config, username: Option<String>, output: &Output) -> Result<()> {
    let username = resolve_username(username, config)?;
    let service = build_service(config, false)?;
    let summary = service.analytics(&username, Utc::now()).await?;

    if !output.is_human() {
        output.data(&summary)?;
        return Ok(());
    }

    let mut overview = Table::new();
    overview.set_header(vec![
        Cell::new(format!("Viewing stats for {}", username))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    overview.add_row(vec![Cell::new("Films in feed"), Cell::new(summary.total_count)]);
    overview.add_row(vec![
        Cell::new("Average rating"),
        Cell::new(format!("{:.2}", summary.average_rating)),
    ]);
    overview.add_row(vec![Cell::new("This year"), Cell::new(summary.count_this_year)]);
    overview.add_row(vec![Cell::new("This month"), Cell::new(summary.count_this_month)]);
    output.table(overview);

    let peak = summary.rating_histogram.iter().map(|(_, n)| n).max().unwrap_or(0);
    let mut histogram = Table::new();
    histogram.set_header(vec![
        Cell::new("Rating").add_attribute(Attribute::Bold),
        Cell::new("Films").add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    for (rating, count) in summary.rating_histogram.iter().collect::<Vec<_>>().into_iter().rev() {
        let bar_len = if peak == 0 { 0 } else { count * BAR_WIDTH / peak };
        histogram.add_row(vec![
            Cell::new(star_glyphs(rating)).fg(Color::Yellow),
            Cell::new(count),
            Cell::new("█".repeat(bar_len as usize)).fg(Color::Green),
        ]);
    }
    output.table(histogram);

    if !summary.recent_records.is_empty() {
        let mut recent = Table::new();
        recent.set_header(vec![
            Cell::new("Watched").add_attribute(Attribute::Bold),
            Cell::new("Recent").add_attribute(Attribute::Bold),
            Cell::new("Rating").add_attribute(Attribute::Bold),
        ]);
        for record in &summary.recent_records {
            recent.add_row(vec![
                Cell::new(record.watched_date.format("%Y-%m-%d")),
                Cell::new(format!("{} ({})", record.title, record.year)),
                Cell::new(record.rating.map(star_glyphs).unwrap_or_default()),
            ]);
        }
        output.table(recent);
    }
    Ok(())
}
