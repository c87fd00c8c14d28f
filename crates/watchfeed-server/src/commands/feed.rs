use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use serde_json::json;
use watchfeed_config::Config;

use super::{build_service, resolve_username, star_glyphs};

pub async fn run_feed(config: &Config, username: Option<String>, no_posters: bool, output: &Output) -> Result<()> {
    let username = resolve_username(username, config)?;
    let service = build_service(config, !no_posters)?;

    let now = Utc::now();
    let records = service.recent_watches(&username, now).await?;

    if !output.is_human() {
        output.data(&json!({
            "items": records,
            "timestamp": now.timestamp_millis(),
            "fetchedAt": now.to_rfc3339(),
        }))?;
        return Ok(());
    }

    if records.is_empty() {
        output.warn(format!("No film watches in {}'s feed", username));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Watched").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("Rating").add_attribute(Attribute::Bold),
        Cell::new("Poster").add_attribute(Attribute::Bold),
    ]);
    for record in &records {
        table.add_row(vec![
            Cell::new(record.watched_date.format("%Y-%m-%d")),
            Cell::new(&record.title).fg(Color::Cyan),
            Cell::new(record.year),
            Cell::new(record.rating.map(star_glyphs).unwrap_or_default()).fg(Color::Yellow),
            Cell::new(if record.poster_url.is_some() { "✓" } else { "" }),
        ]);
    }

    output.info(format!("Recent watches for {}", username));
    output.table(table);
    Ok(())
}
