use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use std::path::Path;
use watchfeed_config::Config;

pub fn run_config(cmd: ConfigCommands, config: &Config, config_path: &Path, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(config, config_path, full, output),
        ConfigCommands::Init { force } => init_config(config_path, force, output),
    }
}

fn show_config(config: &Config, config_path: &Path, full: bool, output: &Output) -> Result<()> {
    let mut shown = config.clone();
    if !full {
        shown.tmdb.api_key = shown.tmdb.api_key.as_deref().map(mask_string);
    }

    if !output.is_human() {
        output.data(&shown)?;
        return Ok(());
    }

    if !config_path.exists() {
        output.warn(format!(
            "No config file at {}; showing defaults. Run 'watchfeed config init' to create one.",
            config_path.display()
        ));
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(config_path.display().to_string()).add_attribute(Attribute::Bold),
    ]);
    let rows: Vec<(&str, String)> = vec![
        ("server.host", shown.server.host.clone()),
        ("server.port", shown.server.port.to_string()),
        ("letterboxd.username", display_or_unset(&shown.letterboxd.username)),
        ("letterboxd.base_url", shown.letterboxd.base_url.clone()),
        ("letterboxd.feed_limit", shown.letterboxd.feed_limit.to_string()),
        ("letterboxd.timeout_secs", shown.letterboxd.timeout_secs.to_string()),
        ("tmdb.enabled", enabled_mark(shown.tmdb.enabled)),
        ("tmdb.api_key", display_or_unset(shown.tmdb.api_key.as_deref().unwrap_or(""))),
        ("tmdb.base_url", shown.tmdb.base_url.clone()),
        ("tmdb.image_base_url", shown.tmdb.image_base_url.clone()),
        ("tmdb.timeout_secs", shown.tmdb.timeout_secs.to_string()),
        ("tmdb.concurrency", shown.tmdb.concurrency.to_string()),
        ("analytics.recent_limit", shown.analytics.recent_limit.to_string()),
        (
            "analytics.feed_limit",
            shown
                .analytics
                .feed_limit
                .map(|n| n.to_string())
                .unwrap_or_else(|| "whole feed".to_string()),
        ),
        ("logging.level", shown.logging.level.clone()),
        ("logging.json", enabled_mark(shown.logging.json)),
        (
            "logging.file",
            shown
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stderr".to_string()),
        ),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    output.table(table);
    Ok(())
}

fn init_config(config_path: &Path, force: bool, output: &Output) -> Result<()> {
    if config_path.exists() && !force {
        output.warn(format!(
            "Config file already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(config_path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", config_path.display(), e))?;
    output.success(format!("Wrote default configuration to {}", config_path.display()));
    output.info("Set letterboxd.username and TMDB_API_KEY (or tmdb.api_key) before serving.");
    Ok(())
}

fn enabled_mark(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn display_or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".bright_black().to_string()
    } else {
        value.to_string()
    }
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
