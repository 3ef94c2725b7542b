//! Stats command - build the index and report on it

use anyhow::Result;
use colored::Colorize;

use super::search::load_engine;
use newsim::Config;

/// Run stats command
pub fn run(config: &Config, json: bool) -> Result<()> {
    let engine = load_engine(config)?;
    let stats = engine.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("{}", "Index Status".bold());
    println!();
    println!(
        "  {} {} articles indexed",
        "→".dimmed(),
        stats.document_count.to_string().cyan()
    );
    println!(
        "  {} {} dimensions ({})",
        "→".dimmed(),
        stats.dimension,
        stats.encoder
    );
    println!(
        "  {} Built in {:.2}s from {}",
        "→".dimmed(),
        stats.duration_ms as f64 / 1000.0,
        config.corpus_path.display()
    );
    println!(
        "  {} Built at: {}",
        "→".dimmed(),
        stats.built_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    Ok(())
}
