//! Article command - show one stored article by id

use anyhow::{bail, Result};
use colored::Colorize;

use super::search::load_engine;
use newsim::Config;

/// Run article command
pub fn run(config: &Config, id: usize, json: bool) -> Result<()> {
    let engine = load_engine(config)?;
    let Some(doc) = engine.document(id) else {
        bail!(
            "No article with id {} (corpus has {} articles)",
            id,
            engine.len()
        );
    };

    if json {
        println!("{}", serde_json::to_string_pretty(doc)?);
        return Ok(());
    }

    println!("{}", doc.heading.bold().cyan());
    println!("{} | {} | #{}", doc.date, doc.news_type, doc.id);
    println!();
    println!("{}", doc.article);

    Ok(())
}
