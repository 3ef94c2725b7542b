//! Search command - rank articles by similarity to a query

use anyhow::{Context, Result};
use colored::Colorize;
use unicode_width::UnicodeWidthChar;

use newsim::{resolve_top_k, Config, SearchEngine, SearchResult};

/// Load the corpus named in `config` and build the index
pub fn load_engine(config: &Config) -> Result<SearchEngine> {
    SearchEngine::from_csv(&config.corpus_path).with_context(|| {
        format!(
            "Failed to build index from {}",
            config.corpus_path.display()
        )
    })
}

/// Run search command
pub fn run(config: &Config, query: &str, top_k: Option<i64>, json: bool) -> Result<()> {
    let top_k = resolve_top_k(top_k, config)?;
    let engine = load_engine(config)?;
    let results = engine.search(query, top_k)?;

    if json {
        let output = serde_json::json!({
            "query": query,
            "count": results.len(),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        print_result(i + 1, result, config.preview_width);
    }

    Ok(())
}

fn print_result(rank: usize, result: &SearchResult, preview_width: usize) {
    let score_str = format!("{:.2}", result.similarity);
    let score_colored = if result.similarity > 0.8 {
        score_str.green()
    } else if result.similarity > 0.6 {
        score_str.yellow()
    } else {
        score_str.dimmed()
    };

    println!(
        "{}. [{}] {}",
        rank.to_string().bold(),
        score_colored,
        result.heading.cyan()
    );
    println!("   {} | {} | #{}", result.date, result.news_type, result.id);
    println!("   {}", preview(&result.article, preview_width).dimmed());
    println!();
}

/// First `width` display columns of `text` on one line, with "..." if cut
pub fn preview(text: &str, width: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::new();
    let mut used = 0;
    for c in flat.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            out.push_str("...");
            return out;
        }
        used += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("Rupee gains", 200), "Rupee gains");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_preview_flattens_whitespace() {
        assert_eq!(preview("line one\n\n  line   two", 200), "line one line two");
    }

    #[test]
    fn test_preview_counts_wide_chars() {
        // CJK characters take two columns each
        assert_eq!(preview("株価上昇", 5), "株価...");
    }
}
