mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use newsim::config::{ENV_CORPUS, ENV_LOG};
use newsim::{logging, Config};

#[derive(Parser)]
#[command(name = "newsim")]
#[command(about = "Semantic similarity search over a news article corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// CSV corpus (Article, Date, Heading, NewsType columns)
    #[arg(long, global = true, env = ENV_CORPUS)]
    corpus: Option<PathBuf>,

    /// YAML config file (default: ./newsim.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (RUST_LOG overrides)
    #[arg(long, global = true, env = ENV_LOG)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the articles most similar to a query
    Search {
        query: String,
        #[arg(short = 'k', long, allow_negative_numbers = true, help = "Number of results (default 5, max 10)")]
        top_k: Option<i64>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Build the index and show statistics
    Stats {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show one article by id
    Article {
        id: usize,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Start MCP server (stdio)
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show installation instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(corpus) = cli.corpus {
        config.corpus_path = corpus;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.validate().context("Invalid configuration")?;
    logging::setup_logging(&config.log_level);

    match cli.command {
        Commands::Search { query, top_k, json } => {
            commands::search::run(&config, &query, top_k, json)
        }
        Commands::Stats { json } => commands::stats::run(&config, json),
        Commands::Article { id, json } => commands::article::run(&config, id, json),

        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions(&config);
                Ok(())
            } else {
                run_mcp_server(config)
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server(config: Config) -> anyhow::Result<()> {
    // Build before serving: no request ever sees a partial index
    let engine = commands::search::load_engine(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(engine, config))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions(config: &Config) {
    use colored::Colorize;

    let corpus_path = std::fs::canonicalize(&config.corpus_path)
        .unwrap_or_else(|_| config.corpus_path.clone());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "newsim".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(r#"{{
  "mcpServers": {{
    "news-search": {{
      "command": "{}",
      "args": ["mcp", "--corpus", "{}"]
    }}
  }}
}}"#, binary_path, corpus_path.display());
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Semantic search over the article corpus", "news_search".green());
    println!("  • {} - Get one article by id", "news_get_article".green());
    println!("  • {} - Index statistics", "news_stats".green());
}
