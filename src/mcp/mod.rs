//! MCP server for news article search
//!
//! Exposes the similarity search over stdio for AI clients.

mod server;

pub use server::run_mcp_server;
