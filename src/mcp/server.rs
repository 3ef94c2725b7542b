//! News search MCP server implementation

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use newsim::{resolve_top_k, Config, SearchEngine, SearchError};

/// Parameters for news_search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Free-text query (e.g., "interest rate cut by central bank")
    #[schemars(description = "Free-text search query")]
    pub query: String,
    /// Number of results (default: 5, max: 10)
    #[schemars(description = "Number of results (default: 5, max: 10)")]
    #[serde(default)]
    pub top_k: Option<i64>,
}

/// Parameters for news_get_article tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetArticleParams {
    /// Article id as returned by news_search
    #[schemars(description = "Article id as returned by news_search")]
    pub id: usize,
}

/// News search MCP service. Holds an already built engine.
#[derive(Clone)]
pub struct NewsService {
    engine: Arc<SearchEngine>,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

impl NewsService {
    pub fn new(engine: SearchEngine, config: Config) -> Self {
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    fn search_json(&self, params: &SearchParams) -> Result<Value, SearchError> {
        let top_k = resolve_top_k(params.top_k, &self.config)?;
        let results = self.engine.search(&params.query, top_k)?;
        Ok(serde_json::json!({
            "query": params.query,
            "count": results.len(),
            "results": results,
        }))
    }

    /// `None` when no article has this id
    fn article_json(&self, id: usize) -> Option<Value> {
        self.engine.document(id).map(|doc| serde_json::json!(doc))
    }

    fn stats_json(&self) -> Result<Value, SearchError> {
        Ok(serde_json::json!(self.engine.stats()?))
    }
}

fn to_mcp_error(tool: &str, err: SearchError) -> McpError {
    warn!(tool, error = %err, "Tool call failed");
    if err.is_client_error() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

fn json_result(value: &Value) -> Result<CallToolResult, McpError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

#[tool_router]
impl NewsService {
    /// Search articles by semantic similarity
    #[tool(description = "Search the news article corpus by semantic similarity. Returns the most similar articles with id, heading, date, news type, full text, and a similarity score in [-1, 1].")]
    async fn news_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let value = self
            .search_json(&params.0)
            .map_err(|e| to_mcp_error("news_search", e))?;
        json_result(&value)
    }

    /// Get one article by id
    #[tool(description = "Get the full text and metadata of one news article by id.")]
    async fn news_get_article(
        &self,
        params: Parameters<GetArticleParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = params.0.id;
        let value = self.article_json(id).ok_or_else(|| {
            warn!(tool = "news_get_article", id, "Unknown article id");
            McpError::invalid_params(
                format!(
                    "no article with id {} (corpus has {} articles)",
                    id,
                    self.engine.len()
                ),
                None,
            )
        })?;
        json_result(&value)
    }

    /// Get index statistics
    #[tool(description = "Get statistics about the loaded article index: article count, embedding dimension, encoder, and build time.")]
    async fn news_stats(&self) -> Result<CallToolResult, McpError> {
        let value = self
            .stats_json()
            .map_err(|e| to_mcp_error("news_stats", e))?;
        json_result(&value)
    }
}

#[tool_handler]
impl ServerHandler for NewsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "News article similarity search. Use news_search to find articles similar to a query, news_get_article to read one in full.".to_string()
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Serve `engine` over stdio until the client disconnects
pub async fn run_mcp_server(engine: SearchEngine, config: Config) -> Result<()> {
    use tokio::io::{stdin, stdout};

    info!(articles = engine.len(), "Starting MCP server on stdio");
    let service = NewsService::new(engine, config);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsim::{Document, HtpEncoder};

    fn service() -> NewsService {
        let mut engine = SearchEngine::new(HtpEncoder::new());
        engine
            .load(vec![
                Document::new(0, "State Bank cuts interest rate", "1/2/2015", "Rate cut", "business"),
                Document::new(1, "Pakistan defeat Zimbabwe in ODI", "2/2/2015", "ODI win", "sports"),
                Document::new(2, "Gold prices rise on weak dollar", "3/2/2015", "Gold up", "business"),
            ])
            .unwrap();
        NewsService::new(engine, Config::default())
    }

    #[test]
    fn test_search_json() {
        let svc = service();
        let value = svc
            .search_json(&SearchParams {
                query: "Pakistan defeat Zimbabwe in ODI".to_string(),
                top_k: Some(2),
            })
            .unwrap();

        assert_eq!(value["count"], 2);
        assert_eq!(value["results"][0]["id"], 1);
        assert_eq!(value["results"][0]["heading"], "ODI win");
        assert_eq!(value["results"][0]["news_type"], "sports");
        assert!(value["results"][0]["similarity"].as_f64().unwrap() > 0.99);
    }

    #[test]
    fn test_search_json_default_top_k() {
        let svc = service();
        let value = svc
            .search_json(&SearchParams {
                query: "gold".to_string(),
                top_k: None,
            })
            .unwrap();
        // Default of 5 exceeds the corpus size
        assert_eq!(value["count"], 3);
    }

    #[test]
    fn test_search_json_rejects_bad_top_k() {
        let svc = service();
        let err = svc
            .search_json(&SearchParams {
                query: "gold".to_string(),
                top_k: Some(-1),
            })
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_article_json() {
        let svc = service();
        assert_eq!(svc.article_json(2).unwrap()["heading"], "Gold up");
        assert!(svc.article_json(7).is_none());
    }

    #[tokio::test]
    async fn test_unknown_article_is_invalid_params() {
        let svc = service();
        let err = svc
            .news_get_article(Parameters(GetArticleParams { id: 7 }))
            .await
            .unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("no article with id 7"));
    }

    #[test]
    fn test_stats_json() {
        let svc = service();
        let value = svc.stats_json().unwrap();
        assert_eq!(value["document_count"], 3);
        assert_eq!(value["dimension"], 384);
    }
}
