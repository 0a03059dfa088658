//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::tools::{
    GifDeleteParams, GifGetParams, GifSubmitParams, delete_impl, get_impl, list_impl, prune_impl, random_impl,
    submit_impl,
};
use gifstash_client::Fetcher;
use gifstash_core::{DiskStore, ExpiringMap};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for gifstash.
///
/// Holds the store, the fetcher and the random-pick pins; all three are
/// shared across concurrent tool calls.
#[derive(Clone)]
pub struct GifStashServer {
    tool_router: ToolRouter<Self>,
    store: Arc<DiskStore>,
    fetcher: Arc<dyn Fetcher>,
    pins: Arc<ExpiringMap<String, String>>,
    pin_ttl: Duration,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl GifStashServer {
    /// Create a new server handler around an opened store.
    pub fn new(store: Arc<DiskStore>, fetcher: Arc<dyn Fetcher>, pin_ttl: Duration) -> Self {
        Self { tool_router: Self::tool_router(), store, fetcher, pins: Arc::new(ExpiringMap::new()), pin_ttl }
    }

    /// Sweep expired random-pick pins every `every` on a background task.
    pub fn spawn_pin_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let pins = Arc::clone(&self.pins);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if pins.is_empty().await {
                    continue;
                }
                let removed = pins.cleanup_expired().await;
                if removed > 0 {
                    let remaining = pins.len().await;
                    tracing::debug!(removed, remaining, "swept expired random pins");
                }
            }
        })
    }

    /// Download a gif and keep it.
    #[tool(
        description = "Download a gif from a URL and store it. Returns the id to retrieve it with. A URL can only be stored once."
    )]
    async fn gif_submit(&self, params: Parameters<GifSubmitParams>) -> Result<CallToolResult, McpError> {
        submit_impl(&self.store, self.fetcher.as_ref(), params.0).await
    }

    /// Return a stored gif.
    #[tool(description = "Return a stored gif by id as image content.")]
    async fn gif_get(&self, params: Parameters<GifGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.store, params.0).await
    }

    /// Return a random stored gif.
    #[tool(description = "Return a random stored gif. The same gif is returned for a few minutes after it is picked.")]
    async fn gif_random(&self) -> Result<CallToolResult, McpError> {
        random_impl(&self.store, &self.pins, self.pin_ttl).await
    }

    /// List stored gifs.
    #[tool(description = "List every stored gif with its id, storage location and source URL.")]
    async fn gif_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.store).await
    }

    /// Forget a gif by source URL.
    #[tool(description = "Remove a gif from the index by the URL it was submitted with.")]
    async fn gif_delete(&self, params: Parameters<GifDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.store, params.0).await
    }

    /// Delete orphaned blobs.
    #[tool(description = "Delete stored files that no longer belong to any gif in the index.")]
    async fn gif_prune(&self) -> Result<CallToolResult, McpError> {
        prune_impl(&self.store).await
    }
}

impl ServerHandler for GifStashServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "gifstash".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some("Submit gif URLs with gif_submit, then fetch them by id with gif_get.".into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
