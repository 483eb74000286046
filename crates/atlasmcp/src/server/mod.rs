//! HTTP server: MCP transports plus the REST facade
//!
//! One axum router hosts three surfaces:
//! - `POST /mcp` — stateless streamable-HTTP MCP (one JSON-RPC request
//!   per call, JSON-RPC response in the body)
//! - `GET /mcp`, `GET /sse` + `POST /messages` — SSE transports
//! - `/api/...` — plain REST routes over the same data functions

mod rest;
mod sse;

use crate::prelude::{eprintln, *};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[clap(long, env = "ATLASMCP_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[clap(long, env = "ATLASMCP_HOST", default_value = "127.0.0.1")]
    pub host: String,
}

/// Shared router state: the app context plus the legacy SSE session
/// registry. Only the transport layer in `sse` touches the registry.
#[derive(Clone)]
pub struct ServerState {
    pub ctx: Arc<crate::AppContext>,
    pub sessions: sse::SseSessions,
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Starting HTTP server on {}:{}...",
            options.host, options.port
        );
    }

    let addr = format!("{}:{}", options.host, options.port);

    let ctx = crate::AppContext::from_env(global.clone())?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = ServerState {
        ctx: Arc::new(ctx),
        sessions: sse::SseSessions::default(),
    };

    let app_router = Router::new()
        .route("/mcp", post(mcp_post_handler).get(mcp_sse_handler))
        .route("/sse", get(sse::sse_handler))
        .route("/messages", post(sse::message_handler))
        .route("/api/issues/search", post(rest::search_issues))
        .route("/api/issues/bulk-edit", post(rest::bulk_edit_issues))
        .route("/api/issues/update", post(rest::update_issue))
        .route("/api/issues/{issueKey}", get(rest::get_issue))
        .route(
            "/api/confluence/pages",
            post(rest::create_page).get(rest::list_or_search_pages),
        )
        .route(
            "/api/confluence/pages/{id}",
            get(rest::get_page)
                .put(rest::update_page)
                .delete(rest::delete_page),
        )
        .route("/api/confluence/pages/{id}/move", post(rest::move_page))
        .route(
            "/api/confluence/pages/{id}/comments",
            post(rest::add_comment),
        )
        .route(
            "/api/confluence/pages/{id}/attachments",
            post(rest::add_attachment),
        )
        .route("/api/confluence/spaces", get(rest::list_spaces))
        .layer(cors)
        .with_state(state);

    if global.verbose {
        eprintln!("Server listening on http://{}", addr);
        eprintln!("MCP endpoint: http://{}/mcp", addr);
        eprintln!("SSE endpoint: http://{}/sse", addr);
        eprintln!("REST facade: http://{}/api", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

/// Stateless streamable-HTTP transport: one JSON-RPC request per call.
async fn mcp_post_handler(
    State(state): State<ServerState>,
    body: String,
) -> Json<crate::mcp::JsonRpcResponse> {
    let response = crate::mcp::handle_request(&body, &state.ctx).await;
    Json(response)
}

/// SSE stream for clients that open `GET /mcp`: a ready event, then
/// keep-alive comments until the client disconnects.
async fn mcp_sse_handler(
    State(_state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = stream::once(async { Ok(Event::default().data("MCP endpoint ready")) })
        .chain(stream::pending());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keepalive"),
    )
}
