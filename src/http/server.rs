//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with the wildcard mirror handler
//! - Wire up middleware (tracing, request ID)
//! - Dispatch each fetched response by content class
//! - Hand HTML responses to the layout composer
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - One wildcard route: every path, query string included, is forwarded to
//!   the origin verbatim
//! - A fresh `LayoutComposer` is built per request and dropped with it;
//!   nothing composition-related outlives the request
//! - The host application customizes composition through an injected
//!   directive hook instead of shared controller state

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::MirrorConfig;
use crate::fetch::{CacheStore, FetchOutcome, FetchResult, OriginFetcher};
use crate::http::response;
use crate::observability::metrics;
use crate::rewrite::UrlRewriter;
use crate::routing::ContentClass;
use crate::transform::{ComposeError, DocumentTransformer, LayoutComposer};

/// Per-request composition callback installed by the host application.
///
/// Receives the requested path and the request's composer, and may set a
/// layout or stack directives before composition runs.
pub type DirectiveHook = dyn Fn(&str, &mut LayoutComposer) + Send + Sync;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MirrorConfig>,
    pub fetcher: Arc<OriginFetcher>,
    pub rewriter: UrlRewriter,
    pub directives: Option<Arc<DirectiveHook>>,
}

/// HTTP server for the asset mirror.
pub struct MirrorServer {
    router: Router,
    config: Arc<MirrorConfig>,
}

impl MirrorServer {
    /// Create a new server over the given cache store.
    ///
    /// `directives` is the optional host hook applied to every HTML
    /// response's composer.
    pub fn new(
        config: Arc<MirrorConfig>,
        cache: Arc<dyn CacheStore>,
        directives: Option<Arc<DirectiveHook>>,
    ) -> Result<Self, reqwest::Error> {
        let fetcher = Arc::new(OriginFetcher::new(config.origin.clone(), cache)?);
        let rewriter = UrlRewriter::from_config(&config.origin);

        let state = AppState {
            config: config.clone(),
            fetcher,
            rewriter,
            directives,
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(mirror_handler))
            .route("/", any(mirror_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.base_url,
            "Asset mirror starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Asset mirror stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }
}

/// Main mirror handler: fetch the requested path from the origin and
/// dispatch on the response's content class.
async fn mirror_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(request_id = %request_id, path = %path, "Mirroring request");

    match state.fetcher.fetch(&path).await {
        Ok(FetchOutcome::NotFound) => {
            tracing::debug!(request_id = %request_id, path = %path, "Origin returned not found");
            metrics::record_request("not_found", 404, start);
            response::not_found()
        }
        Ok(FetchOutcome::Success(result)) => {
            let class = ContentClass::from_content_type(result.content_type());
            let cache_control = response::cache_control_for(class, &state.config.cache_policy);

            match class {
                ContentClass::Html => {
                    compose_page(&state, &path, result, &cache_control, &request_id, start).await
                }
                ContentClass::Javascript | ContentClass::Css => {
                    // Mask the origin in script/style text so embedded
                    // references resolve through the proxy or the CDN.
                    let content_type = result.content_type().map(str::to_string);
                    let masked = state.rewriter.strip_origin(&result.body_text());
                    metrics::record_request(class.as_str(), 200, start);
                    response::text_asset(masked, content_type.as_deref(), &cache_control)
                }
                ContentClass::Other => {
                    metrics::record_request(class.as_str(), 200, start);
                    response::passthrough(result, &cache_control)
                }
            }
        }
        Err(error) => {
            tracing::error!(
                request_id = %request_id,
                path = %path,
                error = %error,
                "Origin fetch failed"
            );
            metrics::record_request("error", 502, start);
            response::bad_gateway()
        }
    }
}

/// Compose an HTML response: the fetched document becomes the layout source,
/// then the host's directive hook gets a chance to reshape it.
async fn compose_page(
    state: &AppState,
    path: &str,
    result: FetchResult,
    cache_control: &str,
    request_id: &str,
    start: Instant,
) -> Response {
    let transformer = DocumentTransformer::new(state.rewriter.clone());
    let mut composer = LayoutComposer::new(state.fetcher.clone(), transformer);
    composer.set_layout(result);

    if let Some(hook) = &state.directives {
        hook(path, &mut composer);
    }

    match composer.compose().await {
        Ok(html) => {
            metrics::record_request("html", 200, start);
            response::composed_page(html, cache_control)
        }
        Err(ComposeError::LayoutNotConfigured) => {
            tracing::error!(request_id = %request_id, "Layout source missing during composition");
            metrics::record_request("html", 500, start);
            response::internal_error()
        }
        Err(ComposeError::LayoutNotFound { path: layout }) => {
            tracing::warn!(request_id = %request_id, layout = %layout, "Layout document not found");
            metrics::record_request("html", 404, start);
            response::not_found()
        }
        Err(error) => {
            tracing::error!(
                request_id = %request_id,
                path = %path,
                error = %error,
                "Layout composition failed"
            );
            metrics::record_request("html", 502, start);
            response::bad_gateway()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
