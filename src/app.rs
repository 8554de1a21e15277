use std::path::Path;

use anyhow::Context;
use axum::{
    routing::{get, get_service},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth;
use crate::config::AppConfig;
use crate::state::AppState;

/// Static HTML pages served by name, besides the raw static directory.
const PAGES: &[(&str, &str)] = &[
    ("/home", "home.html"),
    ("/login", "login.html"),
    ("/index", "index.html"),
];

pub fn build_app(state: AppState, static_dir: &Path) -> Router {
    // GET /login is the page, POST /login is the auth handler
    let mut router = auth::router();
    for &(route, file) in PAGES {
        router = router.route(route, get_service(ServeFile::new(static_dir.join(file))));
    }

    router
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Binds `APP_HOST:APP_PORT`; the host may be a name such as `localhost` or a
/// bare IPv6 address such as `::`.
pub async fn bind(config: &AppConfig) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("bind {}:{}", config.host, config.port))?;
    Ok(listener)
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let listener = bind(config).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
