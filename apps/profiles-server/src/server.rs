//! HTTP host: middleware stack, auxiliary routes and the serve loop.

use std::time::Duration;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use profiles::config::ObjectStorageConfig;
use serde_json::{Value, json};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::config::{AppConfig, ServerConfig};
use crate::shutdown;

const REQUEST_ID_HEADER: &str = "x-request-id";

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Assemble the full application router around the module routes.
#[must_use]
pub fn build_router(module_routes: Router, cfg: &AppConfig) -> Router {
    let mut router = module_routes.route("/health", get(health_check));

    if cfg.server.serve_media {
        if let ObjectStorageConfig::Local(local) = &cfg.profiles.storage {
            tracing::info!(dir = %local.base_dir.display(), "Serving local media under /media");
            router = router.nest_service("/media", ServeDir::new(&local.base_dir));
        } else {
            tracing::warn!("server.serve_media is set but storage backend is not local; ignoring");
        }
    }

    apply_middleware_stack(router, &cfg.server, cfg.body_limit_bytes())
}

/// Layers are registered innermost first; at runtime a request passes
/// `SetRequestId` -> `PropagateRequestId` -> Trace -> Timeout -> `BodyLimit` -> routes.
fn apply_middleware_stack(mut router: Router, cfg: &ServerConfig, body_limit: usize) -> Router {
    router = router.layer(RequestBodyLimitLayer::new(body_limit));
    router = router.layer(DefaultBodyLimit::max(body_limit));

    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        Duration::from_secs(cfg.request_timeout_secs),
    ));

    router = apply_trace_layer(router);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &axum::http::Response<axum::body::Body>,
                 latency: Duration,
                 span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                },
            ),
    )
}

/// Bind and serve until a shutdown signal arrives.
///
/// # Errors
/// Fails when the address cannot be bound or the server errors out.
pub async fn serve(router: Router, cfg: &ServerConfig) -> Result<()> {
    let addr = cfg.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    let shutdown = async {
        if let Err(e) = shutdown::wait_for_shutdown().await {
            tracing::error!(error = %e, "Signal handling failed; shutting down");
        }
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_and_request_id() {
        let router = build_router(Router::new(), &AppConfig::default());

        let res = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["status"], "healthy");
    }

    #[tokio::test]
    async fn serves_local_media_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("avatars")).unwrap();
        std::fs::write(dir.path().join("avatars/7_cat.png"), b"png").unwrap();

        let mut cfg = AppConfig::default();
        cfg.server.serve_media = true;
        cfg.profiles.storage = ObjectStorageConfig::Local(profiles::config::LocalStorageConfig {
            base_dir: dir.path().to_path_buf(),
            public_base_url: "http://127.0.0.1:8087/media".to_owned(),
        });

        let res = build_router(Router::new(), &cfg)
            .oneshot(
                Request::get("/media/avatars/7_cat.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
