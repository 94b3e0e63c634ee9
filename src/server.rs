//! HTTP front end
//!
//! Axum server exposing the raw slot: the stable `/raw` URL in three
//! representations, two write endpoints, stats, health, and a human-readable
//! dashboard. Every handler goes through the shared [`SlotFacade`].

use crate::error::SlotError;
use crate::facade::SlotFacade;
use crate::metadata::AuthorDefault;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the router with all routes and middleware.
pub fn build_router(facade: SlotFacade) -> Router {
    // The raw URL must allow cross-origin reads from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::HeaderName::from_static("x-author")]);

    Router::new()
        .route("/", get(home))
        .route("/raw", get(read_raw).post(write_raw))
        .route("/update", post(update_data))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(facade)
}

/// Start the server and run until shutdown signal.
pub async fn run(facade: SlotFacade) -> anyhow::Result<()> {
    let port = facade.config().port;
    let public_url = facade.config().public_url.clone();
    let router = build_router(facade);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);
    info!("Raw endpoint: {}/raw", public_url);
    info!("Statistics: {}/stats", public_url);

    if public_url.contains("localhost") {
        warn!("Public URL is local - shared raw links will not resolve externally");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shut down gracefully");
    Ok(())
}

impl IntoResponse for SlotError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = json!({
            "status": "error",
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct RawQuery {
    format: Option<String>,
}

/// `GET /raw?format={text|json|html}`
async fn read_raw(
    State(facade): State<SlotFacade>,
    Query(query): Query<RawQuery>,
) -> Response {
    match query.format.as_deref() {
        Some("json") => {
            let (content, metadata) = facade.current();
            Json(json!({
                "data": content,
                "metadata": metadata,
                "history_count": facade.history_len(),
                "timestamp": crate::metadata::now_string(),
            }))
            .into_response()
        }
        Some("html") => {
            let (content, _) = facade.current();
            Html(format!("<pre>{}</pre>", html_escape(&content))).into_response()
        }
        _ => {
            let (content, _) = facade.current();
            (
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
                    (header::PRAGMA, "no-cache"),
                    (header::EXPIRES, "0"),
                ],
                content,
            )
                .into_response()
        }
    }
}

/// `POST /raw` - write with metadata, author from `X-Author`
async fn write_raw(
    State(facade): State<SlotFacade>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, SlotError> {
    let content = std::str::from_utf8(&body)?.to_string();
    let author = author_header(&headers);

    let metadata = facade.submit(content, author.as_deref(), AuthorDefault::Unknown)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Data updated successfully",
        "metadata": metadata,
        "url": facade.config().raw_url(),
    })))
}

/// `POST /update` - programmatic write; rejects empty bodies, author
/// defaults to the API tag
async fn update_data(
    State(facade): State<SlotFacade>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, SlotError> {
    if body.is_empty() {
        return Err(SlotError::Validation("No data provided".to_string()));
    }
    let content = std::str::from_utf8(&body)?.to_string();
    let author = author_header(&headers);

    let metadata = facade.submit(content, author.as_deref(), AuthorDefault::Api)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Data updated via API",
        "url": facade.config().raw_url(),
        "size": metadata.size,
    })))
}

/// `GET /stats`
async fn stats(State(facade): State<SlotFacade>) -> Json<crate::facade::Stats> {
    Json(facade.stats())
}

/// `GET /health`
async fn health(State(facade): State<SlotFacade>) -> Json<crate::facade::Health> {
    Json(facade.health())
}

/// `GET /` - dashboard; the one read that counts a view
async fn home(State(facade): State<SlotFacade>) -> Html<String> {
    let (content, metadata) = facade.current_for_display();

    let data_block = if content.is_empty() {
        r#"<div class="empty">No data stored yet. Send data via the bot or API to get started.</div>"#
            .to_string()
    } else {
        format!("<pre>{}</pre>", html_escape(&content))
    };

    let page = DASHBOARD_TEMPLATE
        .replace("{{size}}", &metadata.size.to_string())
        .replace("{{views}}", &metadata.views.to_string())
        .replace("{{format}}", metadata.format.as_str())
        .replace("{{history}}", &facade.history_len().to_string())
        .replace("{{last_updated}}", &html_escape(&metadata.last_updated))
        .replace("{{author}}", &html_escape(&metadata.author))
        .replace("{{raw_url}}", &html_escape(&facade.config().raw_url()))
        .replace("{{timestamp}}", &crate::metadata::now_string())
        .replace("{{data}}", &data_block);

    Html(page)
}

fn author_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-author")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Dashboard page template; `{{token}}` placeholders filled per render
const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>RAW Data Viewer</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #0f172a;
            color: #e2e8f0;
            min-height: 100vh;
            padding: 2rem;
        }
        .container { max-width: 960px; margin: 0 auto; }
        h1 { font-size: 2rem; margin-bottom: 0.5rem; color: #38bdf8; }
        .subtitle { color: #94a3b8; margin-bottom: 2rem; }
        .tiles {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }
        .tile {
            background: #1e293b;
            border-radius: 0.75rem;
            padding: 1rem;
            text-align: center;
        }
        .tile .value { font-size: 1.5rem; font-weight: bold; color: #38bdf8; }
        .tile .label { font-size: 0.8rem; color: #94a3b8; margin-top: 0.25rem; }
        .info { background: #1e293b; border-radius: 0.75rem; padding: 1rem; margin-bottom: 2rem; }
        .info p { margin: 0.25rem 0; color: #cbd5e1; font-size: 0.9rem; }
        .url {
            font-family: monospace;
            background: #0f172a;
            padding: 0.5rem;
            border-radius: 0.5rem;
            word-break: break-all;
            display: block;
            margin-top: 0.5rem;
            color: #7dd3fc;
        }
        pre {
            background: #1e293b;
            padding: 1rem;
            border-radius: 0.75rem;
            overflow-x: auto;
            max-height: 480px;
            overflow-y: auto;
            white-space: pre-wrap;
            word-wrap: break-word;
            font-size: 0.9rem;
        }
        .empty {
            background: #1e293b;
            border-radius: 0.75rem;
            padding: 2.5rem;
            text-align: center;
            color: #94a3b8;
        }
        .links { margin-top: 2rem; }
        .links a { color: #38bdf8; text-decoration: none; margin-right: 1.5rem; }
        .links a:hover { text-decoration: underline; }
        footer { margin-top: 2rem; color: #64748b; font-size: 0.8rem; }
    </style>
</head>
<body>
    <div class="container">
        <h1>RAW Data Viewer</h1>
        <p class="subtitle">Store, share, and access your data with a permanent URL</p>
        <div class="tiles">
            <div class="tile"><span class="value">{{size}}</span><div class="label">Bytes</div></div>
            <div class="tile"><span class="value">{{views}}</span><div class="label">Views</div></div>
            <div class="tile"><span class="value">{{format}}</span><div class="label">Format</div></div>
            <div class="tile"><span class="value">{{history}}</span><div class="label">History</div></div>
        </div>
        <div class="info">
            <p><strong>Last Updated:</strong> {{last_updated}}</p>
            <p><strong>Author:</strong> {{author}}</p>
            <p><strong>Raw URL:</strong><span class="url">{{raw_url}}</span></p>
        </div>
        {{data}}
        <div class="links">
            <a href="/raw">Raw</a>
            <a href="/raw?format=json">JSON</a>
            <a href="/stats">Stats</a>
            <a href="/health">Health</a>
        </div>
        <footer>{{timestamp}}</footer>
    </div>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        build_router(SlotFacade::new(Config::default()))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_router();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["data_exists"], false);
        assert_eq!(json["telegram_bot"], "not_available");
    }

    #[tokio::test]
    async fn test_raw_round_trip() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .header("X-Author", "tester")
                    .body(Body::from("hello world"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["metadata"]["author"], "tester");
        assert_eq!(json["metadata"]["format"], "text");

        let response = app
            .oneshot(Request::builder().uri("/raw").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello world");
    }

    #[tokio::test]
    async fn test_raw_json_representation() {
        let app = test_router();

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/raw?format=json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"], r#"{"a":1}"#);
        assert_eq!(json["metadata"]["format"], "json");
        assert_eq!(json["metadata"]["author"], "Unknown");
        assert_eq!(json["history_count"], 0);
    }

    #[tokio::test]
    async fn test_raw_html_representation_escapes() {
        let app = test_router();

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .body(Body::from("<script>alert(1)</script>"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/raw?format=html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.starts_with("<pre>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_raw_rejects_invalid_utf8() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .body(Body::from(vec![0xff, 0xfe, 0xfd]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_update_rejects_empty_body() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/update")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "No data provided");
    }

    #[tokio::test]
    async fn test_update_defaults_author_to_api() {
        let app = test_router();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/update")
                    .body(Body::from("payload"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["size"], 7);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/raw?format=json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["metadata"]["author"], "API");
    }

    #[tokio::test]
    async fn test_dashboard_increments_views_once() {
        let facade = SlotFacade::new(Config::default());
        let app = build_router(facade.clone());

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(facade.current().1.views, 3);

        // Programmatic reads do not count
        app.oneshot(Request::builder().uri("/raw").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(facade.current().1.views, 3);
    }

    #[tokio::test]
    async fn test_dashboard_renders_stats() {
        let facade = SlotFacade::new(Config::default());
        let app = build_router(facade.clone());

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .body(Body::from("dashboard content"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("dashboard content"));
        assert!(html.contains("http://localhost:8080/raw"));
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = test_router();

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .body(Body::from("abc"))
                    .unwrap(),
            )
            .await
            .unwrap();
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/raw")
                    .body(Body::from("defgh"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["current_size"], 5);
        assert_eq!(json["history_entries"], 1);
        assert_eq!(json["server_status"], "running");
    }

    #[tokio::test]
    async fn test_cors_allows_cross_origin_reads() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/raw")
                    .header(header::ORIGIN, "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
