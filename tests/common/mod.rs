// tests/common/mod.rs
// =============================================================================
// A local HTTP server with fixed answers for the link checker tests.
//
// Routes:
//   /ok          200
//   /missing     404
//   /moved       301 -> /ok
//   /get-only    405 for HEAD, 200 for GET
//   /slow        200 after two seconds
//   /loop        301 -> /loop, forever
//   /page/:id    200 for any id
//
// Every request that reaches the server bumps a shared hit counter.
// =============================================================================

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;

use doc_guardian::config::{CheckerConfig, EngineConfig};

pub struct TestServer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/moved", get(|| async { moved_to("/ok") }))
            .route("/get-only", any(get_only))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "slow"
                }),
            )
            .route("/loop", get(|| async { moved_to("/loop") }))
            .route("/page/:id", get(|| async { "page" }))
            .layer(middleware::from_fn_with_state(hits.clone(), count_hits));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

        Self { addr, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn moved_to(location: &'static str) -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

async fn get_only(method: Method) -> Response {
    if method == Method::HEAD {
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    } else {
        "got it".into_response()
    }
}

async fn count_hits(State(hits): State<Arc<AtomicUsize>>, request: Request, next: Next) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

/// Checker settings for a loopback server: no proxy, quick retries.
pub fn local_checker() -> CheckerConfig {
    CheckerConfig {
        requests_per_second: 0.0,
        request_timeout_secs: 5,
        max_retries: 1,
        backoff_base_ms: 10,
        use_system_proxy: false,
        ..Default::default()
    }
}

pub fn local_engine() -> EngineConfig {
    EngineConfig {
        checker: local_checker(),
        ..Default::default()
    }
}
