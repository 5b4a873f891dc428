use std::net::SocketAddr;
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::get};
use permission_gate::services::auth::jwks::{HttpJwksFetcher, JwksError, JwksFetcher};
use permission_gate::testutil::{PRIMARY_KID, ROTATED_KID, primary_jwk, rotated_jwk};
use serde_json::json;
use url::Url;

async fn spawn_idp() -> SocketAddr {
    let app = Router::new()
        .route(
            "/.well-known/jwks.json",
            get(|| async { Json(json!({ "keys": [primary_jwk(), rotated_jwk()] })) }),
        )
        .route(
            "/mixed.json",
            get(|| async {
                Json(json!({
                    "keys": [
                        { "kid": "enc-key", "kty": "oct", "k": "c2VjcmV0" },
                        { "kid": "weird", "kty": "unknown-kty" },
                        primary_jwk(),
                    ]
                }))
            }),
        )
        .route(
            "/broken.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        )
        .route("/html.json", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/slow.json",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "keys": [] }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn fetcher(addr: SocketAddr, path: &str, timeout: Duration) -> HttpJwksFetcher {
    let url = Url::parse(&format!("http://{addr}{path}")).expect("url");
    HttpJwksFetcher::new(url, timeout).expect("client builds")
}

#[tokio::test]
async fn fetches_published_keys() {
    let addr = spawn_idp().await;
    let fetcher = fetcher(addr, "/.well-known/jwks.json", Duration::from_secs(5));

    let jwks = fetcher.fetch().await.expect("fetches");

    let kids: Vec<_> = jwks
        .keys
        .iter()
        .filter_map(|k| k.common.key_id.as_deref())
        .collect();
    assert_eq!(kids, vec![PRIMARY_KID, ROTATED_KID]);
}

#[tokio::test]
async fn unusable_entries_do_not_poison_the_set() {
    let addr = spawn_idp().await;
    let fetcher = fetcher(addr, "/mixed.json", Duration::from_secs(5));

    let jwks = fetcher.fetch().await.expect("fetches");

    assert!(jwks.find(PRIMARY_KID).is_some());
    assert!(jwks.find("weird").is_none());
}

#[tokio::test]
async fn error_status_is_reported() {
    let addr = spawn_idp().await;
    let fetcher = fetcher(addr, "/broken.json", Duration::from_secs(5));

    assert!(matches!(fetcher.fetch().await, Err(JwksError::Status(500))));
}

#[tokio::test]
async fn non_json_body_is_a_document_error() {
    let addr = spawn_idp().await;
    let fetcher = fetcher(addr, "/html.json", Duration::from_secs(5));

    assert!(matches!(fetcher.fetch().await, Err(JwksError::Document(_))));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let addr = spawn_idp().await;
    let fetcher = fetcher(addr, "/slow.json", Duration::from_millis(100));

    assert!(matches!(fetcher.fetch().await, Err(JwksError::Timeout)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let fetcher = fetcher(addr, "/jwks.json", Duration::from_secs(2));

    assert!(matches!(
        fetcher.fetch().await,
        Err(JwksError::Transport(_))
    ));
}
