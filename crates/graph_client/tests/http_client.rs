use axum::{
    extract::{Query, RawQuery},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use graph_client::{dispatch_async, ClientConfig, GraphApi, GraphError, HttpGraphClient, HttpMethod, Params};
use serde_json::{json, Value};
use std::collections::HashMap;

async fn me(Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match q.get("access_token").map(String::as_str) {
        Some("good") => (
            StatusCode::OK,
            Json(json!({"id": "4", "ssl": q.get("return_ssl_resources")})),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"type": "OAuthException", "message": "Error validating access token"}})),
        ),
    }
}

async fn echo(RawQuery(q): RawQuery) -> Json<Value> {
    Json(json!({"query": q}))
}

async fn spawn() -> (ClientConfig, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/me", get(me))
        .route("/echo", get(echo))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = format!("http://{addr}");
    let cfg = ClientConfig {
        timeout_ms: 5_000,
        graph_url: base.clone(),
        beta_graph_url: base,
    };
    (cfg, handle)
}

#[tokio::test(flavor = "multi_thread")]
async fn async_call_sends_token_and_params() {
    let (cfg, _h) = spawn().await;
    let mut client = HttpGraphClient::new(cfg).unwrap();
    client.set_access_token(Some("good".into()));

    let mut params = Params::new();
    params.insert("return_ssl_resources".into(), json!(true));
    let v = client
        .api_async("/me", Some(&params), HttpMethod::Get, Value::Null)
        .await
        .unwrap();
    assert_eq!(v["id"], "4");
    assert_eq!(v["ssl"], "true");
}

#[tokio::test(flavor = "multi_thread")]
async fn async_call_maps_oauth_error_and_notifies() {
    let (cfg, _h) = spawn().await;
    let mut client = HttpGraphClient::new(cfg).unwrap();
    client.set_access_token(Some("stale".into()));
    let mut rx = client.subscribe();

    let ev = dispatch_async(&client, "/me", None, HttpMethod::Get, json!("corr-1")).await;
    assert!(ev.error().is_some_and(GraphError::is_oauth));

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.method, HttpMethod::Get);
    assert_eq!(notice.user_token, json!("corr-1"));
    assert!(notice.oauth_failure);
}

#[tokio::test(flavor = "multi_thread")]
async fn bare_404_is_api_error() {
    let (cfg, _h) = spawn().await;
    let client = HttpGraphClient::new(cfg).unwrap();
    let err = client
        .api_async("/missing", None, HttpMethod::Get, Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Api { status: 404, .. }), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_call_runs_on_blocking_thread() {
    let (cfg, _h) = spawn().await;
    let result = tokio::task::spawn_blocking(move || {
        let mut client = HttpGraphClient::new(cfg).unwrap();
        client.set_access_token(Some("good".into()));
        let ok = client.api("/echo", None, HttpMethod::Get);
        client.set_access_token(Some("stale".into()));
        let denied = client.api("/me", None, HttpMethod::Get);
        (ok, denied)
    })
    .await
    .unwrap();

    assert_eq!(result.0.unwrap()["query"], "access_token=good");
    assert!(result.1.unwrap_err().is_oauth());
}
