use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Response, StatusCode};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use typeahead_countries::service::route;
use typeahead_countries::{COUNTRIES, MAX_RESULTS, search, serve};
use typeahead_net::{FetcherConfig, SuggestionFetcher, SuggestionSource};

async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Spawn the endpoint on an ephemeral port; drop the sender to stop it.
async fn spawn_server() -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        serve(listener, async {
            let _ = stop_rx.await;
        })
        .await
        .unwrap();
    });
    (format!("http://{}/api/countries", addr), stop_tx)
}

// ============================================================================
// Dataset Tests
// ============================================================================

#[test]
fn test_search_ind() {
    let out = search(Some("ind"));
    assert!(out.contains(&"India"));
    assert!(out.contains(&"Indonesia"));
    for name in &out {
        assert!(name.to_lowercase().contains("ind"), "{name} should not match");
    }
}

#[test]
fn test_search_case_insensitive() {
    assert_eq!(search(Some("IND")), search(Some("ind")));
}

#[test]
fn test_search_missing_query_is_head_of_list() {
    let out = search(None);
    assert_eq!(out.len(), MAX_RESULTS);
    assert_eq!(out, COUNTRIES[..MAX_RESULTS].to_vec());
    assert_eq!(search(Some("")), out);
}

#[test]
fn test_search_caps_results() {
    // Nearly every name contains an "a".
    assert_eq!(search(Some("a")).len(), MAX_RESULTS);
}

#[test]
fn test_search_preserves_order() {
    let out = search(Some("guinea"));
    assert_eq!(
        out,
        vec!["Equatorial Guinea", "Guinea", "Guinea-Bissau", "Papua New Guinea"]
    );
}

#[test]
fn test_search_no_match() {
    assert!(search(Some("xyzzy")).is_empty());
}

// ============================================================================
// Routing Tests
// ============================================================================

#[tokio::test]
async fn test_route_get_countries() {
    let resp = route(&Method::GET, "/api/countries", Some("q=fr"));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let body = body_json(resp).await;
    let names: Vec<&str> = body.as_array().unwrap().iter().filter_map(|v| v.as_str()).collect();
    assert!(names.contains(&"France"));
}

#[tokio::test]
async fn test_route_unknown_path() {
    let resp = route(&Method::GET, "/api/cities", None);
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Not found");
}

#[test]
fn test_route_preflight() {
    let resp = route(&Method::OPTIONS, "/api/countries", None);
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[test]
fn test_route_rejects_post() {
    let resp = route(&Method::POST, "/api/countries", None);
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Live Server Tests
// ============================================================================

#[tokio::test]
async fn test_live_filtered_request() {
    let (url, _stop) = spawn_server().await;

    let resp = reqwest::get(format!("{url}?q=ind")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let names: Vec<String> = resp.json().await.unwrap();
    assert!(names.iter().any(|n| n == "India"));
    assert!(names.iter().all(|n| n.to_lowercase().contains("ind")));
}

#[tokio::test]
async fn test_live_unfiltered_request() {
    let (url, _stop) = spawn_server().await;

    let names: Vec<String> = reqwest::get(&url).await.unwrap().json().await.unwrap();
    let expected: Vec<String> = COUNTRIES[..50].iter().map(|s| s.to_string()).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_live_fetcher_round_trip() {
    let (url, _stop) = spawn_server().await;

    let fetcher = SuggestionFetcher::new(FetcherConfig::with_endpoint(&url)).unwrap();
    let out = fetcher.suggest("new z").await.unwrap();
    assert_eq!(out, vec!["New Zealand"]);
}

#[tokio::test]
async fn test_live_shutdown() {
    let (url, stop) = spawn_server().await;
    assert!(reqwest::get(&url).await.is_ok());

    stop.send(()).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    // The listener is gone; new connections are refused.
    assert!(reqwest::get(&url).await.is_err());
}
