//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: settings → HTTP transport → pager/facade →
//! saved state

use clap::Parser;
use dribbble_pager::cli::{Cli, Runner};
use dribbble_pager::{
    DedupMerger, Dribbble, Endpoint, Error, FeedKind, Pager, QueryOptions, Settings,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn settings_for(server: &MockServer) -> Settings {
    let yaml = format!(
        r"
base_url: {}
access_token: test-token
per_page: 2
http:
  timeout_seconds: 5
  max_retries: 1
  backoff:
    type: constant
    initial_ms: 10
",
        server.uri()
    );
    Settings::from_yaml(&yaml).unwrap()
}

fn shots_page(page: u32, per_page: u32) -> Value {
    let first = (page - 1) * per_page + 1;
    let shots: Vec<Value> = (first..first + per_page)
        .map(|id| json!({"id": id, "title": format!("Shot {id}"), "likes_count": id * 10}))
        .collect();
    json!({
        "page": page.to_string(),
        "pages": 3,
        "per_page": per_page,
        "total": 3 * per_page,
        "shots": shots
    })
}

async fn mount_page(server: &MockServer, feed_path: &str, page: u32) {
    Mock::given(method("GET"))
        .and(path(feed_path))
        .and(query_param("page", page.to_string()))
        .and(query_param("per_page", "2"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shots_page(page, 2)))
        .mount(server)
        .await;
}

fn ids(shots: &[Value]) -> Vec<u64> {
    shots.iter().map(|s| s["id"].as_u64().unwrap()).collect()
}

// ============================================================================
// Pager over HTTP
// ============================================================================

#[tokio::test]
async fn test_pager_loads_pages_in_order() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        mount_page(&server, "/shots/popular", page).await;
    }

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble.pager(FeedKind::Popular, None).unwrap();

    let response = pager.load_pages(3).await;

    assert!(response.is_success(), "{:?}", response.error);
    assert_eq!(ids(&pager.shots()), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(ids(&pager.fresh_shots()), vec![5, 6]);
    assert_eq!(pager.current_page(), 3);

    let metadata = response.metadata.unwrap();
    assert_eq!(metadata.status, 200);
    assert!(metadata.url.contains("page=3"));
    assert_eq!(metadata.header("Content-Type"), Some("application/json"));

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(requested, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_player_scoped_pager_path() {
    let server = MockServer::start().await;
    mount_page(&server, "/players/simplebits/shots/likes", 1).await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble
        .pager(FeedKind::LikesForPlayerShots, Some("simplebits".into()))
        .unwrap();

    let response = pager.load().await;
    assert!(response.is_success());
    assert_eq!(ids(&pager.shots()), vec![1, 2]);
}

#[tokio::test]
async fn test_failure_mid_sequence_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/shots/everyone", 1).await;

    Mock::given(method("GET"))
        .and(path("/shots/everyone"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shots/everyone"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shots_page(3, 2)))
        .expect(0)
        .mount(&server)
        .await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble.pager(FeedKind::Everyone, None).unwrap();

    let response = pager.load_pages(3).await;

    let error = response.error.as_ref().unwrap();
    assert!(error.is_transport());
    assert_eq!(error.status(), Some(404));
    assert_eq!(response.metadata.as_ref().unwrap().status, 404);
    assert_eq!(ids(&pager.shots()), vec![1, 2]);
    assert_eq!(pager.current_page(), 1);
    assert!(!pager.is_loading());
}

#[tokio::test]
async fn test_retry_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shots/debuts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/shots/debuts", 1).await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble.pager(FeedKind::Debut, None).unwrap();

    let response = pager.load().await;
    assert!(response.is_success());
    assert_eq!(pager.shots().len(), 2);
}

#[tokio::test]
async fn test_malformed_body_is_decoding_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shots/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"shots\": [1, 2"))
        .mount(&server)
        .await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble.pager(FeedKind::Popular, None).unwrap();

    let response = pager.load().await;
    assert!(response.error.unwrap().is_decoding());
    assert_eq!(response.metadata.unwrap().status, 200);
    assert!(pager.shots().is_empty());
    assert_eq!(pager.current_page(), 0);
}

#[tokio::test]
async fn test_missing_shots_array_is_decoding_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shots/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page": 1})))
        .mount(&server)
        .await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let response = dribbble
        .pager(FeedKind::Popular, None)
        .unwrap()
        .load()
        .await;
    assert!(response.error.unwrap().is_decoding());
}

#[tokio::test]
async fn test_dedup_merger_over_overlapping_pages() {
    let server = MockServer::start().await;

    // Page 2 repeats shot 2 because a new shot was published in between
    Mock::given(method("GET"))
        .and(path("/shots/popular"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"shots": [{"id": 1}, {"id": 2}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/popular"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"shots": [{"id": 2}, {"id": 3}]})),
        )
        .mount(&server)
        .await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble.pager(FeedKind::Popular, None).unwrap();
    pager.set_merger(DedupMerger::new());

    assert!(pager.load_pages(2).await.is_success());
    assert_eq!(ids(&pager.shots()), vec![1, 2, 3]);
    assert_eq!(ids(&pager.merged_shots()), vec![3]);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_saved_pager_resumes_at_next_page() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        mount_page(&server, "/shots/popular", page).await;
    }
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("popular.json");

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let pager = dribbble.pager(FeedKind::Popular, None).unwrap();
    assert!(pager.load_pages(2).await.is_success());
    assert_ok!(pager.write_to(&state_path, true));
    drop(pager);

    let restored = assert_ok!(Pager::read_from(&state_path, dribbble.transport()));
    assert_eq!(restored.kind(), FeedKind::Popular);
    assert_eq!(restored.per_page(), 2);
    assert_eq!(ids(&restored.shots()), vec![1, 2, 3, 4]);

    assert!(restored.load().await.is_success());
    assert_eq!(ids(&restored.shots()), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(restored.current_page(), 3);

    assert_ok!(restored.write_to_default_storage(false));
    let saved: Value = serde_json::from_slice(&std::fs::read(&state_path).unwrap()).unwrap();
    assert_eq!(saved["version"], 1);
    assert_eq!(saved["feed_kind"], "popular");
    assert_eq!(saved["current_page"], 3);
    assert_eq!(saved["shots"].as_array().unwrap().len(), 6);
}

#[test]
fn test_read_from_unreadable_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"version": 2}"#).unwrap();

    let dribbble = Dribbble::from_settings(&Settings::default()).unwrap();
    let err = assert_err!(Pager::read_from(&path, dribbble.transport()));
    assert!(matches!(err, Error::Deserialization { .. }));
}

// ============================================================================
// Facade over HTTP
// ============================================================================

#[tokio::test]
async fn test_facade_forwards_options() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players/simplebits/followers"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .and(query_param("sort", "recent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"players": [{"name": "dan"}], "page": 2})),
        )
        .mount(&server)
        .await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let mut options = QueryOptions::new();
    options.insert("page".into(), "2".into());
    options.insert("per_page".into(), "10".into());
    options.insert("sort".into(), "recent".into());

    let response = dribbble.followers("simplebits", &options).await;

    assert!(response.is_success());
    assert_eq!(response.json.unwrap()["players"][0]["name"], "dan");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_facade_blocking_matches_async() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shots/21603"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 21603, "title": "Moon", "likes_count": 17})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/players/nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    let dribbble = Dribbble::from_settings(&settings_for(&server)).unwrap();
    let options = QueryOptions::new();

    for endpoint in [
        Endpoint::Shot("21603".into()),
        Endpoint::Player("nobody".into()),
    ] {
        let awaited = dribbble.fetch(&endpoint, &options).await;
        let blocking = dribbble.fetch_blocking(&endpoint, &options);

        let (tx, rx) = tokio::sync::oneshot::channel();
        dribbble
            .fetch_with(endpoint.clone(), options.clone(), move |response| {
                let _ = tx.send(response);
            })
            .unwrap();
        let callback = rx.await.unwrap();

        for other in [&blocking, &callback] {
            assert_eq!(awaited.json, other.json);
            assert_eq!(
                awaited.error.as_ref().map(ToString::to_string),
                other.error.as_ref().map(ToString::to_string)
            );
        }
    }
}

// ============================================================================
// CLI
// ============================================================================

#[tokio::test]
async fn test_cli_shots_then_resume() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        mount_page(&server, "/shots/popular", page).await;
    }
    let dir = tempdir().unwrap();
    let state = dir.path().join("popular.json");
    let state_arg = state.to_str().unwrap();
    let uri = server.uri();

    let shots = Cli::try_parse_from([
        "dribbble-pager",
        "--base-url",
        &uri,
        "--token",
        "test-token",
        "shots",
        "--feed",
        "popular",
        "--per-page",
        "2",
        "--pages",
        "2",
        "--save",
        state_arg,
    ])
    .unwrap();
    assert_ok!(Runner::new(shots).run().await);

    let resume = Cli::try_parse_from([
        "dribbble-pager",
        "--base-url",
        &uri,
        "--token",
        "test-token",
        "resume",
        "--state",
        state_arg,
    ])
    .unwrap();
    assert_ok!(Runner::new(resume).run().await);

    let saved: Value = serde_json::from_slice(&std::fs::read(&state).unwrap()).unwrap();
    assert_eq!(saved["current_page"], 3);
    assert_eq!(saved["shots"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_cli_scoped_feed_without_player() {
    let cli = Cli::try_parse_from([
        "dribbble-pager",
        "shots",
        "--feed",
        "followed-player-shots",
    ])
    .unwrap();

    let err = assert_err!(Runner::new(cli).run().await);
    assert!(matches!(err, Error::MissingPlayer { .. }));
}
