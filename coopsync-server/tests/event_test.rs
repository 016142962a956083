use axum::http::{Method, StatusCode};
use coopsync_server::store::RealtimeStore;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, NOW_TS, read_json};

async fn app() -> MockApp {
    MockApp::with_data(json!({
        "events": {
            "-Nrecent": { "timestamp": NOW_TS - 3600, "type": "highTemperature" },
            "-Nlastweek": {
                "timestamp": NOW_TS - 2 * 86400,
                "type": "feeding",
                "description": "Dispensed 150g of feed"
            },
            "-Nold": { "timestamp": NOW_TS - 10 * 86400, "type": "reboot" },
            "-Nbroken": { "type": "lowFood" },
        }
    }))
    .await
    .with_event_handle()
}

#[tokio::test]
async fn test_list_events_by_filter() {
    let app = app().await;

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["filter"], "all");
    assert_eq!(body["total"], 3);
    let ids: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["-Nrecent", "-Nlastweek", "-Nold"]);

    assert_eq!(body["events"][0]["severity"], "alert");
    assert_eq!(
        body["events"][0]["description"],
        "Temperature exceeded safe threshold"
    );
    assert_eq!(body["events"][1]["severity"], "info");
    assert_eq!(body["events"][2]["description"], "System event");

    for (filter, total) in [("day", 1), ("week", 2), ("month", 3)] {
        let response = app
            .router
            .clone()
            .oneshot(app.request(Method::GET, &format!("/api/events?filter={filter}")))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["total"], total, "filter {filter}");
    }
}

#[tokio::test]
async fn test_list_collapses_to_visible_events() {
    let mut events = serde_json::Map::new();
    for i in 0..20 {
        events.insert(
            format!("-N{i:02}"),
            json!({ "timestamp": NOW_TS - i * 60, "type": "lowWaterMain" }),
        );
    }
    let app = MockApp::with_data(json!({ "events": events }))
        .await
        .with_event_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/events"))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["total"], 20);
    assert_eq!(body["hidden"], 5);
    assert_eq!(body["events"].as_array().unwrap().len(), 15);

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/events?show_all=true"))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["hidden"], 0);
    assert_eq!(body["events"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_delete_event() {
    let app = app().await;

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::DELETE, "/api/events/-Nrecent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.store.get("/events/-Nrecent").await.unwrap(), None);

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/events"))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["total"], 2);
}

#[tokio::test]
async fn test_delete_rejects_unsafe_key() {
    let app = app().await;

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::DELETE, "/api/events/a.b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.writes().await.is_empty());
}
