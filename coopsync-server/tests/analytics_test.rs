use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, NOW_TS, read_json};

#[tokio::test]
async fn test_feeding_chart() {
    let app = MockApp::with_data(json!({
        "feedingLogs": {
            "a": { "timestamp": NOW_TS - 3 * 3600, "gramsDispensed": 150 },
            "b": { "timestamp": NOW_TS - 3 * 3600 + 60, "gramsDispensed": "50" },
            "c": { "timestamp": NOW_TS - 24 * 3600, "gramsDispensed": 100 },
        }
    }))
    .await
    .with_analytics_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/analytics/feeding?period=day&compare=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["points"].as_array().unwrap().len(), 24);
    assert_eq!(body["points"][9]["current"], 200.0);
    assert_eq!(body["points"][12]["previous"], 100.0);
    assert_eq!(body["summary"]["total"], 300.0);
    assert_eq!(body["summary"]["peak_hour"], "09:00 - 10:00");
}

#[tokio::test]
async fn test_empty_water_chart() {
    let app = MockApp::new().await.with_analytics_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/analytics/water?period=month"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "no_data");
    assert_eq!(body["compare"], false);
    assert_eq!(body["summary"], json!(null));
}

#[tokio::test]
async fn test_unknown_source_or_period() {
    let app = MockApp::new().await.with_analytics_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/analytics/eggs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/analytics/feeding?period=year"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_page() {
    let mut history = serde_json::Map::new();
    for i in 0..30 {
        history.insert(
            format!("h{i:02}"),
            json!({ "timestamp": NOW_TS - i * 1800, "temperature": 20 + i, "humidity": 55 }),
        );
    }
    let app = MockApp::with_data(json!({ "history": history }))
        .await
        .with_analytics_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/history?period=day&page=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["page"], 0);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["points_per_page"], 24);
    assert_eq!(body["points"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn test_hydration() {
    let app = MockApp::with_data(json!({
        "feedingSettings": { "chickenCount": 4 },
        "waterLogs": {
            "a": { "timestamp": NOW_TS - 3600, "volumeDispensed": 1000 },
        }
    }))
    .await
    .with_analytics_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/hydration"))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["chicken_count"], 4);
    assert_eq!(body["per_bird"], 250.0);
    assert_eq!(body["status"], "normal");

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/hydration?chicken_count=20"))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["per_bird"], 50.0);
    assert_eq!(body["status"], "alert");
}
