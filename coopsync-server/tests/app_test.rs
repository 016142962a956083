use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use coopsync_server::app::build_app;
use coopsync_server::configs::{Settings, StoreKind};
use coopsync_server::services::FixedClock;
use coopsync_server::store::{MemoryStore, RealtimeStore};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::mock_app::{NOW, PASSWORD, StubFrameSource, USERNAME, read_json};

fn settings(name: &str) -> Settings {
    let mut settings: Settings = toml::from_str(include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../configs/default.toml"
    )))
    .unwrap();

    settings.store.kind = StoreKind::Memory;
    settings.context.preferences_path = std::env::temp_dir()
        .join(format!("coopsync-app-{}-{}", name, std::process::id()))
        .join("preferences.toml")
        .to_string_lossy()
        .to_string();

    settings
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_operator_session() {
    let settings = settings("session");
    let store = MemoryStore::with_data(json!({
        "sensors": { "temperature": 36.2 },
        "alerts": { "highTemperature": true },
    }));

    let (router, context) = build_app(
        &settings,
        Arc::new(store.clone()),
        Arc::new(FixedClock::new(NOW)),
        Arc::new(StubFrameSource),
    )
    .await
    .unwrap();

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": USERNAME, "password": PASSWORD })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = read_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    // The mirror is subscribed during startup.
    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/dashboard", Some(&token), None))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["connected"], true);
    assert_eq!(body["sensors"]["temperature"], 36.2);
    assert_eq!(body["alerts"]["high_temperature"], true);

    let response = router
        .clone()
        .oneshot(request(
            Method::PUT,
            "/api/preferences",
            Some(&token),
            Some(json!({ "theme": "dark" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/preferences", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(read_json(response).await, json!({ "theme": "dark" }));

    let response = router
        .clone()
        .oneshot(request(Method::POST, "/api/feed", Some(&token), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    context.shutdown().await.unwrap();

    assert_eq!(store.get("/controls/feed").await.unwrap(), Some(json!(false)));
    let saved = std::fs::read_to_string(&settings.context.preferences_path).unwrap();
    assert!(saved.contains("theme = \"dark\""));

    let _ = std::fs::remove_file(&settings.context.preferences_path);
}

#[tokio::test]
async fn test_startup_with_unreachable_store() {
    let settings = settings("offline");
    let store = MemoryStore::new();
    store.set_offline(true).await;

    let (router, context) = build_app(
        &settings,
        Arc::new(store.clone()),
        Arc::new(FixedClock::new(NOW)),
        Arc::new(StubFrameSource),
    )
    .await
    .unwrap();

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/health", None, None))
        .await
        .unwrap();
    assert_eq!(
        read_json(response).await,
        json!({ "status": "ok", "connected": false })
    );

    store.set_offline(false).await;
    context.shutdown().await.unwrap();
    let _ = std::fs::remove_file(&settings.context.preferences_path);
}
