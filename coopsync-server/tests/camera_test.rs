use axum::http::{Method, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, read_json};

#[tokio::test]
async fn test_camera_needs_address() {
    let app = MockApp::new().await.with_camera_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/camera/frame"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .router
        .clone()
        .oneshot(app.json_request(Method::POST, "/api/camera/stream", &json!({ "fps": 5 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_configure_and_capture() {
    let app = MockApp::new().await.with_camera_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.json_request(Method::PUT, "/api/camera", &json!({ "ip": "192.168.4.20" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/camera"))
        .await
        .unwrap();
    assert_eq!(read_json(response).await, json!({ "ip": "192.168.4.20" }));

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::GET, "/api/camera/frame"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"192.168.4.20");
}

#[tokio::test]
async fn test_stream_start_and_stop() {
    let app = MockApp::with_data(json!({ "settings": { "cameraIP": "10.0.0.7" } }))
        .await
        .with_camera_handle();

    let response = app
        .router
        .clone()
        .oneshot(app.json_request(Method::POST, "/api/camera/stream", &json!({ "fps": 60 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(app.json_request(Method::POST, "/api/camera/stream", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "state": "streaming", "fps": 5, "last_frame_at": null })
    );

    let response = app
        .router
        .clone()
        .oneshot(app.request(Method::DELETE, "/api/camera/stream"))
        .await
        .unwrap();
    assert_eq!(read_json(response).await, json!({ "state": "idle" }));
}
