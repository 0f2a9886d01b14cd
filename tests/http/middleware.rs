//! Session, rate limiting and static file tests

use crate::common::{body_json, set_cookie, TestServer};
use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use axum::http::{Request, StatusCode};
use serde_json::json;
use std::fs;
use waitline::app::cli::Settings;

#[tokio::test]
async fn test_new_visitor_gets_session_cookie() {
    let server = TestServer::new();
    let response = server.send("GET", "/api/queue/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).expect("Should issue a session cookie");
    let (pair, attributes) = cookie.split_once(';').unwrap();
    let (name, value) = pair.split_once('=').unwrap();
    assert_eq!(name, "session_id");
    assert_eq!(value.len(), 36, "Session id should be a UUID");
    assert_eq!(attributes.trim(), "Max-Age=3600; Path=/; HttpOnly");
}

#[tokio::test]
async fn test_existing_session_is_reused() {
    let server = TestServer::with_settings(Settings {
        session_max_age: 60,
        ..Settings::default()
    });
    let response = server.send("POST", "/api/queue/join", Some("known")).await;
    assert!(set_cookie(&response).is_none());

    let (_, body) = server.json("GET", "/api/queue/status", Some("known")).await;
    assert_eq!(body["in_queue"], true);
    assert_eq!(body["queue_number"], 1);
}

#[tokio::test]
async fn test_issued_session_identifies_later_requests() {
    let server = TestServer::new();
    let response = server.send("POST", "/api/queue/join", None).await;
    let cookie = set_cookie(&response).unwrap();
    let session = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap();
    assert_eq!(body_json(response).await["queue_number"], 1);

    let (_, body) = server
        .json("GET", "/api/queue/status", Some(&session))
        .await;
    assert_eq!(body["in_queue"], true);
    assert_eq!(body["queue_number"], 1);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let server = TestServer::with_settings(Settings {
        rate_limit: 2,
        ..Settings::default()
    });

    for _ in 0..2 {
        let (status, _) = server.json("GET", "/api/queue/status", Some("s")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = server.json("POST", "/api/queue/join", Some("s")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body,
        json!({"error": "Rate limit exceeded, please try again later"})
    );
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>Queue</h1>").unwrap();
    fs::write(dir.path().join("app.js"), "console.log('queue');").unwrap();

    let server = TestServer::with_settings(Settings {
        static_dir: Some(dir.path().to_path_buf()),
        ..Settings::default()
    });

    let response = server.send("GET", "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>Queue</h1>");

    let response = server.send("GET", "/static/app.js", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_no_static_routes_without_directory() {
    let server = TestServer::new();
    let response = server.send("GET", "/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight_echoes_origin() {
    let server = TestServer::new();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/queue/join")
        .header(ORIGIN, "http://frontend.example")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = server.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let header = |name: axum::http::HeaderName| {
        response
            .headers()
            .get(name)
            .map(|value| value.to_str().unwrap().to_ascii_lowercase())
            .unwrap_or_default()
    };
    assert_eq!(header(ACCESS_CONTROL_ALLOW_ORIGIN), "http://frontend.example");
    assert_eq!(header(ACCESS_CONTROL_ALLOW_CREDENTIALS), "true");
    assert_eq!(header(ACCESS_CONTROL_MAX_AGE), "43200");
    let methods = header(ACCESS_CONTROL_ALLOW_METHODS);
    for method in ["get", "post", "put", "patch", "delete", "options"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }
    let headers = header(ACCESS_CONTROL_ALLOW_HEADERS);
    assert!(headers.contains("origin") && headers.contains("content-type"));
}

#[tokio::test]
async fn test_cors_headers_on_simple_request() {
    let server = TestServer::new();
    let request = Request::builder()
        .method("GET")
        .uri("/api/queue/status")
        .header(ORIGIN, "http://frontend.example")
        .body(Body::empty())
        .unwrap();

    let response = server.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://frontend.example"
    );
    assert_eq!(
        headers
            .get(ACCESS_CONTROL_EXPOSE_HEADERS)
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_lowercase(),
        "content-length"
    );
}
