//! Queue endpoint tests

use crate::common::TestServer;
use axum::http::StatusCode;
use serde_json::json;
use waitline::app::cli::Settings;

#[tokio::test]
async fn test_join_issues_increasing_tickets() {
    let server = TestServer::new();

    for (session, expected) in [("u1", 1), ("u2", 2), ("u3", 3)] {
        let (status, body) = server.json("POST", "/api/queue/join", Some(session)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "queue_number": expected,
                "message": "You have joined the queue",
            })
        );
    }
}

#[tokio::test]
async fn test_join_twice_reports_existing_ticket() {
    let server = TestServer::new();
    server.json("POST", "/api/queue/join", Some("first")).await;
    server.json("POST", "/api/queue/join", Some("repeat")).await;

    let (status, body) = server.json("POST", "/api/queue/join", Some("repeat")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Already in queue", "queue_number": 2}));

    let (_, body) = server.json("GET", "/api/queue/status", Some("other")).await;
    assert_eq!(body["total_in_queue"], 2);
}

#[tokio::test]
async fn test_status_for_unregistered_session() {
    let server = TestServer::new();
    server.json("POST", "/api/queue/join", Some("someone")).await;

    let (status, body) = server.json("GET", "/api/queue/status", Some("nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"in_queue": false, "total_in_queue": 1, "current_number": 1})
    );
}

#[tokio::test]
async fn test_scenario_positions_follow_the_head() {
    let server = TestServer::new();
    for session in ["u1", "u2", "u3"] {
        server.json("POST", "/api/queue/join", Some(session)).await;
    }

    let (_, body) = server.json("GET", "/api/queue/status", Some("u2")).await;
    assert_eq!(
        body,
        json!({
            "in_queue": true,
            "queue_number": 2,
            "position": 2,
            "total_in_queue": 3,
            "estimated_time": 4,
        })
    );

    let (status, body) = server.json("POST", "/api/queue/advance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "current_position": 1}));

    let (_, body) = server.json("GET", "/api/queue/status", Some("u2")).await;
    assert_eq!(body["position"], 1);
    assert_eq!(body["estimated_time"], 2);

    server.json("POST", "/api/queue/advance", None).await;
    let (_, body) = server.json("POST", "/api/queue/advance", None).await;
    assert_eq!(body["current_position"], 3);

    let (_, body) = server.json("GET", "/api/queue/status", Some("u2")).await;
    assert_eq!(body["position"], 0);
    assert_eq!(body["estimated_time"], 0);
}

#[tokio::test]
async fn test_advance_past_the_end_is_allowed() {
    let server = TestServer::new();
    server.json("POST", "/api/queue/join", Some("only")).await;

    for expected in 1..=3 {
        let (_, body) = server.json("POST", "/api/queue/advance", None).await;
        assert_eq!(body["current_position"], expected);
    }

    let (_, body) = server.json("GET", "/api/queue/status", Some("only")).await;
    assert_eq!(body["position"], 0);
}

#[tokio::test]
async fn test_estimate_uses_configured_minutes() {
    let server = TestServer::with_settings(Settings {
        minutes_per_person: 5,
        ..Settings::default()
    });
    server.json("POST", "/api/queue/join", Some("a")).await;
    server.json("POST", "/api/queue/join", Some("b")).await;

    let (_, body) = server.json("GET", "/api/queue/status", Some("b")).await;
    assert_eq!(body["estimated_time"], 10);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = TestServer::new();
    let response = server.send("GET", "/api/queue/missing", Some("x")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
