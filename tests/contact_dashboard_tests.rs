//! Contact form, dashboard and health endpoint integration tests.

mod common;

use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
use common::{bearer_auth, build_app, build_app_with, login};
use serde_json::{json, Value};

fn forwarded_for(ip: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(ip),
    )
}

fn submission(name: &str) -> Value {
    json!({
        "name": name,
        "email": "visitor@example.org",
        "subject": "Volunteering",
        "message": "I would like to help at the next food drive.",
    })
}

#[tokio::test]
async fn test_contact_submission_and_inbox() {
    let app = build_app().await;

    let response = app.server.post("/api/contact").json(&submission("Ana")).await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_str().unwrap().to_string();
    assert!(body["message"].is_string());

    let token = login(&app.server).await;

    let inbox: Value = app
        .server
        .get("/api/contact")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .json();
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["is_read"], false);

    let response = app
        .server
        .put(&format!("/api/contact/{}", id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "is_read": true }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["is_read"], true);

    let unread: Value = app
        .server
        .get("/api/contact?unread=true")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .json();
    assert!(unread.as_array().unwrap().is_empty());

    app.server
        .put(&format!("/api/contact/{}", id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    app.server
        .delete(&format!("/api/contact/{}", id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .assert_status_ok();
    app.server
        .get(&format!("/api/contact/{}", id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_validation() {
    let app = build_app().await;

    let response = app
        .server
        .post("/api/contact")
        .json(&json!({ "name": "Ana", "email": "not-an-email" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let fields = response.json::<Value>()["error"]["fields"].clone();
    assert!(fields["email"].is_array());
    assert!(fields["message"].is_array());
}

#[tokio::test]
async fn test_contact_rate_limit_is_per_client() {
    let app = build_app_with(|config| config.contact.rate_limit_per_minute = 2).await;

    for _ in 0..2 {
        let (name, value) = forwarded_for("203.0.113.5");
        app.server
            .post("/api/contact")
            .add_header(name, value)
            .json(&submission("Ana"))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let (name, value) = forwarded_for("203.0.113.5");
    let response = app
        .server
        .post("/api/contact")
        .add_header(name, value)
        .json(&submission("Ana"))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<Value>()["error"]["code"], "RATE_LIMIT_EXCEEDED");

    let (name, value) = forwarded_for("198.51.100.1");
    app.server
        .post("/api/contact")
        .add_header(name, value)
        .json(&submission("Ben"))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = build_app().await;
    let token = login(&app.server).await;

    for (title, status, goal, raised) in [
        ("Water", "active", 1000.0, 400.0),
        ("Books", "completed", 500.0, 500.0),
    ] {
        app.server
            .post("/api/campaigns")
            .add_header(AUTHORIZATION, bearer_auth(&token))
            .json(&json!({
                "title": title,
                "description": "d",
                "status": status,
                "goal_amount": goal,
                "raised_amount": raised,
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }
    app.server
        .post("/api/blog")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "title": "Draft", "content": "c" }))
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post("/api/contact")
        .json(&submission("Ana"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .get("/api/dashboard/stats")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await;
    response.assert_status_ok();
    let stats: Value = response.json();

    assert_eq!(stats["campaigns"], json!({ "total": 2, "active": 1 }));
    assert_eq!(stats["blog_posts"], json!({ "total": 1, "published": 0 }));
    assert_eq!(stats["contact_messages"], json!({ "total": 1, "unread": 1 }));
    assert_eq!(stats["team_members"], 0);
    assert_eq!(stats["fundraising"]["total_goal"], 1500.0);
    assert_eq!(stats["fundraising"]["total_raised"], 900.0);
    assert_eq!(stats["recent_messages"][0]["name"], "Ana");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = build_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    // No recorder is installed in tests
    app.server
        .get("/metrics")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
