//! Content resource integration tests.
//!
//! Exercises the CRUD contract shared by campaigns, sponsors, blog posts,
//! stories, projects, team members and gallery images.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::TestServer;
use common::{bearer_auth, build_app, login};
use rstest::rstest;
use serde_json::{json, Value};

async fn create(server: &TestServer, token: &str, path: &str, body: Value) -> Value {
    let response = server
        .post(path)
        .add_header(AUTHORIZATION, bearer_auth(token))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[rstest]
#[case("/api/campaigns", json!({ "title": "Clean Water", "description": "Wells for villages", "goal_amount": 5000 }), "title", json!("Clean Water 2025"))]
#[case("/api/sponsors", json!({ "name": "Acme Foundation", "website_url": "https://acme.example.org" }), "name", json!("Acme Trust"))]
#[case("/api/blog", json!({ "title": "Hello World", "content": "First post", "is_published": true }), "title", json!("Hello Again"))]
#[case("/api/stories", json!({ "title": "Amina's School", "content": "She now attends school." }), "title", json!("Amina Graduates"))]
#[case("/api/projects", json!({ "title": "Solar Clinic", "description": "Power for the clinic" }), "title", json!("Solar Clinic II"))]
#[case("/api/team", json!({ "name": "Grace", "position": "Director" }), "position", json!("Executive Director"))]
#[case("/api/gallery", json!({ "title": "Harvest", "image_url": "/storage/gallery/harvest.jpg" }), "title", json!("Harvest Day"))]
#[tokio::test]
async fn test_resource_lifecycle(
    #[case] base: &str,
    #[case] body: Value,
    #[case] field: &str,
    #[case] new_value: Value,
) {
    let app = build_app().await;
    let token = login(&app.server).await;

    let created = create(&app.server, &token, base, body).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(created["created_at"].is_string());

    // Public read
    let list: Value = app.server.get(base).await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    app.server
        .get(&format!("{}/{}", base, id))
        .await
        .assert_status_ok();

    // Partial update keeps other fields
    let response = app
        .server
        .put(&format!("{}/{}", base, id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ field: new_value }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated[field], new_value);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["created_at"], created["created_at"]);

    // Delete, then 404
    let response = app
        .server
        .delete(&format!("{}/{}", base, id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .ends_with("deleted successfully"));

    let response = app.server.get(&format!("{}/{}", base, id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");

    app.server
        .delete(&format!("{}/{}", base, id))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_list_fields() {
    let app = build_app().await;
    let token = login(&app.server).await;

    let response = app
        .server
        .post("/api/campaigns")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "goal_amount": -5, "status": "archived", "start_date": "2024-06-01", "end_date": "2024-05-01" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "The given data was invalid.");
    let fields = body["error"]["fields"].as_object().unwrap();
    for field in ["title", "description", "goal_amount", "status", "end_date"] {
        assert!(fields.contains_key(field), "missing {}", field);
    }
}

#[tokio::test]
async fn test_update_cannot_break_required_fields() {
    let app = build_app().await;
    let token = login(&app.server).await;
    let story = create(
        &app.server,
        &token,
        "/api/stories",
        json!({ "title": "Before", "content": "Body" }),
    )
    .await;

    let response = app
        .server
        .put(&format!("/api/stories/{}", story["id"].as_str().unwrap()))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "title": "   " }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_json() {
    let app = build_app().await;
    let token = login(&app.server).await;

    let response = app
        .server
        .post("/api/sponsors")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/sponsors")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "name": "Acme", "display_order": "first" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_filters() {
    let app = build_app().await;
    let token = login(&app.server).await;

    for (name, tier, active) in [
        ("Alpha", "gold", true),
        ("Beta", "silver", false),
        ("Gamma", "gold", false),
    ] {
        create(
            &app.server,
            &token,
            "/api/sponsors",
            json!({ "name": name, "tier": tier, "is_active": active }),
        )
        .await;
    }

    let gold: Value = app.server.get("/api/sponsors?tier=gold").await.json();
    assert_eq!(gold.as_array().unwrap().len(), 2);

    let active: Value = app.server.get("/api/sponsors?active=1").await.json();
    let names: Vec<_> = active
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha"]);

    let inactive_gold: Value = app
        .server
        .get("/api/sponsors?active=false&tier=gold")
        .await
        .json();
    assert_eq!(inactive_gold[0]["name"], "Gamma");

    app.server
        .get("/api/sponsors?active=maybe")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    for status in ["active", "completed"] {
        create(
            &app.server,
            &token,
            "/api/campaigns",
            json!({ "title": status, "description": "d", "goal_amount": 10, "status": status }),
        )
        .await;
    }
    let completed: Value = app.server.get("/api/campaigns?status=completed").await.json();
    assert_eq!(completed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lists_newest_first_and_team_by_display_order() {
    let app = build_app().await;
    let token = login(&app.server).await;

    for title in ["First", "Second", "Third"] {
        create(
            &app.server,
            &token,
            "/api/projects",
            json!({ "title": title, "description": "d" }),
        )
        .await;
    }
    let projects: Value = app.server.get("/api/projects").await.json();
    assert_eq!(projects[0]["title"], "Third");
    assert_eq!(projects[2]["title"], "First");

    for (name, order) in [("Zoe", 1), ("Adam", 2), ("Mia", 1)] {
        create(
            &app.server,
            &token,
            "/api/team",
            json!({ "name": name, "position": "Volunteer", "display_order": order }),
        )
        .await;
    }
    let team: Value = app.server.get("/api/team").await.json();
    let names: Vec<_> = team
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mia", "Zoe", "Adam"]);
}

#[tokio::test]
async fn test_blog_visibility_and_slugs() {
    let app = build_app().await;
    let token = login(&app.server).await;

    let published = create(
        &app.server,
        &token,
        "/api/blog",
        json!({ "title": "Annual Report 2024", "content": "Numbers", "is_published": true }),
    )
    .await;
    assert_eq!(published["slug"], "annual-report-2024");
    assert!(published["published_at"].is_string());

    let draft = create(
        &app.server,
        &token,
        "/api/blog",
        json!({ "title": "Annual Report 2024", "content": "Draft numbers" }),
    )
    .await;
    assert_eq!(draft["slug"], "annual-report-2024-2");
    assert!(draft["published_at"].is_null());

    // Anonymous readers see only the published post
    let public: Value = app.server.get("/api/blog").await.json();
    assert_eq!(public.as_array().unwrap().len(), 1);
    app.server
        .get("/api/blog/annual-report-2024")
        .await
        .assert_status_ok();
    app.server
        .get("/api/blog/annual-report-2024-2")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Signed-in callers see drafts
    let all: Value = app
        .server
        .get("/api/blog")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .json();
    assert_eq!(all.as_array().unwrap().len(), 2);
    app.server
        .get(&format!("/api/blog/{}", draft["id"].as_str().unwrap()))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .await
        .assert_status_ok();

    // An explicit slug that is taken is rejected
    let response = app
        .server
        .put(&format!("/api/blog/{}", draft["id"].as_str().unwrap()))
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "slug": "annual-report-2024" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["error"]["fields"]["slug"].is_array());

    // Updating without a slug keeps it
    let response = app
        .server
        .put("/api/blog/annual-report-2024-2")
        .add_header(AUTHORIZATION, bearer_auth(&token))
        .json(&json!({ "title": "Renamed", "is_published": true }))
        .await;
    response.assert_status_ok();
    let renamed: Value = response.json();
    assert_eq!(renamed["slug"], "annual-report-2024-2");
    assert!(renamed["published_at"].is_string());
}
