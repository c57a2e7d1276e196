pub mod error;
pub mod feedback;
pub mod pages;
pub mod state;
pub mod votes;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// Build the HTTP router over an explicit store handle.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(pages::health))
        .route(
            "/api/feedbacks/",
            get(feedback::list_feedbacks).post(feedback::create_feedback),
        )
        .route("/api/feedbacks/{feedback_id}/vote/", post(votes::toggle_vote))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use feedboard_db::Database;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let state = AppStateInner::new(Database::open_in_memory().unwrap());
        (router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, content: &str, username: &str) -> Value {
        let body = json!({ "content": content, "username": username }).to_string();
        let (status, value) = send(app, "POST", "/api/feedbacks/", Some(&body)).await;
        assert_eq!(status, StatusCode::OK, "{value}");
        value["feedback"].clone()
    }

    async fn vote(app: &Router, id: impl std::fmt::Display, username: &str) -> (StatusCode, Value) {
        let uri = format!("/api/feedbacks/{id}/vote/");
        let body = json!({ "username": username }).to_string();
        send(app, "POST", &uri, Some(&body)).await
    }

    #[tokio::test]
    async fn create_trims_and_starts_unvoted() {
        let (app, _) = app();
        let body = r#"{"content": "   Please add a bike rack  ", "username": " alice "}"#;
        let (status, value) = send(&app, "POST", "/api/feedbacks/", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Feedback created successfully");
        let feedback = &value["feedback"];
        assert_eq!(feedback["content"], "Please add a bike rack");
        assert_eq!(feedback["username"], "alice");
        assert_eq!(feedback["upvote_count"], 0);
        assert_eq!(feedback["user_has_voted"], false);

        let created_at = feedback["created_at"].as_str().unwrap();
        assert_eq!(created_at.len(), "YYYY-MM-DD HH:MM:SS".len());
        assert!(!created_at.contains('T'));
    }

    #[tokio::test]
    async fn create_rejects_short_content() {
        let (app, _) = app();
        let body = r#"{"content": "hi", "username": "bob"}"#;
        let (status, value) = send(&app, "POST", "/api/feedbacks/", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Feedback too short (min 5 chars)");
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let (app, _) = app();
        for body in [
            r#"{"content": "     ", "username": "bob"}"#,
            r#"{"content": "Long enough", "username": "   "}"#,
            r#"{"content": "Long enough"}"#,
        ] {
            let (status, value) = send(&app, "POST", "/api/feedbacks/", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value["error"], "Content and username required");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (app, _) = app();
        let (status, value) = send(&app, "POST", "/api/feedbacks/", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Invalid JSON");

        let id = create(&app, "Valid feedback", "carol").await["id"].clone();
        let uri = format!("/api/feedbacks/{id}/vote/");
        let (status, value) = send(&app, "POST", &uri, Some("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn overlong_username_is_internal_error() {
        let (app, _) = app();
        let body = json!({ "content": "Valid feedback", "username": "u".repeat(51) }).to_string();
        let (status, value) = send(&app, "POST", "/api/feedbacks/", Some(&body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(value["error"].as_str().unwrap().contains("CHECK constraint failed"));
    }

    #[tokio::test]
    async fn toggle_twice_restores_count() {
        let (app, _) = app();
        let id = create(&app, "Weekly demos", "dave").await["id"].clone();

        let (status, first) = vote(&app, &id, "alice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["success"], true);
        assert_eq!(first["action"], "added");
        assert_eq!(first["upvote_count"], 1);
        assert_eq!(first["user_has_voted"], true);

        let (status, second) = vote(&app, &id, "alice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["action"], "removed");
        assert_eq!(second["upvote_count"], 0);
        assert_eq!(second["user_has_voted"], false);
    }

    #[tokio::test]
    async fn toggle_validates_username_then_feedback() {
        let (app, _) = app();
        let id = create(&app, "Quiet room", "erin").await["id"].clone();

        let (status, value) = vote(&app, &id, "  ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Username required");

        let (status, value) = vote(&app, 9999, "alice").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"], "Feedback not found");

        let (status, value) = vote(&app, "abc", "alice").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"], "Feedback not found");
    }

    #[tokio::test]
    async fn list_reports_per_viewer_votes() {
        let (app, _) = app();
        let x = create(&app, "Item X content", "frank").await["id"].clone();
        let y = create(&app, "Item Y content", "frank").await["id"].clone();
        vote(&app, &x, "alice").await;

        let flags = |value: &Value| -> Vec<(Value, Value)> {
            value["feedbacks"]
                .as_array()
                .unwrap()
                .iter()
                .map(|f| (f["id"].clone(), f["user_has_voted"].clone()))
                .collect()
        };

        let (status, alice) = send(&app, "GET", "/api/feedbacks/?username=alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(flags(&alice), vec![(y.clone(), json!(false)), (x.clone(), json!(true))]);
        assert_eq!(alice["feedbacks"][1]["upvote_count"], 1);

        let (_, bob) = send(&app, "GET", "/api/feedbacks/?username=bob", None).await;
        assert_eq!(flags(&bob), vec![(y.clone(), json!(false)), (x.clone(), json!(false))]);

        let (_, anonymous) = send(&app, "GET", "/api/feedbacks/", None).await;
        assert_eq!(flags(&anonymous), vec![(y, json!(false)), (x, json!(false))]);
    }

    #[tokio::test]
    async fn list_uses_last_username_and_ignores_blank_viewer() {
        let (app, _) = app();
        let id = create(&app, "Repeated params", "jill").await["id"].clone();
        vote(&app, &id, "b").await;

        let (status, value) = send(&app, "GET", "/api/feedbacks/?username=a&username=b", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["feedbacks"][0]["user_has_voted"], true);

        let (status, value) = send(&app, "GET", "/api/feedbacks/?username=b&username=a", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["feedbacks"][0]["user_has_voted"], false);

        let (status, value) = send(&app, "GET", "/api/feedbacks/?username=%20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["feedbacks"][0]["user_has_voted"], false);
        assert_eq!(value["feedbacks"][0]["upvote_count"], 1);
    }

    #[tokio::test]
    async fn signed_id_is_not_found() {
        let (app, _) = app();
        let id = create(&app, "Signed ids", "kim").await["id"].clone();

        let (status, value) = vote(&app, format!("+{id}"), "alice").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"], "Feedback not found");

        let (_, list) = send(&app, "GET", "/api/feedbacks/?username=alice", None).await;
        assert_eq!(list["feedbacks"][0]["upvote_count"], 0);
    }

    #[tokio::test]
    async fn list_is_stable_without_writes() {
        let (app, _) = app();
        let (_, empty) = send(&app, "GET", "/api/feedbacks/", None).await;
        assert_eq!(empty, json!({ "feedbacks": [] }));

        create(&app, "First idea", "gina").await;
        create(&app, "Second idea", "hank").await;

        let (_, a) = send(&app, "GET", "/api/feedbacks/?username=gina", None).await;
        let (_, b) = send(&app, "GET", "/api/feedbacks/?username=gina", None).await;
        assert_eq!(a, b);
        assert_eq!(a["feedbacks"][0]["content"], "Second idea");
    }

    #[tokio::test]
    async fn deleted_feedback_cannot_be_voted() {
        let (app, state) = app();
        let id = create(&app, "Temporary idea", "ivy").await["id"].clone();
        vote(&app, &id, "alice").await;

        let raw_id = id.as_i64().unwrap();
        assert_eq!(state.db.delete_feedback(raw_id).unwrap(), 1);
        assert_eq!(state.db.count_upvotes(raw_id).unwrap(), 0);

        let (status, _) = vote(&app, &id, "alice").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn vote_endpoint_is_post_only() {
        let (app, _) = app();
        let (status, _) = send(&app, "GET", "/api/feedbacks/1/vote/", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn index_and_health_respond() {
        let (app, _) = app();
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, value) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "ok");
    }
}
