use axum::{Json, response::Html};
use serde_json::{Value, json};

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Feedboard</title></head>
<body><div id="app"></div></body>
</html>
"#;

/// GET / serves the single-page shell; the page itself talks to /api.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
