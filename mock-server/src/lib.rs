//! In-memory JSON REST service used as the remote end in client tests.
//!
//! Any path is a resource path. `POST /a/b` creates a member of collection
//! `a/b` with a generated `id`; `GET` returns a member or lists a collection
//! (query pairs filter on top-level fields); `PATCH` merges fields; `DELETE`
//! removes a member and everything below it. Nested collections require
//! their parent member to exist. Requests without an `Authorization` header
//! get 401.
//!
//! Two fixed routes help exercise client edge cases: `/_echo` answers with a
//! description of the request it received, and `/_html` answers 502 with an
//! HTML body.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const HTML_ERROR: &str = "<html>Error</html>";

/// Members keyed by their full path, e.g. `customers/<id>/bank_accounts/<id>`.
pub type Db = Arc<RwLock<BTreeMap<String, Value>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    Router::new()
        .route("/_echo", any(echo))
        .route("/_html", any(html_error))
        .fallback(dispatch)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn segments(uri: &Uri) -> Vec<&str> {
    uri.path().split('/').filter(|s| !s.is_empty()).collect()
}

/// Key of the member that owns collection `path`, if the collection is nested.
fn parent_key(path: &[&str]) -> Option<String> {
    (path.len() >= 2).then(|| path[..path.len() - 1].join("/"))
}

async fn dispatch(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(filters): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Response {
    tracing::debug!(%method, path = uri.path(), "mock request");
    if !headers.contains_key(header::AUTHORIZATION) {
        return error(StatusCode::UNAUTHORIZED, "authentication required");
    }

    let path = segments(&uri);
    if path.is_empty() {
        return error(StatusCode::NOT_FOUND, "not found");
    }
    let key = path.join("/");

    match method {
        Method::GET => get(&db, &path, &key, &filters).await,
        Method::POST => create(&db, &path, &key, &body).await,
        Method::PATCH => update(&db, &key, &body).await,
        Method::DELETE => delete(&db, &key).await,
        _ => error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
    }
}

fn parse_object(body: &Bytes) -> Result<Map<String, Value>, Response> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(error(StatusCode::UNPROCESSABLE_ENTITY, "expected a JSON object")),
    }
}

fn matches(item: &Value, filters: &BTreeMap<String, String>) -> bool {
    filters.iter().all(|(field, wanted)| match item.get(field) {
        Some(Value::String(s)) => s == wanted,
        Some(other) => other.to_string() == *wanted,
        None => false,
    })
}

async fn get(db: &Db, path: &[&str], key: &str, filters: &BTreeMap<String, String>) -> Response {
    let db = db.read().await;
    if let Some(item) = db.get(key) {
        return Json(item.clone()).into_response();
    }
    if let Some(parent) = parent_key(path) {
        if !db.contains_key(&parent) {
            return error(StatusCode::NOT_FOUND, "not found");
        }
    }
    let prefix = format!("{key}/");
    let items: Vec<Value> = db
        .iter()
        .filter(|(k, _)| k.strip_prefix(&prefix).is_some_and(|rest| !rest.contains('/')))
        .map(|(_, v)| v)
        .filter(|v| matches(v, filters))
        .cloned()
        .collect();
    Json(items).into_response()
}

async fn create(db: &Db, path: &[&str], key: &str, body: &Bytes) -> Response {
    let mut fields = match parse_object(body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut db = db.write().await;
    if let Some(parent) = parent_key(path) {
        if !db.contains_key(&parent) {
            return error(StatusCode::NOT_FOUND, "not found");
        }
    }
    let id = Uuid::new_v4().to_string();
    fields.insert("id".to_string(), Value::String(id.clone()));
    let item = Value::Object(fields);
    db.insert(format!("{key}/{id}"), item.clone());
    (StatusCode::CREATED, Json(item)).into_response()
}

async fn update(db: &Db, key: &str, body: &Bytes) -> Response {
    let fields = match parse_object(body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut db = db.write().await;
    let Some(Value::Object(item)) = db.get_mut(key) else {
        return error(StatusCode::NOT_FOUND, "not found");
    };
    for (field, value) in fields {
        if field != "id" {
            item.insert(field, value);
        }
    }
    Json(Value::Object(item.clone())).into_response()
}

async fn delete(db: &Db, key: &str) -> Response {
    let mut db = db.write().await;
    let Some(item) = db.remove(key) else {
        return error(StatusCode::NOT_FOUND, "not found");
    };
    let prefix = format!("{key}/");
    db.retain(|k, _| !k.starts_with(&prefix));
    Json(json!({ "id": item.get("id").cloned().unwrap_or(Value::Null), "deleted": true }))
        .into_response()
}

async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    };
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": query,
        "authorization": header_value(header::AUTHORIZATION),
        "content_type": header_value(header::CONTENT_TYPE),
        "accept": header_value(header::ACCEPT),
        "body": body,
    }))
}

async fn html_error() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        HTML_ERROR,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_ignore_extra_slashes() {
        let uri: Uri = "/customers//c1/".parse().unwrap();
        assert_eq!(segments(&uri), ["customers", "c1"]);
    }

    #[test]
    fn parent_key_only_for_nested_paths() {
        assert_eq!(parent_key(&["customers"]), None);
        assert_eq!(parent_key(&["customers", "c1", "bank"]).as_deref(), Some("customers/c1"));
    }

    #[test]
    fn filters_compare_strings_and_scalars() {
        let item = json!({"status": "pending", "amount": 10, "live": true});
        let mut filters = BTreeMap::new();
        filters.insert("status".to_string(), "pending".to_string());
        filters.insert("amount".to_string(), "10".to_string());
        assert!(matches(&item, &filters));
        filters.insert("live".to_string(), "false".to_string());
        assert!(!matches(&item, &filters));
    }

    #[test]
    fn missing_filter_field_does_not_match() {
        let mut filters = BTreeMap::new();
        filters.insert("currency".to_string(), "CAD".to_string());
        assert!(!matches(&json!({"id": "x"}), &filters));
    }
}
