use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, HTML_ERROR};
use serde_json::Value;
use tower::ServiceExt;

const AUTH: &str = "Basic c2tfdGVzdDo=";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_authorization_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/customers").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "authentication required");
}

// --- list ---

#[tokio::test]
async fn list_empty_collection() {
    let resp = app().oneshot(request("GET", "/customers")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!([]));
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_generated_id() {
    let resp = app()
        .oneshot(json_request("POST", "/customers", r#"{"email":"ada@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let customer = body_json(resp).await;
    assert_eq!(customer["email"], "ada@example.com");
    assert!(customer["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn create_rejects_non_object_body() {
    let resp = app()
        .oneshot(json_request("POST", "/customers", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn nested_create_requires_parent() {
    let resp = app()
        .oneshot(json_request("POST", "/customers/nobody/bank_accounts", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- get / update / delete on missing members ---

#[tokio::test]
async fn missing_member_is_404() {
    let resp = app().oneshot(request("GET", "/customers/nobody/bank")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app()
        .oneshot(json_request("PATCH", "/customers/nobody", r#"{"a":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app().oneshot(request("DELETE", "/customers/nobody")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let resp = app().oneshot(request("PUT", "/customers")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- fixed routes ---

#[tokio::test]
async fn echo_describes_request() {
    let resp = app()
        .oneshot(json_request("POST", "/_echo?page=2", r#"{"x":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo = body_json(resp).await;
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/_echo");
    assert_eq!(echo["query"]["page"], "2");
    assert_eq!(echo["authorization"], AUTH);
    assert_eq!(echo["content_type"], "application/json");
    assert_eq!(echo["body"]["x"], 1);
}

#[tokio::test]
async fn html_route_returns_non_json() {
    let resp = app().oneshot(request("GET", "/_html")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_bytes(resp).await, HTML_ERROR.as_bytes());
}

// --- full lifecycle ---

#[tokio::test]
async fn nested_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create customer
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/customers", r#"{"first_name":"Ada"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let customer = body_json(resp).await;
    let cid = customer["id"].as_str().unwrap().to_string();

    // create two bank transactions under it
    for status in ["pending", "cleared"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                &format!("/customers/{cid}/bank"),
                &format!(r#"{{"amount":5,"status":"{status}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // list filtered
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/customers/{cid}/bank?status=pending")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let pending = body_json(resp).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["status"], "pending");

    // top-level list holds only the customer, not its children
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/customers"))
        .await
        .unwrap();
    let customers = body_json(resp).await;
    assert_eq!(customers.as_array().unwrap().len(), 1);

    // partial update keeps other fields and the id
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/customers/{cid}"),
            r#"{"last_name":"Lovelace","id":"hijack"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["first_name"], "Ada");
    assert_eq!(updated["last_name"], "Lovelace");
    assert_eq!(updated["id"], cid.as_str());

    // delete cascades to children
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/customers/{cid}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted = body_json(resp).await;
    assert_eq!(deleted["deleted"], true);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/customers/{cid}/bank")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
