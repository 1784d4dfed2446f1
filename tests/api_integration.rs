//! HTTP-level tests for the template and media resources
//!
//! These drive the full axum router in-process; no listener is bound.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use content_service::auth::Claims;
use content_service::config::{JwtConfig, OtelConfig, RenderConfig, ServerConfig, Settings};
use content_service::server::{create_app, AppState};
use content_service::template::VariablePolicy;

const SECRET: &str = "integration-test-secret";
const ORGANIZATION: &str = "002220647";
const OTHER_ORGANIZATION: &str = "123456789";

fn settings(policy: VariablePolicy) -> Settings {
    Settings {
        server: ServerConfig::default(),
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            issuer: None,
            audience: None,
        },
        render: RenderConfig {
            variable_policy: policy,
        },
        otel: OtelConfig::default(),
    }
}

fn create_test_app(policy: VariablePolicy) -> Router {
    create_app(AppState::new(settings(policy)))
}

fn token(application: &str, organization: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: application.to_string(),
        exp: now + 3600,
        iat: now,
        organization: Some(organization.to_string()),
        extra: Default::default(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

struct TestResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Value,
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        content_type,
        body,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn authed(method: Method, uri: &str, payload: Option<Value>) -> Request<Body> {
    authed_for(ORGANIZATION, method, uri, payload)
}

fn authed_for(
    organization: &str,
    method: Method,
    uri: &str,
    payload: Option<Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", token("app-1", organization)),
        );

    match payload {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn welcome_payload() -> Value {
    json!({
        "kind": "page",
        "internalName": "Welcome page",
        "externalTitle": "Welcome {{user}}",
        "body": "Dear {{user}}, visit {{link}}.",
        "description": "First page of the process",
        "contactPerson": "https://example.org/contacts/1"
    })
}

async fn create(app: &Router, payload: Value) -> Value {
    let response = send(app, authed(Method::POST, "/api/v1/templates", Some(payload))).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

#[tokio::test]
async fn test_create_assigns_server_owned_fields() {
    let app = create_test_app(VariablePolicy::Discard);

    let mut payload = welcome_payload();
    payload["id"] = json!(999);
    payload["sourceOrganization"] = json!("999999999");
    payload["owner"] = json!("intruder");

    let created = create(&app, payload).await;

    assert_eq!(created["id"], 1);
    assert_eq!(created["sourceOrganization"], ORGANIZATION);
    assert_eq!(created["owner"], "app-1");
    assert_eq!(created["kind"], "page");
    assert!(created.get("createdAt").is_some());
    assert!(created.get("changeLog").is_none());
    assert!(created.get("variables").is_none());
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let app = create_test_app(VariablePolicy::Discard);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/templates")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(welcome_payload().to_string()))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_reports_field_violations() {
    let app = create_test_app(VariablePolicy::Discard);

    let mut payload = welcome_payload();
    payload["internalName"] = json!("");
    payload["body"] = json!("x".repeat(2501));

    let response = send(&app, authed(Method::POST, "/api/v1/templates", Some(payload))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<_> = response.body["error"]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["internalName", "body"]);
}

#[tokio::test]
async fn test_get_and_list() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, welcome_payload()).await;
    create(&app, welcome_payload()).await;

    let fetched = send(&app, get("/api/v1/templates/2")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["id"], 2);
    assert_eq!(fetched.body["externalTitle"], "Welcome {{user}}");

    let listed = send(&app, get("/api/v1/templates")).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["total"], 2);
    assert_eq!(listed.body["templates"][0]["id"], 1);

    let missing = send(&app, get("/api/v1/templates/42")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"]["code"], "TEMPLATE_NOT_FOUND");
}

#[tokio::test]
async fn test_render_discards_variables_by_default() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, welcome_payload()).await;

    let response = send(&app, get("/api/v1/templates/1/render?user=Alice")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        response.body,
        json!({
            "id": 1,
            "externalTitle": "Welcome ",
            "body": "Dear , visit .",
            "variables": {"user": "Alice"}
        })
    );
}

#[tokio::test]
async fn test_render_applies_variables_when_enabled() {
    let app = create_test_app(VariablePolicy::Apply);
    create(&app, welcome_payload()).await;

    let response = send(
        &app,
        get("/api/v1/templates/1/render?user=Alice&link=https%3A%2F%2Fexample.org"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["externalTitle"], "Welcome Alice");
    assert_eq!(response.body["body"], "Dear Alice, visit https://example.org.");
}

#[tokio::test]
async fn test_render_does_not_change_stored_template() {
    let app = create_test_app(VariablePolicy::Apply);
    create(&app, welcome_payload()).await;
    let before = send(&app, get("/api/v1/templates/1")).await.body;

    send(&app, get("/api/v1/templates/1/render?user=Alice")).await;
    send(&app, get("/api/v1/templates/1/render?user=Bob")).await;

    let after = send(&app, get("/api/v1/templates/1")).await.body;
    assert_eq!(before, after);

    let log = send(&app, get("/api/v1/templates/1/log")).await.body;
    assert_eq!(log["changeLog"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_render_missing_template() {
    let app = create_test_app(VariablePolicy::Discard);

    let response = send(&app, get("/api/v1/templates/7/render")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "TEMPLATE_NOT_FOUND");
}

#[tokio::test]
async fn test_render_malformed_template() {
    let app = create_test_app(VariablePolicy::Discard);
    let mut payload = welcome_payload();
    payload["body"] = json!("Hello {{name");
    create(&app, payload).await;

    let response = send(&app, get("/api/v1/templates/1/render")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "TEMPLATE_SYNTAX_ERROR");
    assert!(response.body.get("externalTitle").is_none());
    assert!(response.body.get("body").is_none());
}

#[tokio::test]
async fn test_post_to_render_route_is_not_rendered() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, welcome_payload()).await;

    let response = send(&app, authed(Method::POST, "/api/v1/templates/1/render", None)).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_replace_and_revert() {
    let app = create_test_app(VariablePolicy::Discard);
    let created = create(&app, welcome_payload()).await;

    let mut replacement = welcome_payload();
    replacement["externalTitle"] = json!("Hello again");
    replacement["kind"] = json!("message");

    let replaced = send(
        &app,
        authed(Method::PUT, "/api/v1/templates/1", Some(replacement)),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::OK);
    assert_eq!(replaced.body["externalTitle"], "Hello again");
    assert_eq!(replaced.body["kind"], "message");
    assert_eq!(replaced.body["createdAt"], created["createdAt"]);
    assert_eq!(replaced.body["owner"], created["owner"]);

    let reverted = send(&app, authed(Method::POST, "/api/v1/templates/1/revert/1", None)).await;
    assert_eq!(reverted.status, StatusCode::ACCEPTED);
    assert_eq!(reverted.body["externalTitle"], "Welcome {{user}}");
    assert_eq!(reverted.body["kind"], "page");

    let log = send(&app, get("/api/v1/templates/1/log")).await;
    assert_eq!(log.status, StatusCode::OK);
    let versions: Vec<_> = log.body["changeLog"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["version"].as_u64().unwrap())
        .collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert!(log.body.get("id").is_none());

    let unknown = send(&app, authed(Method::POST, "/api/v1/templates/1/revert/9", None)).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"]["code"], "VERSION_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_hides_template() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, welcome_payload()).await;

    let deleted = send(&app, authed(Method::DELETE, "/api/v1/templates/1", None)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    assert_eq!(
        send(&app, get("/api/v1/templates/1")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&app, get("/api/v1/templates/1/render")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(send(&app, get("/api/v1/templates")).await.body["total"], 0);
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, welcome_payload()).await;

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["templates"], 1);
    assert_eq!(response.body["variable_policy"], "discard");
}

fn violation_fields(body: &Value) -> Vec<String> {
    body["error"]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap().to_string())
        .collect()
}

fn ids(body: &Value, collection: &str) -> Vec<u64> {
    body[collection]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect()
}

fn identified_payload(identifier: &str) -> Value {
    let mut payload = welcome_payload();
    payload["externalIdentifier"] = json!(identifier);
    payload
}

#[tokio::test]
async fn test_external_identifier_taken_in_same_organization() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, identified_payload("welcome")).await;

    let duplicate = send(
        &app,
        authed(
            Method::POST,
            "/api/v1/templates",
            Some(identified_payload("welcome")),
        ),
    )
    .await;

    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(violation_fields(&duplicate.body), vec!["externalIdentifier"]);
    assert_eq!(send(&app, get("/api/v1/templates")).await.body["total"], 1);
}

#[tokio::test]
async fn test_external_identifier_free_in_other_organization() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, identified_payload("welcome")).await;

    let other = send(
        &app,
        authed_for(
            OTHER_ORGANIZATION,
            Method::POST,
            "/api/v1/templates",
            Some(identified_payload("welcome")),
        ),
    )
    .await;

    assert_eq!(other.status, StatusCode::CREATED, "{}", other.body);
    assert_eq!(other.body["sourceOrganization"], OTHER_ORGANIZATION);
    assert_eq!(other.body["externalIdentifier"], "welcome");
}

#[tokio::test]
async fn test_replace_keeps_own_external_identifier() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, identified_payload("welcome")).await;
    create(&app, identified_payload("reminder")).await;

    let mut replacement = identified_payload("welcome");
    replacement["externalTitle"] = json!("Welcome back");
    let replaced = send(
        &app,
        authed(Method::PUT, "/api/v1/templates/1", Some(replacement)),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::OK, "{}", replaced.body);
    assert_eq!(replaced.body["externalTitle"], "Welcome back");

    let stolen = send(
        &app,
        authed(
            Method::PUT,
            "/api/v1/templates/1",
            Some(identified_payload("reminder")),
        ),
    )
    .await;
    assert_eq!(stolen.status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&stolen.body), vec!["externalIdentifier"]);
}

#[tokio::test]
async fn test_deleted_template_releases_external_identifier() {
    let app = create_test_app(VariablePolicy::Discard);
    create(&app, identified_payload("welcome")).await;

    send(&app, authed(Method::DELETE, "/api/v1/templates/1", None)).await;

    let recreated = create(&app, identified_payload("welcome")).await;
    assert_eq!(recreated["id"], 2);
}

#[tokio::test]
async fn test_list_filters_and_orders() {
    let app = create_test_app(VariablePolicy::Discard);

    let mut reminder = welcome_payload();
    reminder["kind"] = json!("message");
    reminder["internalName"] = json!("Payment reminder");
    reminder["body"] = json!("Please pay {{amount}}");

    let mut about = welcome_payload();
    about["internalName"] = json!("About page");
    about["body"] = json!("Who we are");

    create(&app, welcome_payload()).await;
    create(&app, reminder).await;
    create(&app, about).await;

    let pages = send(&app, get("/api/v1/templates?kind=page")).await;
    assert_eq!(pages.status, StatusCode::OK);
    assert_eq!(pages.body["total"], 2);
    assert_eq!(ids(&pages.body, "templates"), vec![1, 3]);

    let partial = send(&app, get("/api/v1/templates?body=PAY")).await;
    assert_eq!(ids(&partial.body, "templates"), vec![2]);

    let ordered = send(
        &app,
        get("/api/v1/templates?order%5BinternalName%5D=desc"),
    )
    .await;
    assert_eq!(ids(&ordered.body, "templates"), vec![1, 2, 3]);

    let ordered = send(&app, get("/api/v1/templates?order%5BinternalName%5D=asc")).await;
    assert_eq!(ids(&ordered.body, "templates"), vec![3, 2, 1]);

    let organization = send(
        &app,
        get(&format!("/api/v1/templates?sourceOrganization={}", OTHER_ORGANIZATION)),
    )
    .await;
    assert_eq!(organization.body["total"], 0);

    let invalid = send(&app, get("/api/v1/templates?order%5Bkind%5D=sideways")).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_page_metadata_round_trip() {
    let app = create_test_app(VariablePolicy::Discard);

    let mut payload = welcome_payload();
    payload["slug"] = json!("welcome");
    payload["metaDescription"] = json!("The first page");
    payload["metaRobots"] = json!("noindex, nofollow");
    payload["metaCanonical"] = json!("https://example.org/welcome");

    let created = create(&app, payload).await;
    assert_eq!(created["slug"], "welcome");
    assert_eq!(created["metaRobots"], "noindex, nofollow");

    let by_slug = send(&app, get("/api/v1/templates?slug=welcome")).await;
    assert_eq!(ids(&by_slug.body, "templates"), vec![1]);

    let rendered = send(&app, get("/api/v1/templates/1/render")).await;
    assert!(rendered.body.get("slug").is_none());
}

#[tokio::test]
async fn test_page_metadata_rejected_on_message() {
    let app = create_test_app(VariablePolicy::Discard);

    let mut payload = welcome_payload();
    payload["kind"] = json!("message");
    payload["metaKeywords"] = json!("welcome");

    let response = send(&app, authed(Method::POST, "/api/v1/templates", Some(payload))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&response.body), vec!["metaKeywords"]);

    let mut payload = welcome_payload();
    payload["metaAuthor"] = json!("a".repeat(256));
    let response = send(&app, authed(Method::POST, "/api/v1/templates", Some(payload))).await;
    assert_eq!(violation_fields(&response.body), vec!["metaAuthor"]);
}

fn document_payload(name: &str) -> Value {
    json!({
        "name": name,
        "originalName": format!("{}.pdf", name),
        "size": 52_000,
        "extension": "pdf",
        "mimeType": "application/pdf",
        "url": format!("https://files.example.org/{}.pdf", name)
    })
}

#[tokio::test]
async fn test_media_crud_log_and_revert() {
    let app = create_test_app(VariablePolicy::Discard);

    for collection in ["documents", "images", "films"] {
        let uri = format!("/api/v1/{}", collection);

        let created = send(
            &app,
            authed(Method::POST, &uri, Some(document_payload("report"))),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        assert_eq!(created.body["id"], 1);
        assert_eq!(created.body["owner"], "app-1");
        assert_eq!(created.body["sourceOrganization"], ORGANIZATION);
        assert!(created.body.get("changeLog").is_none());

        let item_uri = format!("{}/1", uri);
        let replaced = send(
            &app,
            authed(Method::PUT, &item_uri, Some(document_payload("summary"))),
        )
        .await;
        assert_eq!(replaced.status, StatusCode::OK);
        assert_eq!(replaced.body["name"], "summary");

        let reverted = send(
            &app,
            authed(Method::POST, &format!("{}/revert/1", item_uri), None),
        )
        .await;
        assert_eq!(reverted.status, StatusCode::ACCEPTED);
        assert_eq!(reverted.body["name"], "report");

        let log = send(&app, get(&format!("{}/log", item_uri))).await;
        assert_eq!(log.body["changeLog"].as_array().unwrap().len(), 3);

        let listed = send(&app, get(&format!("{}?name=REP", uri))).await;
        assert_eq!(listed.body["total"], 1);
        assert_eq!(ids(&listed.body, collection), vec![1]);

        let deleted = send(&app, authed(Method::DELETE, &item_uri, None)).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let missing = send(&app, get(&item_uri)).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.body["error"]["code"], "RESOURCE_NOT_FOUND");
    }

    // Templates keep their own id sequence
    assert_eq!(create(&app, welcome_payload()).await["id"], 1);
}

#[tokio::test]
async fn test_media_validation_and_render_route() {
    let app = create_test_app(VariablePolicy::Discard);

    let mut invalid = document_payload("logo");
    invalid["name"] = json!("");
    invalid["mimeType"] = json!("png");
    let response = send(
        &app,
        authed(Method::POST, "/api/v1/images", Some(invalid)),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&response.body), vec!["name", "mimeType"]);

    send(
        &app,
        authed(Method::POST, "/api/v1/images", Some(document_payload("logo"))),
    )
    .await;
    let render = send(&app, get("/api/v1/images/1/render")).await;
    assert_eq!(render.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = create_test_app(VariablePolicy::Discard);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/templates")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("app-1", ORGANIZATION)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"kind\": "))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body["error"]["code"], "INVALID_BODY");
    assert!(response.body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_uses_error_envelope() {
    let app = create_test_app(VariablePolicy::Discard);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/documents")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("app-1", ORGANIZATION)))
        .body(Body::from(document_payload("report").to_string()))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_non_numeric_id_uses_error_envelope() {
    let app = create_test_app(VariablePolicy::Discard);

    for uri in [
        "/api/v1/templates/abc",
        "/api/v1/templates/abc/render",
        "/api/v1/films/abc/log",
    ] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.body["error"]["code"], "INVALID_PATH", "{}", uri);
    }

    let revert = send(
        &app,
        authed(Method::POST, "/api/v1/templates/1/revert/latest", None),
    )
    .await;
    assert_eq!(revert.body["error"]["code"], "INVALID_PATH");
}

#[tokio::test]
async fn test_health_counts_media() {
    let app = create_test_app(VariablePolicy::Discard);
    send(
        &app,
        authed(Method::POST, "/api/v1/films", Some(document_payload("intro"))),
    )
    .await;

    let response = send(&app, get("/health")).await;
    assert_eq!(response.body["films"], 1);
    assert_eq!(response.body["documents"], 0);
    assert_eq!(response.body["templates"], 0);
}
