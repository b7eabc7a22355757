// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::Request,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authorization_gate, enforce_access_policy},
    models::{Book, BookDetails, HttpResponse, ResponseData, UserLoginForm, UserRegistration},
    state::AppState,
};

pub mod books;
pub mod extract;
pub mod health;
pub mod users;

/// Build the application router.
///
/// Requests pass, outermost first: request id, tracing, authorization gate,
/// access policy, handler.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/books",
            get(books::get_all_books).post(books::create_book),
        )
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/register", post(users::register))
        .route("/books/login", post(users::login))
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state.clone());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(state.policy.clone(), enforce_access_policy))
        .layer(from_fn_with_state(state.gate.clone(), authorization_gate))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        books::get_all_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        users::register,
        users::login,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Book,
            BookDetails,
            HttpResponse,
            ResponseData,
            UserRegistration,
            UserLoginForm,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Books", description = "Book catalogue management"),
        (name = "Users", description = "Registration and login"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{header, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{Authorities, Principal};
    use crate::config::TopicsConfig;
    use crate::events::{provision_topics, BookEventProducer, Subscription, TopicBroker};
    use crate::storage::Database;

    const SECRET: &str = "router-test-secret";

    struct TestApp {
        app: Router,
        state: AppState,
        broker: Arc<TopicBroker>,
        _dir: TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let db = Arc::new(Database::open(&dir.path().join("books.redb")).unwrap());

            let topics = TopicsConfig::default();
            let mut broker = TopicBroker::new();
            provision_topics(&mut broker, &topics);
            let broker = Arc::new(broker);
            let producer =
                BookEventProducer::new(Arc::clone(&broker), topics.input_output_topic.clone());

            let state = AppState::new(db, SECRET, producer).unwrap();
            Self {
                app: router(state.clone()),
                state,
                broker,
                _dir: dir,
            }
        }

        fn subscribe(&self) -> Subscription {
            self.broker
                .subscribe(&TopicsConfig::default().input_output_topic, "test")
                .unwrap()
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            self.send_raw(request).await
        }

        async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }

        async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
            self.send(
                "POST",
                "/books/register",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await
        }

        async fn login_token(&self, email: &str, password: &str) -> String {
            self.register(email, password).await;
            let (status, body) = self
                .send(
                    "POST",
                    "/books/login",
                    None,
                    Some(json!({"email": email, "password": password})),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            body["data"][1]
                .as_str()
                .unwrap()
                .strip_prefix("access_token: ")
                .unwrap()
                .to_string()
        }

        fn token_for(&self, subject: &str, roles: &str) -> String {
            let principal = Principal::new(subject, Authorities::from_role_string(roles), "");
            self.state.issuer.issue(&principal).unwrap()
        }
    }

    fn book_json(title: &str) -> Value {
        json!({
            "title": title,
            "author": "Frank Herbert",
            "bookLanguage": "English",
            "price": 40.0
        })
    }

    #[tokio::test]
    async fn register_creates_user() {
        let t = TestApp::new();
        let (status, body) = t.register("reader@example.com", "secret").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["httpStatus"], "CREATED");
        assert_eq!(body["message"], "User Created with name :reader@example.com");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let t = TestApp::new();
        t.register("reader@example.com", "secret").await;
        let (status, body) = t.register("reader@example.com", "other").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["reason"],
            "Email already used. Please use new email and try again."
        );
    }

    #[tokio::test]
    async fn register_reports_validation_messages() {
        let t = TestApp::new();
        let (status, body) = t.register("not-an-email", "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["reason"],
            "Invalid email. Please enter a valid email address, Password cannot be null or empty"
        );
    }

    #[tokio::test]
    async fn empty_email_reports_only_the_required_message() {
        let t = TestApp::new();
        let (status, body) = t.register("", "secret").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "Email cannot be null or empty");
    }

    #[tokio::test]
    async fn malformed_json_is_rendered_as_envelope() {
        let t = TestApp::new();
        let (status, body) = t
            .send_raw(
                Request::builder()
                    .method("POST")
                    .uri("/books/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["httpStatus"], "BAD_REQUEST");
        assert!(body["reason"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse the request body as JSON"));
    }

    #[tokio::test]
    async fn missing_content_type_is_rendered_as_envelope() {
        let t = TestApp::new();
        let (status, body) = t
            .send_raw(
                Request::builder()
                    .method("POST")
                    .uri("/books/login")
                    .body(Body::from(r#"{"email":"a@b.com","password":"x"}"#))
                    .unwrap(),
            )
            .await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["statusCode"], 415);
        assert_eq!(body["httpStatus"], "UNSUPPORTED_MEDIA_TYPE");
        assert!(body["reason"]
            .as_str()
            .unwrap()
            .contains("Content-Type: application/json"));
    }

    #[tokio::test]
    async fn non_numeric_book_id_is_rendered_as_envelope() {
        let t = TestApp::new();
        let token = t.token_for("reader@example.com", "ROLE_USER");
        let (status, body) = t.send("GET", "/books/abc", Some(&token), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert!(body["reason"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_bad_credentials() {
        let t = TestApp::new();
        t.register("reader@example.com", "secret").await;
        let (status, body) = t
            .send(
                "POST",
                "/books/login",
                None,
                Some(json!({"email": "reader@example.com", "password": "wrong"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "Bad credentials");
    }

    #[tokio::test]
    async fn login_returns_user_name_and_token() {
        let t = TestApp::new();
        t.register("reader@example.com", "secret").await;
        let (_, body) = t
            .send(
                "POST",
                "/books/login",
                None,
                Some(json!({"email": "reader@example.com", "password": "secret"})),
            )
            .await;

        assert_eq!(body["message"], "Login Successful");
        assert_eq!(body["data"][0], "user name: reader@example.com");
        assert!(body["data"][1].as_str().unwrap().starts_with("access_token: "));
    }

    #[tokio::test]
    async fn books_require_authentication() {
        let t = TestApp::new();
        let (status, body) = t.send("GET", "/books", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["reason"],
            "Full authentication is required to access this resource"
        );
    }

    #[tokio::test]
    async fn books_require_a_book_role() {
        let t = TestApp::new();
        let token = t.token_for("auditor@example.com", "ROLE_AUDITOR");
        let (status, body) = t.send("GET", "/books", Some(&token), None).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "Access Denied");
    }

    #[tokio::test]
    async fn expired_token_is_rejected_with_expiry_reason() {
        let t = TestApp::new();
        let principal = Principal::new(
            "u@x.com",
            Authorities::from_role_string("ROLE_ADMIN"),
            "",
        );
        let token = t
            .state
            .issuer
            .issue_at(&principal, Utc::now() - Duration::hours(1))
            .unwrap();

        let (status, body) = t.send("GET", "/books", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["reason"]
            .as_str()
            .unwrap()
            .starts_with("The Token has expired on "));

        let fresh = t.token_for("u@x.com", "ROLE_ADMIN");
        let (status, _) = t.send("GET", "/books", Some(&fresh), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn book_lifecycle() {
        let t = TestApp::new();
        let token = t.login_token("reader@example.com", "secret").await;

        let (_, body) = t.send("GET", "/books", Some(&token), None).await;
        assert_eq!(body["message"], "No book found");

        let (status, body) = t
            .send("POST", "/books", Some(&token), Some(book_json("Dune")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["message"], "Successfully created a new book with id: 1");
        assert_eq!(body["data"][0]["title"], "Dune");

        let (_, body) = t.send("GET", "/books/1", Some(&token), None).await;
        assert_eq!(body["message"], "Successfully retrieved book with id: 1");
        assert_eq!(body["data"][0]["bookLanguage"], "English");

        let (_, body) = t
            .send("PUT", "/books/1", Some(&token), Some(book_json("Dune Messiah")))
            .await;
        assert_eq!(body["message"], "Successfully updated book with id: 1");
        assert_eq!(body["data"][0]["title"], "Dune Messiah");

        let (_, body) = t.send("GET", "/books", Some(&token), None).await;
        assert_eq!(body["message"], "Successfully retrieved all books");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = t.send("DELETE", "/books/1", Some(&token), None).await;
        assert_eq!(body["message"], "Successfully deleted book with id: 1");
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn missing_book_is_reported() {
        let t = TestApp::new();
        let token = t.token_for("admin@example.com", "ROLE_ADMIN");

        let (status, body) = t.send("GET", "/books/99", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "No book found for the id: 99");
        assert!(body.get("data").is_none());

        let (status, body) = t
            .send("PUT", "/books/99", Some(&token), Some(book_json("x")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "No book exists for the given id: 99");

        let (status, body) = t.send("DELETE", "/books/99", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "No book exists for the given id: 99");
    }

    #[tokio::test]
    async fn created_book_is_published() {
        let t = TestApp::new();
        let mut subscription = t.subscribe();
        let token = t.token_for("admin@example.com", "ROLE_ADMIN");

        t.send("POST", "/books", Some(&token), Some(book_json("Dune")))
            .await;

        let record = subscription.next().await.unwrap();
        assert_eq!(record.key, r#"{"bookId":1}"#);
        let value: Value = serde_json::from_str(&record.value).unwrap();
        assert_eq!(value["title"], "Dune");
    }

    #[tokio::test]
    async fn public_endpoints_need_no_token() {
        let t = TestApp::new();

        let (status, body) = t.send("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = t.send("GET", "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"], "ok");
        assert_eq!(body["checks"]["events"], "ok");

        let (status, body) = t.send("GET", "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/books/{id}"].is_object());
        assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let t = TestApp::new();
        let response = t
            .app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
