use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, SignupRequest},
        errors::AuthError,
        extractors::Payload,
        services,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Payload(payload): Payload<SignupRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    services::register(state.store.as_ref(), &state.hasher, payload).await?;
    Ok(Json(MessageResponse {
        message: "User registered successfully!".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let user = services::authenticate(state.store.as_ref(), &state.hasher, payload).await?;
    Ok(Json(MessageResponse {
        message: format!("Welcome, {}!", user.full_name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::test_service;
    use crate::auth::repo::memory::MemoryCredentialStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::default());
        let state = AppState::from_parts(store.clone(), Arc::new(test_service()));
        (auth_routes().with_state(state), store)
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, req).await
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn signup_then_login_greets_by_name() {
        let (app, _) = test_app();

        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"full_name": "Ann Lee", "email": "ann@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User registered successfully!"}));

        let (status, body) = post_json(
            &app,
            "/login",
            json!({"email": "ann@example.com", "password": "pw"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Welcome, Ann Lee!"}));
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_client_error() {
        let (app, store) = test_app();
        let body = json!({"fullname": "Ann", "email": "ann@example.com", "password": "pw"});

        let (status, _) = post_json(&app, "/signup", body.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json(&app, "/signup", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Email already exists"}));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_on_both_routes() {
        let (app, store) = test_app();

        let (status, signup_body) =
            post_json(&app, "/signup", json!({"email": "ann@example.com"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, login_body) = post_json(&app, "/login", json!({"password": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(signup_body, json!({"message": "All fields are required"}));
        assert_eq!(signup_body, login_body);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn malformed_body_counts_as_missing_fields() {
        let (app, store) = test_app();
        let req = Request::post("/signup")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "All fields are required"}));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (app, _) = test_app();
        post_json(
            &app,
            "/signup",
            json!({"full_name": "Ann", "email": "ann@example.com", "password": "pw"}),
        )
        .await;

        let unknown = post_json(
            &app,
            "/login",
            json!({"email": "nobody@example.com", "password": "pw"}),
        )
        .await;
        let wrong = post_json(
            &app,
            "/login",
            json!({"email": "ann@example.com", "password": "bad"}),
        )
        .await;

        assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.1, json!({"message": "Invalid email or password"}));
    }

    #[tokio::test]
    async fn form_posts_are_accepted() {
        let (app, _) = test_app();
        let req = Request::post("/signup")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "fullname=Ann+Lee&email=ann%40example.com&password=pw",
            ))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::post("/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=ann%40example.com&password=pw"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Welcome, Ann Lee!"}));
    }

    #[tokio::test]
    async fn responses_never_echo_the_password() {
        let (app, _) = test_app();
        let (_, body) = post_json(
            &app,
            "/signup",
            json!({"full_name": "Ann", "email": "ann@example.com", "password": "pw-9f8e7d"}),
        )
        .await;
        assert!(!body.to_string().contains("pw-9f8e7d"));
        assert!(!body.to_string().contains("argon2"));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn rejected_body_does_not_log_submitted_values() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (app, _) = test_app();
        let (status, _) = post_json(
            &app,
            "/login",
            json!({"email": "ann@example.com", "password": 98765432}),
        )
        .await;
        let (signup_status, _) = post_json(
            &app,
            "/signup",
            json!({"full_name": "Ann", "email": "ann@example.com", "password": ["hunter2-x9"]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(signup_status, StatusCode::BAD_REQUEST);
        let log = logs.contents();
        assert!(log.contains("unreadable request body"), "{log}");
        assert!(!log.contains("98765432"), "{log}");
        assert!(!log.contains("hunter2-x9"), "{log}");
    }

    #[tokio::test]
    async fn form_content_type_is_matched_case_insensitively() {
        let (app, store) = test_app();
        let req = Request::post("/signup")
            .header(CONTENT_TYPE, "Application/X-WWW-Form-Urlencoded; charset=UTF-8")
            .body(Body::from("fullname=Ann&email=ann%40example.com&password=pw"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(store.len().await, 1);
    }
}
