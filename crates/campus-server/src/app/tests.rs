use crate::AppConfig;
use crate::app::api_router;
use crate::db::migration;
use crate::permissions::extract;
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::{Extension, Router};
use campus_core::assistant::WebhookUrls;
use campus_db::assistant::assistant as assistant_db;
use campus_db::sea_orm::{Database, DatabaseConnection};
use campus_test_helpers::{SqliteDb, TestDb};
use campus_utils::media::MediaStorage;
use campus_voice::{Agent, AgentApi, CreateAgent, Error as VoiceError, UpdateAgent};
use http::{Method, Request, StatusCode, header};
use protect_axum::GrantsLayer;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use test_log::test;
use tower::{ServiceBuilder, ServiceExt};
use url::Url;
use uuid::Uuid;

/// Voice vendor that accepts everything and numbers its agents.
#[derive(Default)]
struct StubAgentApi;

#[async_trait]
impl AgentApi for StubAgentApi {
    async fn create_agent(&self, agent: &CreateAgent) -> Result<Agent, VoiceError> {
        Ok(Agent {
            id: "agent_test".to_owned(),
            name: Some(agent.name.clone()),
            voice: Some(agent.voice.clone()),
        })
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, VoiceError> {
        Ok(Agent {
            id: agent_id.to_owned(),
            name: None,
            voice: None,
        })
    }

    async fn update_agent(&self, agent_id: &str, update: &UpdateAgent) -> Result<Agent, VoiceError> {
        Ok(Agent {
            id: agent_id.to_owned(),
            name: update.name.clone(),
            voice: update.voice.clone(),
        })
    }

    async fn delete_agent(&self, _agent_id: &str) -> Result<(), VoiceError> {
        Ok(())
    }

    async fn get_call(&self, call_id: &str) -> Result<Value, VoiceError> {
        Ok(json!({"call_id": call_id, "agent_id": "someone_else"}))
    }

    async fn list_calls(&self, agent_id: Option<&str>, _limit: u32) -> Result<Vec<Value>, VoiceError> {
        Ok(vec![json!({"call_id": "call_1", "agent_id": agent_id})])
    }

    async fn end_call(&self, call_id: &str) -> Result<Value, VoiceError> {
        Ok(json!({"call_id": call_id}))
    }
}

struct TestApp {
    router: Router,
    conn: DatabaseConnection,
    _db: SqliteDb,
    _media: TempDir,
}

impl TestApp {
    /// The api on a migrated sqlite file, without the metrics and sentry layers.
    async fn new(voice: Option<Arc<dyn AgentApi>>) -> Self {
        let db = SqliteDb::new().unwrap();
        migration(&Url::parse(&db.db_uri()).unwrap()).await.unwrap();
        let conn = Database::connect(db.db_uri().as_ref()).await.unwrap();

        let media = TempDir::with_prefix("campus-media").unwrap();
        let app_config = AppConfig::new(
            MediaStorage::new(media.path().to_path_buf()),
            voice,
            WebhookUrls::new(&Url::parse("http://localhost:3030").unwrap()).unwrap(),
            None,
        );

        let router = Router::new().nest("/api/v0", api_router()).layer(
            ServiceBuilder::new()
                .layer(Extension(app_config))
                .layer(Extension(conn.clone()))
                .layer(GrantsLayer::with_extractor(extract)),
        );
        Self {
            router,
            conn,
            _db: db,
            _media: media,
        }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Registers an account and returns its access token.
    async fn register(&self, username: &str, role: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v0/accounts/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.org"),
                    "role": role,
                    "accept_terms": true,
                    "accept_privacy": true,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["access_token"].as_str().unwrap().to_owned()
    }

    /// Creates a running course with one module and returns the course slug and module id.
    async fn create_course(&self, token: &str, title: &str) -> (String, String) {
        let (status, course) = self
            .request(
                Method::POST,
                "/api/v0/courses",
                Some(token),
                Some(json!({
                    "title": title,
                    "start_date": "2025-01-01",
                    "end_date": "2035-12-31",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{course}");
        let slug = course["slug"].as_str().unwrap().to_owned();

        let (status, module) = self
            .request(
                Method::POST,
                &format!("/api/v0/courses/{slug}/modules"),
                Some(token),
                Some(json!({"title": "Week 1"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{module}");
        (slug, module["id"].as_str().unwrap().to_owned())
    }
}

#[test(tokio::test)]
async fn test_status() {
    let app = TestApp::new(None).await;
    let (status, body) = app.request(Method::GET, "/api/v0/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], json!("ok"));
}

#[test(tokio::test)]
async fn test_register_and_me() {
    let app = TestApp::new(None).await;
    let token = app.register("ada", "student").await;

    let (status, me) = app.request(Method::GET, "/api/v0/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], json!("ada"));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v0/accounts/register",
            None,
            Some(json!({
                "username": "ada",
                "email": "other@example.org",
                "role": "student",
                "accept_terms": true,
                "accept_privacy": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[test(tokio::test)]
async fn test_requires_authentication() {
    let app = TestApp::new(None).await;
    let (status, _) = app.request(Method::GET, "/api/v0/accounts/me", None, None).await;
    assert!(status.is_client_error());

    let (status, _) = app
        .request(Method::GET, "/api/v0/dashboard", Some("not-a-token"), None)
        .await;
    assert!(status.is_client_error());
}

#[test(tokio::test)]
async fn test_students_cannot_create_courses() {
    let app = TestApp::new(None).await;
    let token = app.register("ben", "student").await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v0/courses",
            Some(&token),
            Some(json!({"title": "Sneaky", "start_date": "2025-01-01", "end_date": "2035-12-31"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[test(tokio::test)]
async fn test_course_content_requires_enrollment() {
    let app = TestApp::new(None).await;
    let teacher = app.register("grace", "teacher").await;
    let student = app.register("alan", "student").await;
    let (slug, module_id) = app.create_course(&teacher, "Compilers").await;
    let module_uri = format!("/api/v0/courses/{slug}/modules/{module_id}");

    let (status, _) = app.request(Method::GET, &module_uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::POST, &format!("/api/v0/courses/{slug}/enroll"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["student"]["username"], json!("alan"));

    let (status, module) = app.request(Method::GET, &module_uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK, "{module}");
    assert_eq!(module["title"], json!("Week 1"));

    let (status, dashboard) = app.request(Method::GET, "/api/v0/dashboard", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["view"], json!("student"));
    assert_eq!(dashboard["courses"].as_array().unwrap().len(), 1);
}

#[test(tokio::test)]
async fn test_assistant_requires_voice_vendor() {
    let app = TestApp::new(None).await;
    let teacher = app.register("grace", "teacher").await;
    let (slug, _) = app.create_course(&teacher, "Compilers").await;
    let (_, course) = app
        .request(Method::GET, &format!("/api/v0/courses/{slug}"), Some(&teacher), None)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v0/assistants",
            Some(&teacher),
            Some(json!({"course_id": course["id"]})),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{body}");
    assert_eq!(body["error"], json!("vendor_unavailable"));
}

#[test(tokio::test)]
async fn test_assistant_and_webhooks() {
    let app = TestApp::new(Some(Arc::new(StubAgentApi))).await;
    let teacher = app.register("grace", "teacher").await;
    let student = app.register("alan", "student").await;
    let (slug, _) = app.create_course(&teacher, "Compilers").await;
    let (_, course) = app
        .request(Method::GET, &format!("/api/v0/courses/{slug}"), Some(&teacher), None)
        .await;

    let (status, assistant) = app
        .request(
            Method::POST,
            "/api/v0/assistants",
            Some(&teacher),
            Some(json!({"course_id": course["id"], "voice": "echo"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{assistant}");
    assert_eq!(assistant["name"], json!("Compilers Assistant"));
    assert_eq!(assistant["agent_id"], json!("agent_test"));
    let assistant_id = assistant["id"].as_str().unwrap().to_owned();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v0/assistants",
            Some(&teacher),
            Some(json!({"course_id": course["id"]})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Not enrolled yet
    let (status, _) = app
        .request(Method::GET, &format!("/api/v0/assistants/{assistant_id}/call"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    app.request(Method::POST, &format!("/api/v0/courses/{slug}/enroll"), Some(&student), None)
        .await;
    let (status, call) = app
        .request(Method::GET, &format!("/api/v0/assistants/{assistant_id}/call"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{call}");
    assert_eq!(call["agent_id"], json!("agent_test"));

    // The stub reports calls of another agent
    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v0/assistants/{assistant_id}/calls/call_9"),
            Some(&teacher),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = assistant_db::Query::find_by_agent_id(&app.conn, "agent_test")
        .await
        .unwrap()
        .unwrap();
    let webhook_token = stored.webhook_token.unwrap();
    let payload = json!({
        "agent_id": "agent_test",
        "session_id": "session_1",
        "call_id": "call_1",
        "message": {"role": "user", "content": "When is the assignment due?"},
    });

    let (status, body) = app
        .request(Method::POST, "/api/v0/assistants/webhooks/llm", Some("wrong"), Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v0/assistants/webhooks/llm",
            Some(&webhook_token),
            Some(payload),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[0]["role"], json!("system"));
    assert_eq!(messages[1]["role"], json!("assistant"));

    let (_, me) = app.request(Method::GET, "/api/v0/accounts/me", Some(&student), None).await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v0/assistants/webhooks/register",
            Some(&webhook_token),
            Some(json!({
                "agent_id": "agent_test",
                "session_id": "session_1",
                "call_id": "call_1",
                "user_id": me["id"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], json!(true));

    let (status, detail) = app
        .request(Method::GET, &format!("/api/v0/assistants/{assistant_id}"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    let conversations = detail["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);

    let conversation_id = conversations[0]["id"].as_str().unwrap();
    let (status, transcript) = app
        .request(
            Method::GET,
            &format!("/api/v0/assistants/conversations/{conversation_id}"),
            Some(&teacher),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{transcript}");
    assert_eq!(transcript["messages"].as_array().unwrap().len(), 3);
}

#[test(tokio::test)]
async fn test_webhook_errors() {
    let app = TestApp::new(None).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v0/assistants/webhooks/llm",
            None,
            Some(json!({"agent_id": "agent_unknown", "session_id": "s"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Assistant not found"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v0/assistants/webhooks/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid payload"));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v0/assistants/webhooks/register",
            None,
            Some(json!({"agent_id": "agent_unknown", "session_id": "s", "user_id": Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}
