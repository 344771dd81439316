#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use school_scheduler_api::config::config;
use school_scheduler_api::database::MemoryStore;
use school_scheduler_api::router;
use school_scheduler_api::state::AppState;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The application served in-process over a fresh in-memory store. It runs on
/// its own thread and runtime so it outlives each test's runtime, and goes
/// away with the test process.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    fn start() -> Result<Self> {
        // Port 0 lets the OS pick an unused port
        let listener = TcpListener::bind("127.0.0.1:0").context("failed to bind test listener")?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();
        let base_url = format!("http://127.0.0.1:{}", port);

        std::thread::Builder::new()
            .name("test-server".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .expect("failed to build server runtime");
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener).expect("failed to adopt listener");
                    let app = router::app(AppState::new(Arc::new(MemoryStore::new())), config());
                    axum::serve(listener, app).await.expect("test server failed");
                });
            })
            .context("failed to start server thread")?;

        Ok(Self { port, base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::start().expect("failed to start test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Thin JSON client over the running server
pub struct Api {
    base_url: String,
    client: reqwest::Client,
}

impl Api {
    pub async fn new() -> Result<Self> {
        let server = ensure_server().await?;
        Ok(Self {
            base_url: format!("{}/api/v1", server.base_url),
            client: reqwest::Client::new(),
        })
    }

    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn get(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, Some(body)).await
    }

    /// POST and return the new record's id, failing unless it was created
    pub async fn create(&self, path: &str, body: Value) -> Result<String> {
        let (status, body) = self.post(path, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create {} failed with {}: {}", path, status, body);
        body["payload"]["_id"]
            .as_str()
            .map(str::to_string)
            .context("created record has no _id")
    }

    pub async fn school(&self, group_max: i64) -> Result<String> {
        self.create("/schools", json!({ "name": unique("School"), "groupMaxNumStudents": group_max }))
            .await
    }

    pub async fn user(&self, school_id: &str, role: &str, status: &str, teaches: bool) -> Result<String> {
        self.create(
            "/users",
            json!({
                "school_id": school_id,
                "firstName": "Ana",
                "lastName": "Lopez",
                "email": format!("user.{}@school.test", token()),
                "password": "correct-horse",
                "role": role,
                "status": status,
                "hasTeachingFunc": teaches
            }),
        )
        .await
    }

    pub async fn schedule(&self, school_id: &str, day_start: i64, shift: i64, unit: i64) -> Result<String> {
        self.create("/schedules", schedule_body(school_id, day_start, shift, unit)).await
    }

    pub async fn level(&self, school_id: &str, schedule_id: &str) -> Result<String> {
        self.create(
            "/levels",
            json!({ "school_id": school_id, "schedule_id": schedule_id, "name": unique("Level") }),
        )
        .await
    }
}

pub fn schedule_body(school_id: &str, day_start: i64, shift: i64, unit: i64) -> Value {
    json!({
        "school_id": school_id,
        "name": unique("Shift"),
        "dayStart": day_start,
        "shiftNumberMinutes": shift,
        "classUnitMinutes": unit,
        "monday": true,
        "tuesday": true,
        "wednesday": true,
        "thursday": true,
        "friday": true,
        "saturday": false,
        "sunday": false
    })
}

/// Name that will not collide across tests sharing one server
pub fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, token())
}

pub fn token() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

pub fn msg(body: &Value) -> &str {
    body["msg"].as_str().unwrap_or_default()
}
