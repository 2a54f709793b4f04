#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use church_ssl::config::AppConfig;
use church_ssl::database::MemoryStore;
use church_ssl::models::language::ENGLISH_ID;
use church_ssl::{build_router, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let app = build_router(AppState::new(Arc::new(MemoryStore::new()), &AppConfig::development()));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

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

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Fresh server with an empty in-memory store. The server lives on the
/// calling test's runtime, so every test starts its own.
pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Valid create/update body with one section per given day
pub fn lesson_body(title: &str, year: i32, quarter: &str, days: &[&str]) -> Value {
    let sections: Vec<Value> = days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            json!({
                "day": day,
                "content": format!("Study for {}", day),
                "bibleTexts": format!("Ps {}", i + 1),
                "order": i,
            })
        })
        .collect();

    json!({
        "title": title,
        "content": "<p>Lesson body</p>",
        "year": year,
        "quarter": quarter,
        "languageId": ENGLISH_ID,
        "isPublished": true,
        "dailySections": sections,
    })
}

/// Unwraps the `{success, data}` envelope
pub async fn data(res: reqwest::Response) -> Result<Value> {
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], json!(true), "success flag false or missing: {}", body);
    Ok(body["data"].clone())
}
