use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::{GatewayError, LanguageSource, PersistenceGateway};
use crate::models::{DeleteOutcome, Language, LessonPayload, LessonRecord, NewNotification, Notification};
use crate::pagination::LessonPage;
use crate::types::Quarter;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Search parameters for `GET /api/lessons/search`
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub language_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// REST client for the lesson gateway server
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| GatewayError::Transport(format!("invalid server URL '{}': {}", base_url, e)))?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::Transport(format!("invalid request path '{}': {}", path, e)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        debug!("Gateway responded {} for {}", status, response.url());

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
            };
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }

    pub async fn list_lessons(&self) -> Result<Vec<LessonRecord>, GatewayError> {
        let url = self.url("api/lessons/list")?;
        self.send(self.client.get(url)).await
    }

    pub async fn search_lessons(&self, params: &SearchParams) -> Result<LessonPage, GatewayError> {
        let mut url = self.url("api/lessons/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(q) = &params.q {
                pairs.append_pair("q", q);
            }
            if let Some(year) = params.year {
                pairs.append_pair("year", &year.to_string());
            }
            if let Some(quarter) = params.quarter {
                pairs.append_pair("quarter", quarter.as_str());
            }
            if let Some(language_id) = params.language_id {
                pairs.append_pair("languageId", &language_id.to_string());
            }
            if let Some(page) = params.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(limit) = params.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        self.send(self.client.get(url)).await
    }

    pub async fn lessons_by_quarter(&self, year: i32, quarter: Quarter) -> Result<Vec<LessonRecord>, GatewayError> {
        let mut url = self.url("api/lessons/by-quarter")?;
        url.query_pairs_mut()
            .append_pair("year", &year.to_string())
            .append_pair("quarter", quarter.as_str());
        self.send(self.client.get(url)).await
    }

    pub async fn lesson_years(&self) -> Result<Vec<i32>, GatewayError> {
        let url = self.url("api/lessons/years")?;
        self.send(self.client.get(url)).await
    }

    pub async fn delete_lesson(&self, id: Uuid) -> Result<DeleteOutcome, GatewayError> {
        let url = self.url(&format!("api/lessons/{}", id))?;
        self.send(self.client.delete(url)).await
    }

    pub async fn delete_lessons(&self, ids: &[Uuid]) -> Result<DeleteOutcome, GatewayError> {
        let url = self.url("api/lessons/delete")?;
        self.send(self.client.post(url).json(&json!({ "ids": ids }))).await
    }

    pub async fn all_languages(&self) -> Result<Vec<Language>, GatewayError> {
        let mut url = self.url("api/languages")?;
        url.query_pairs_mut().append_pair("all", "true");
        self.send(self.client.get(url)).await
    }

    pub async fn set_language_active(&self, id: Uuid, is_active: bool) -> Result<Language, GatewayError> {
        let url = self.url(&format!("api/languages/{}", id))?;
        self.send(self.client.put(url).json(&json!({ "isActive": is_active }))).await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, GatewayError> {
        let url = self.url("api/notifications")?;
        self.send(self.client.get(url)).await
    }

    pub async fn notify(&self, notification: &NewNotification) -> Result<Notification, GatewayError> {
        let url = self.url("api/notifications")?;
        self.send(self.client.post(url).json(notification)).await
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn create_lesson(&self, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        let url = self.url("api/lessons")?;
        self.send(self.client.post(url).json(payload)).await
    }

    async fn update_lesson(&self, id: Uuid, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        let url = self.url(&format!("api/lessons/{}", id))?;
        self.send(self.client.put(url).json(payload)).await
    }

    async fn fetch_lesson(&self, id: Uuid) -> Result<LessonRecord, GatewayError> {
        let url = self.url(&format!("api/lessons/{}", id))?;
        self.send(self.client.get(url)).await
    }
}

#[async_trait]
impl LanguageSource for HttpGateway {
    async fn active_languages(&self) -> Result<Vec<Language>, GatewayError> {
        let url = self.url("api/languages")?;
        match self.send(self.client.get(url)).await {
            Err(GatewayError::Transport(msg)) => Err(GatewayError::NetworkUnavailable(msg)),
            other => other,
        }
    }
}
