//! reqwest implementation of [`TaigaApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, Method, Response,
};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use super::{Connect, Page, TaigaApi, TaigaError};
use crate::models::{ItemKind, Pagination, Record};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Taiga instance.
#[derive(Debug, Clone, Default)]
pub struct TaigaSettings {
    /// API root, e.g. `https://api.taiga.io/api/v1`.
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, TaigaError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(TaigaError::MissingConfig(name)),
    }
}

/// A single authenticated Taiga session.
pub struct TaigaClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    token: OnceCell<String>,
    user_id: OnceCell<i64>,
}

impl TaigaClient {
    pub fn new(settings: &TaigaSettings) -> Result<Self, TaigaError> {
        let base_url = required(&settings.base_url, "TAIGA_BASE_URL")?;
        let username = required(&settings.username, "TAIGA_USERNAME")?;
        let password = required(&settings.password, "TAIGA_PASSWORD")?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            token: OnceCell::new(),
            user_id: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn login(&self) -> Result<String, TaigaError> {
        tracing::debug!("Authenticating against Taiga as configured service account");
        let response = self
            .http
            .post(self.url("auth"))
            .json(&json!({
                "type": "normal",
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaigaError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = serde_json::from_str(&response.text().await?)?;
        let token = data
            .get("auth_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TaigaError::Unexpected(
                    "Taiga authentication response did not contain auth_token".into(),
                )
            })?
            .to_string();

        if let Some(id) = data.get("id").and_then(Value::as_i64) {
            let _ = self.user_id.set(id);
        }
        Ok(token)
    }

    /// Send an authenticated request and fail on any non-2xx status.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Response, TaigaError> {
        self.authenticate().await?;
        let token = self
            .token
            .get()
            .ok_or_else(|| TaigaError::Unexpected("Taiga session is not authenticated".into()))?;

        tracing::debug!(method = method.as_str(), path, "Taiga request");
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), path, "Taiga request failed");
            Err(TaigaError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, TaigaError> {
        let response = self.send(method, path, query, body).await?;
        read_json(response).await
    }

    async fn get_record(&self, path: &str) -> Result<Record, TaigaError> {
        into_record(self.call(Method::GET, path, &[], None).await?)
    }

    async fn get_records(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<Record>, TaigaError> {
        into_records(self.call(Method::GET, path, query, None).await?)
    }
}

async fn read_json(response: Response) -> Result<Value, TaigaError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

fn into_record(value: Value) -> Result<Record, TaigaError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TaigaError::Unexpected(format!(
            "Expected a JSON object from Taiga, got {}",
            other
        ))),
    }
}

fn into_records(value: Value) -> Result<Vec<Record>, TaigaError> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(TaigaError::Unexpected(format!(
            "Expected a JSON list from Taiga, got {}",
            other
        ))),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Read Taiga's `x-pagination-*` headers.
pub(crate) fn parse_pagination(headers: &HeaderMap) -> Pagination {
    let number = |name: &str| header(headers, name).and_then(|v| v.trim().parse().ok());
    let link = |name: &str| {
        header(headers, name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Pagination {
        count: number("x-pagination-count"),
        current: number("x-pagination-current"),
        page_size: number("x-paginated-by"),
        next: link("x-pagination-next"),
        prev: link("x-pagination-prev"),
    }
}

fn project_query(project_id: i64) -> Vec<(String, String)> {
    vec![("project".to_string(), project_id.to_string())]
}

#[async_trait]
impl TaigaApi for TaigaClient {
    async fn authenticate(&self) -> Result<(), TaigaError> {
        self.token.get_or_try_init(|| self.login()).await?;
        Ok(())
    }

    async fn current_user_id(&self) -> Result<i64, TaigaError> {
        let id = self
            .user_id
            .get_or_try_init(|| async {
                let me = self.get_record("users/me").await?;
                me.get("id").and_then(Value::as_i64).ok_or_else(|| {
                    TaigaError::Unexpected(
                        "Taiga API did not provide the authenticated user id".into(),
                    )
                })
            })
            .await?;
        Ok(*id)
    }

    async fn list_projects(&self, params: &[(String, String)]) -> Result<Vec<Record>, TaigaError> {
        self.get_records("projects", params).await
    }

    async fn get_project(&self, project_id: i64) -> Result<Record, TaigaError> {
        self.get_record(&format!("projects/{}", project_id)).await
    }

    async fn get_project_by_slug(&self, slug: &str) -> Result<Record, TaigaError> {
        let query = [("slug".to_string(), slug.to_string())];
        into_record(
            self.call(Method::GET, "projects/by_slug", &query, None)
                .await?,
        )
    }

    async fn list(&self, kind: ItemKind, params: &[(String, String)]) -> Result<Page, TaigaError> {
        let response = self.send(Method::GET, kind.path(), params, None).await?;
        let pagination = parse_pagination(response.headers());
        let items = into_records(read_json(response).await?)?;
        Ok(Page { items, pagination })
    }

    async fn get(&self, kind: ItemKind, id: i64) -> Result<Record, TaigaError> {
        self.get_record(&format!("{}/{}", kind.path(), id)).await
    }

    async fn create(&self, kind: ItemKind, payload: &Record) -> Result<Record, TaigaError> {
        let body = Value::Object(payload.clone());
        into_record(self.call(Method::POST, kind.path(), &[], Some(&body)).await?)
    }

    async fn update(&self, kind: ItemKind, id: i64, payload: &Record) -> Result<Record, TaigaError> {
        let body = Value::Object(payload.clone());
        let path = format!("{}/{}", kind.path(), id);
        into_record(self.call(Method::PATCH, &path, &[], Some(&body)).await?)
    }

    async fn delete(&self, kind: ItemKind, id: i64) -> Result<(), TaigaError> {
        let path = format!("{}/{}", kind.path(), id);
        self.send(Method::DELETE, &path, &[], None).await?;
        Ok(())
    }

    async fn list_statuses(&self, kind: ItemKind, project_id: i64) -> Result<Vec<Record>, TaigaError> {
        self.get_records(kind.statuses_path(), &project_query(project_id))
            .await
    }

    async fn link_epic_user_story(
        &self,
        epic_id: i64,
        user_story_id: i64,
    ) -> Result<Option<Record>, TaigaError> {
        let body = json!({ "epic": epic_id, "user_story": user_story_id });
        let path = format!("epics/{}/related_userstories", epic_id);
        match self.call(Method::POST, &path, &[], Some(&body)).await? {
            Value::Null => Ok(None),
            value => into_record(value).map(Some),
        }
    }

    async fn list_users(&self, project_id: Option<i64>) -> Result<Vec<Record>, TaigaError> {
        let query = project_id.map(project_query).unwrap_or_default();
        self.get_records("users", &query).await
    }

    async fn list_memberships(&self, project_id: i64) -> Result<Vec<Record>, TaigaError> {
        self.get_records("memberships", &project_query(project_id))
            .await
    }

    async fn list_milestones(&self, project_id: i64) -> Result<Vec<Record>, TaigaError> {
        self.get_records("milestones", &project_query(project_id))
            .await
    }
}

/// Opens a fresh, authenticated [`TaigaClient`] for every action call.
#[derive(Debug, Clone)]
pub struct TaigaConnector {
    settings: TaigaSettings,
}

impl TaigaConnector {
    pub fn new(settings: TaigaSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Connect for TaigaConnector {
    async fn connect(&self) -> Result<Box<dyn TaigaApi>, TaigaError> {
        let client = TaigaClient::new(&self.settings)?;
        client.authenticate().await?;
        Ok(Box::new(client))
    }
}
