//! reqwest-backed `ConsoleApi` speaking to the real backend.

use affiliate_core::config::ApiConfig;
use affiliate_core::{ConsoleError, ConsoleResult, Entity, EntityId};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::api::ConsoleApi;
use crate::endpoints::{self, RoutePath, Verb};
use crate::envelope::{decode_data, parse_envelope};
use crate::models::{
    ColumnPreference, Credentials, DashboardData, DateRange, Filter, LoginResponse,
};

pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    /// Build a client with the configured fixed request timeout.
    pub fn new(config: &ApiConfig) -> ConsoleResult<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ConsoleError::Config(format!("invalid api.base_url: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &RoutePath, query: &[(String, String)]) -> ConsoleResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path.prefix))
            .map_err(|e| ConsoleError::Config(format!("invalid request url: {e}")))?;
        if !path.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ConsoleError::Config("api.base_url cannot be a base".to_string()))?
                .extend(&path.segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(
        &self,
        verb: Verb,
        path: RoutePath,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ConsoleResult<Option<Value>> {
        let url = self.url(&path, query)?;
        let route = url.path().to_string();
        let method = Method::from_bytes(verb.as_str().as_bytes())
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        let mut request = self.client.request(method, url);
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            request = request.header(USER_AGENT, value);
        }
        let token = self.token.read().clone();
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(verb = verb.as_str(), path = %route, "API request");
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;

        parse_envelope(status, &text).map_err(|e| {
            warn!(verb = verb.as_str(), path = %route, status, error = %e, "API call failed");
            e
        })
    }
}

fn transport_error(err: reqwest::Error) -> ConsoleError {
    if err.is_timeout() {
        ConsoleError::Timeout
    } else {
        ConsoleError::Transport(err.to_string())
    }
}

/// Flatten a filter into query pairs; arrays become comma-separated lists.
fn query_pairs(filter: &Filter) -> Vec<(String, String)> {
    filter
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(","),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

#[async_trait]
impl ConsoleApi for HttpApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    async fn login(&self, credentials: &Credentials) -> ConsoleResult<String> {
        let body = serde_json::to_value(credentials)?;
        let data = self.send(Verb::Post, RoutePath::fixed(endpoints::LOGIN), &[], Some(&body)).await?;
        let login: LoginResponse = decode_data(data)?;
        Ok(login.token)
    }

    async fn list<E: Entity>(&self, filter: &Filter) -> ConsoleResult<Vec<E>> {
        let routes = endpoints::endpoints(E::KIND);
        let data = match routes.list_verb {
            Verb::Get => self.send(Verb::Get, RoutePath::fixed(routes.list), &query_pairs(filter), None).await?,
            verb => {
                let body = Value::Object(filter.clone());
                self.send(verb, RoutePath::fixed(routes.list), &[], Some(&body)).await?
            }
        };
        decode_data(data)
    }

    async fn create<E: Entity>(&self, values: &Value) -> ConsoleResult<E> {
        let routes = endpoints::endpoints(E::KIND);
        let data = self.send(Verb::Post, RoutePath::fixed(routes.create), &[], Some(values)).await?;
        decode_data(data)
    }

    async fn update<E: Entity>(&self, id: &EntityId, values: &Value) -> ConsoleResult<Value> {
        let routes = endpoints::endpoints(E::KIND);
        let data = self.send(Verb::Put, routes.item(id), &[], Some(values)).await?;
        Ok(data.unwrap_or_else(|| json!({})))
    }

    async fn delete<E: Entity>(&self, id: &EntityId) -> ConsoleResult<()> {
        let routes = endpoints::endpoints(E::KIND);
        self.send(Verb::Delete, routes.item(id), &[], None).await?;
        Ok(())
    }

    async fn set_status<E: Entity>(
        &self,
        id: &EntityId,
        status: E::Status,
    ) -> ConsoleResult<Value> {
        let routes = endpoints::endpoints(E::KIND);
        let body = json!({ "status": status });
        let data = self
            .send(routes.status_verb, routes.status(id), &[], Some(&body))
            .await?;
        Ok(data.unwrap_or_else(|| json!({})))
    }

    async fn save_preference(&self, preference: &ColumnPreference) -> ConsoleResult<()> {
        let body = serde_json::to_value(preference)?;
        self.send(Verb::Post, RoutePath::fixed(endpoints::USER_PREFERENCE), &[], Some(&body))
            .await?;
        Ok(())
    }

    async fn load_preference(&self, form_name: &str) -> ConsoleResult<Option<ColumnPreference>> {
        let data = self
            .send(Verb::Get, endpoints::preference(form_name), &[], None)
            .await?;
        match data {
            None => Ok(None),
            some => decode_data(some).map(Some),
        }
    }

    async fn dashboard(&self, range: &DateRange) -> ConsoleResult<DashboardData> {
        let query = vec![
            ("from".to_string(), range.from.format("%Y-%m-%d").to_string()),
            ("to".to_string(), range.to.format("%Y-%m-%d").to_string()),
        ];
        let data = self.send(Verb::Get, RoutePath::fixed(endpoints::DASHBOARD), &query, None).await?;
        decode_data(data)
    }
}
