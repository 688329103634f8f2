use crate::api::models::{CampaignRequest, Message, Reply, Template, TemplateInput};
use crate::error::ApiError;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_http(http, base_url)
    }

    pub fn with_http(http: HttpClient, base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(ApiError::BaseUrl);
        }
        Ok(Self { http, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The live log endpoint, `ws://` or `wss://` following the base scheme.
    pub fn log_stream_url(&self) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["ws", "log"])?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| ApiError::BaseUrl)?;
        Ok(url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        log::warn!("backend answered HTTP {status}");
        Err(ApiError::from_body(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Reachability check used by the connect window.
    pub async fn ping(&self) -> Result<u16, ApiError> {
        let resp = self.http.get(self.endpoint(&["conversations"])?).send().await?;
        Ok(resp.status().as_u16())
    }

    /// Sender ids with an open conversation.
    pub async fn conversations(&self) -> Result<Vec<String>, ApiError> {
        let resp = self.http.get(self.endpoint(&["conversations"])?).send().await?;
        let json: Value = Self::json(resp).await?;
        let items = json
            .as_array()
            .or_else(|| json.get("conversations").and_then(|v| v.as_array()))
            .cloned()
            .unwrap_or_default();
        Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|id| !id.is_empty())
            .collect())
    }

    pub async fn history(&self, sender_id: &str) -> Result<Vec<Message>, ApiError> {
        let resp = self
            .http
            .get(self.endpoint(&["conversations", sender_id])?)
            .send()
            .await?;
        Self::json(resp).await
    }

    pub async fn reply(&self, sender_id: &str, message: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint(&["conversations", sender_id, "reply"])?)
            .json(&Reply { message })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn start_campaign(&self, request: &CampaignRequest) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint(&["start-campaign"])?)
            .json(request)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn templates(&self) -> Result<Vec<Template>, ApiError> {
        let resp = self.http.get(self.endpoint(&["templates"])?).send().await?;
        Self::json(resp).await
    }

    pub async fn create_template(&self, input: &TemplateInput) -> Result<Template, ApiError> {
        let resp = self
            .http
            .post(self.endpoint(&["templates"])?)
            .json(input)
            .send()
            .await?;
        Self::json(resp).await
    }

    pub async fn update_template(&self, id: i64, input: &TemplateInput) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(self.endpoint(&["templates", &id.to_string()])?)
            .json(input)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn delete_template(&self, id: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.endpoint(&["templates", &id.to_string()])?)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Raw bytes of an arbitrary URL, used for the campaign image preview.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let url = Url::parse(url.trim())?;
        let resp = Self::check(self.http.get(url).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}
