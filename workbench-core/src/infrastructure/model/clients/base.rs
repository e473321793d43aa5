use crate::infrastructure::model::types::ModelError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// How a request proves who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    /// Gemini's `?key=` query parameter.
    QueryKey,
    None,
}

/// Endpoint, credentials and a pooled HTTP client for one provider.
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    http: Client,
}

impl HttpClientBase {
    pub fn new(id: String, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            id,
            endpoint,
            api_key,
            http: Client::new(),
        }
    }

    /// Joins the endpoint and `path` with exactly one slash.
    pub fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POSTs `body` as JSON and returns the decoded JSON reply.
    pub async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        auth: Auth,
    ) -> Result<Value, ModelError> {
        let mut request = self.http.post(url).json(body);
        match auth {
            Auth::Bearer => request = request.bearer_auth(self.require_api_key()?),
            Auth::QueryKey => request = request.query(&[("key", self.require_api_key()?)]),
            Auth::None => {}
        }

        let network = |err| ModelError::network(&self.id, err);
        request
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)
    }

    fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ModelError::missing_api_key(&self.id))
    }
}
