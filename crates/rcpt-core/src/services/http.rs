//! HTTP adapters for the external services.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

use super::{ExpenseAnalyzer, Result, TextModel};
use crate::error::ServiceError;
use crate::llm::{ModelRawOutput, ModelRequest};
use crate::models::config::{AnalyzerConfig, ModelConfig};
use crate::models::expense::RawExpenseResponse;

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ServiceError::Transport(e.to_string()))
}

/// Read a bearer token from the named environment variable.
fn bearer_token(env_name: Option<&str>) -> Option<String> {
    let name = env_name?;
    match std::env::var(name) {
        Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
        _ => {
            debug!("No token in {}, sending unauthenticated requests", name);
            None
        }
    }
}

fn send(request: RequestBuilder, token: Option<&str>) -> Result<Vec<u8>> {
    let request = match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    };

    let response: Response = request.send().map_err(|e| {
        if e.is_timeout() {
            ServiceError::Transport(format!("timed out: {}", e))
        } else {
            ServiceError::Transport(e.to_string())
        }
    })?;

    let status = response.status();
    let body = response
        .bytes()
        .map_err(|e| ServiceError::Transport(e.to_string()))?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&body).into_owned();
        warn!("Service answered {}: {}", status, body);
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body.to_vec())
}

/// Posts raw document bytes to an expense-analysis endpoint.
pub struct HttpExpenseAnalyzer {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpExpenseAnalyzer {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            endpoint: endpoint.into(),
            token: None,
        })
    }

    /// Build from configuration; fails when no endpoint is configured.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            ServiceError::NotConfigured("analyzer.endpoint is not set".to_string())
        })?;
        let mut analyzer = Self::new(endpoint, config.timeout_secs)?;
        analyzer.token = bearer_token(config.api_key_env.as_deref());
        Ok(analyzer)
    }
}

impl ExpenseAnalyzer for HttpExpenseAnalyzer {
    fn analyze(&self, document: &[u8]) -> Result<RawExpenseResponse> {
        debug!("Posting {} bytes to {}", document.len(), self.endpoint);

        let request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(ACCEPT, "application/json")
            .body(document.to_vec());

        let body = send(request, self.token.as_deref())?;
        RawExpenseResponse::from_slice(&body)
            .map_err(|e| ServiceError::InvalidResponse(format!("response is not JSON: {}", e)))
    }
}

/// Invokes a model through a `<endpoint>/model/<id>/invoke` runtime API.
pub struct HttpTextModel {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpTextModel {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            endpoint: endpoint.into(),
            token: None,
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let mut model = Self::new(config.endpoint.clone(), config.timeout_secs)?;
        model.token = bearer_token(config.api_key_env.as_deref());
        Ok(model)
    }

    fn invoke_url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint.trim_end_matches('/'),
            model_id
        )
    }
}

impl TextModel for HttpTextModel {
    fn invoke(&self, model_id: &str, request: &ModelRequest) -> Result<ModelRawOutput> {
        let url = self.invoke_url(model_id);
        debug!("Invoking {}", url);

        let request = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(request);

        send(request, self.token.as_deref()).map(ModelRawOutput::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_url() {
        let model = HttpTextModel::new("https://runtime.example.com/", 5).unwrap();
        assert_eq!(
            model.invoke_url("anthropic.claude-3-haiku-20240307-v1:0"),
            "https://runtime.example.com/model/anthropic.claude-3-haiku-20240307-v1:0/invoke"
        );
    }

    #[test]
    fn test_analyzer_requires_endpoint() {
        let result = HttpExpenseAnalyzer::from_config(&AnalyzerConfig::default());
        assert!(matches!(result, Err(ServiceError::NotConfigured(_))));
    }

    #[test]
    fn test_unresolvable_analyzer_is_transport_error() {
        // `.invalid` never resolves.
        let analyzer = HttpExpenseAnalyzer::new("http://analyzer.invalid/analyze", 2).unwrap();
        assert!(matches!(
            analyzer.analyze(b"bytes"),
            Err(ServiceError::Transport(_))
        ));
    }
}
