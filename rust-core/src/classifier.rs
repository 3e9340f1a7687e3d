/// Optional model-backed classification in front of keyword scoring

use crate::catalog::ToolDescriptor;
use crate::config::ModelConfig;
use crate::error::{Result, RouterError};
use crate::resilience::{retry_with_policy, ExponentialBackoffRetry};
use crate::router::analyzer::analyze_request;
use crate::router::matcher::MatchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the classifier has no opinion.
    async fn classify(&self, query: &str, tools: &[ToolDescriptor]) -> Result<Option<MatchResult>>;
}

#[derive(Debug, Serialize)]
struct ToolSummary<'a> {
    name: &'a str,
    description: &'a str,
    keywords: &'a [String],
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    model: &'a str,
    temperature: f64,
    query: &'a str,
    tools: Vec<ToolSummary<'a>>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    tool: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    matched_keywords: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

/// Posts the query and tool summaries to a classification service.
#[derive(Debug)]
pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: ModelConfig,
    retry: ExponentialBackoffRetry,
}

impl RemoteClassifier {
    pub fn new(model: ModelConfig, timeout: Duration) -> Result<Self> {
        let endpoint = model
            .endpoint
            .clone()
            .ok_or_else(|| RouterError::InvalidConfig("classifier endpoint missing".to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            model,
            retry: ExponentialBackoffRetry::default(),
        })
    }

    /// Builds a classifier only when the configuration asks for one.
    pub fn from_config(model: &ModelConfig, timeout: Duration) -> Option<Self> {
        if !model.wants_classifier() {
            return None;
        }
        match Self::new(model.clone(), timeout) {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                tracing::warn!(error = %e, "Classifier unavailable, using keyword scoring");
                None
            }
        }
    }

    async fn post(&self, body: &ClassifyRequest<'_>) -> Result<ClassifyResponse> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.model.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RouterError::Timeout(format!("classifier at {}", self.endpoint))
            } else {
                RouterError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::Collaborator {
                collaborator: format!("classifier '{}'", self.model.provider),
                message: format!("HTTP {}", status),
                output: Some(body),
            });
        }
        Ok(response.json::<ClassifyResponse>().await?)
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &str {
        &self.model.provider
    }

    async fn classify(&self, query: &str, tools: &[ToolDescriptor]) -> Result<Option<MatchResult>> {
        let body = ClassifyRequest {
            model: &self.model.model,
            temperature: self.model.temperature,
            query,
            tools: tools
                .iter()
                .map(|t| ToolSummary {
                    name: &t.name,
                    description: &t.description,
                    keywords: &t.keywords,
                })
                .collect(),
        };

        let response = retry_with_policy(&self.retry, || self.post(&body)).await?;
        let Some(tool) = response.tool else {
            return Ok(None);
        };

        Ok(Some(MatchResult {
            reasoning: if response.reasoning.is_empty() {
                format!("Classifier '{}' selected '{}'", self.model.provider, tool)
            } else {
                response.reasoning
            },
            tool: Some(tool),
            confidence: response.confidence.clamp(0.0, 1.0),
            matched_keywords: response.matched_keywords,
            intent: analyze_request(&query.to_lowercase()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_provider_builds_no_classifier() {
        let model = ModelConfig::default();
        assert!(RemoteClassifier::from_config(&model, Duration::from_secs(3)).is_none());
    }

    #[test]
    fn test_endpoint_enables_classifier() {
        let model = ModelConfig {
            provider: "openai".to_string(),
            endpoint: Some("http://127.0.0.1:9/classify".to_string()),
            ..Default::default()
        };
        let classifier = RemoteClassifier::from_config(&model, Duration::from_secs(3)).unwrap();
        assert_eq!(classifier.name(), "openai");
    }

    #[test]
    fn test_request_shape() {
        let keywords = vec!["gamma".to_string()];
        let body = ClassifyRequest {
            model: "m",
            temperature: 0.2,
            query: "gamma",
            tools: vec![ToolSummary {
                name: "gamma_analyzer",
                description: "d",
                keywords: &keywords,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tools"][0]["keywords"][0], "gamma");
        assert_eq!(json["query"], "gamma");
    }
}
