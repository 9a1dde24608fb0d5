// src/models/huggingface.rs
//! Remote inference backend (Hugging Face Inference API request/response shape).
//!
//! Classification: `POST {base}/{model}` with `{"inputs": text}` answers
//! `[[{"label": "4 stars", "score": 0.61}, ...]]` (or a flat list).
//! Summarization answers `[{"summary_text": "..."}]`.
//! Errors come back as `{"error": "..."}`.

use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SummarizationModel, SummaryParams, TextClassificationModel};

/// Shared HTTP client + credentials. Cheap to clone.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl InferenceClient {
    pub fn new(base_url: &str, api_token: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("opinion-analytics/0.1")
            .connect_timeout(Duration::from_secs(4))
            .build()
            .context("building inference HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model)
    }

    async fn post<B: Serialize + ?Sized>(&self, model: &str, body: &B) -> anyhow::Result<Value> {
        let mut req = self.http.post(self.model_url(model)).json(body);
        if !self.api_token.is_empty() {
            req = req.bearer_auth(&self.api_token);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("request to {model} failed"))?;
        let status = resp.status();
        let value: Value = resp
            .json()
            .await
            .with_context(|| format!("{model} returned a non-JSON body (HTTP {status})"))?;
        if let Some(msg) = value.get("error").and_then(Value::as_str) {
            return Err(anyhow!("{model}: {msg} (HTTP {status})"));
        }
        if !status.is_success() {
            return Err(anyhow!("{model}: HTTP {status}"));
        }
        Ok(value)
    }
}

#[derive(Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Serialize)]
struct ClassifyReq<'a> {
    inputs: &'a str,
    options: Options,
}

#[derive(Serialize)]
struct SummarizeParams {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Serialize)]
struct SummarizeReq<'a> {
    inputs: &'a str,
    parameters: SummarizeParams,
    options: Options,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct SummaryText {
    summary_text: String,
}

/// Pick the highest-scoring label from a classification response.
pub fn top_label(value: &Value) -> anyhow::Result<String> {
    // Single input answers either [[...]] or [...].
    let first = value
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| anyhow!("empty classification response"))?;
    let candidates = if first.is_array() {
        first.clone()
    } else {
        value.clone()
    };
    let scores: Vec<LabelScore> =
        serde_json::from_value(candidates).context("unexpected classification response shape")?;
    scores
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|s| s.label)
        .ok_or_else(|| anyhow!("classification response had no labels"))
}

/// Extract the generated text from a summarization response.
pub fn summary_text(value: &Value) -> anyhow::Result<String> {
    let items: Vec<SummaryText> =
        serde_json::from_value(value.clone()).context("unexpected summarization response shape")?;
    items
        .into_iter()
        .next()
        .map(|s| s.summary_text)
        .ok_or_else(|| anyhow!("summarization response was empty"))
}

pub struct HfTextClassifier {
    client: InferenceClient,
    model: String,
}

impl HfTextClassifier {
    pub fn new(client: InferenceClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextClassificationModel for HfTextClassifier {
    async fn predict(&self, input: &str) -> anyhow::Result<String> {
        let body = ClassifyReq {
            inputs: input,
            options: Options {
                wait_for_model: true,
            },
        };
        let value = self.client.post(&self.model, &body).await?;
        top_label(&value)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

pub struct HfSummarizer {
    client: InferenceClient,
    model: String,
}

impl HfSummarizer {
    pub fn new(client: InferenceClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl SummarizationModel for HfSummarizer {
    async fn summarize(&self, input: &str, params: &SummaryParams) -> anyhow::Result<String> {
        let body = SummarizeReq {
            inputs: input,
            parameters: SummarizeParams {
                min_length: params.min_tokens,
                max_length: params.max_tokens,
                do_sample: params.do_sample,
            },
            options: Options {
                wait_for_model: true,
            },
        };
        let value = self.client.post(&self.model, &body).await?;
        summary_text(&value)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_label_handles_nested_and_flat_lists() {
        let nested = json!([[
            {"label": "1 star", "score": 0.05},
            {"label": "4 stars", "score": 0.61},
            {"label": "5 stars", "score": 0.30}
        ]]);
        assert_eq!(top_label(&nested).unwrap(), "4 stars");

        let flat = json!([
            {"label": "NEGATIVE", "score": 0.9},
            {"label": "POSITIVE", "score": 0.1}
        ]);
        assert_eq!(top_label(&flat).unwrap(), "NEGATIVE");
    }

    #[test]
    fn top_label_rejects_garbage() {
        assert!(top_label(&json!([])).is_err());
        assert!(top_label(&json!({"foo": 1})).is_err());
        assert!(top_label(&json!([["x"]])).is_err());
    }

    #[test]
    fn summary_text_reads_first_item() {
        let v = json!([{"summary_text": "Great arepas, slow service."}]);
        assert_eq!(summary_text(&v).unwrap(), "Great arepas, slow service.");
        assert!(summary_text(&json!([])).is_err());
    }

    #[test]
    fn summarize_request_serializes_generation_bounds() {
        let body = SummarizeReq {
            inputs: "hola",
            parameters: SummarizeParams {
                min_length: 10,
                max_length: 40,
                do_sample: false,
            },
            options: Options {
                wait_for_model: true,
            },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["parameters"]["max_length"], 40);
        assert_eq!(v["parameters"]["do_sample"], false);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let c = InferenceClient::new("https://example.test/models/", "").unwrap();
        assert_eq!(
            c.model_url("facebook/bart-large-cnn"),
            "https://example.test/models/facebook/bart-large-cnn"
        );
    }
}
