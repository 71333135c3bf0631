//! Hosted language-model classifier — calls the HuggingFace inference API.
//!
//! Renders a classification prompt listing the catalog's categories, POSTs it
//! to a hosted instruct model, and parses the structured response lines
//! (`Intent Classification:`, `Location:`, `Other Details:`). A response that
//! carries no classification line is an error; the caller decides whether to
//! degrade to the fallback category.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::classifier::{Classification, Classifier, Complaint};
use crate::error::ClassifierError;

const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const INFERENCE_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Configuration for the HuggingFace classifier.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// API token for the inference API.
    pub api_token: SecretString,
    /// Model repo id (e.g. "mistralai/Mistral-7B-Instruct-v0.2").
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Response length cap.
    pub max_new_tokens: u32,
}

impl HuggingFaceConfig {
    pub fn new(api_token: SecretString) -> Self {
        Self {
            api_token,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_new_tokens: 250,
        }
    }
}

/// Classifier backed by a hosted instruct model.
pub struct HuggingFaceClassifier {
    config: HuggingFaceConfig,
    categories: Vec<String>,
    client: reqwest::Client,
    name: String,
}

/// One generation in the inference API response.
#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl HuggingFaceClassifier {
    /// Create a classifier for a fixed category list (the catalog's
    /// classifiable names — the fallback is never offered as a choice).
    pub fn new(config: HuggingFaceConfig, categories: Vec<String>) -> Self {
        let name = format!("huggingface/{}", config.model);
        Self {
            config,
            categories,
            client: reqwest::Client::new(),
            name,
        }
    }

    fn api_url(&self) -> String {
        format!("{INFERENCE_API_BASE}/{}", self.config.model)
    }

    async fn request_completion(&self, prompt: &str) -> Result<String, ClassifierError> {
        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "temperature": self.config.temperature,
                "max_new_tokens": self.config.max_new_tokens,
                "return_full_text": false,
            },
        });

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(self.config.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::RequestFailed {
                model: self.config.model.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let generations: Vec<GeneratedText> =
            response
                .json()
                .await
                .map_err(|e| ClassifierError::RequestFailed {
                    model: self.config.model.clone(),
                    reason: format!("malformed response body: {e}"),
                })?;

        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or(ClassifierError::UnparseableResponse)
    }
}

#[async_trait]
impl Classifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, complaint: &Complaint) -> Result<Classification, ClassifierError> {
        let prompt = classification_prompt(complaint, &self.categories);
        let raw = self.request_completion(&prompt).await?;
        debug!(model = %self.config.model, "Received classification response");
        parse_analysis(&raw)
    }
}

/// Render the classification prompt for a complaint.
///
/// The model is instructed to answer "issue recorded" when it cannot place
/// the complaint, so even a cooperative failure resolves to the fallback.
pub fn classification_prompt(complaint: &Complaint, categories: &[String]) -> String {
    let category_list: String = categories
        .iter()
        .map(|c| format!("- {c}\n"))
        .collect();

    format!(
        "Analyze the sentiment and content of the following user query. \
Classify the incident into one of the specified categories and extract \
relevant entities, including the location:\n\n\
Categories:\n{category_list}\n\
Instructions:\n\
1. Determine the most appropriate category for the incident based on the \
sentiment and content of the user query; if you fail to classify, give the \
response as \"issue recorded\".\n\
2. Identify and extract entities such as location, time, or individuals involved.\n\n\
User Name: \"{name}\"\n\
User Phone: \"{phone}\"\n\
User Query: \"{query}\"\n\
User Location: \"{location}\"\n\n\
Response Format:\n\n\
- Intent Classification: \n\
- Extracted Entities:\n\
  - Location: \n\
  - Other Details: \n",
        name = complaint.reporter_name.as_deref().unwrap_or(""),
        phone = complaint.reporter_phone.as_deref().unwrap_or(""),
        query = complaint.text,
        location = complaint.location.as_deref().unwrap_or(""),
    )
}

/// Parse the model's line-oriented analysis into a [`Classification`].
///
/// Scans for the labelled lines the prompt asks for. Values of "none" / "n/a"
/// and empty strings are treated as absent. A response without an intent line
/// is unparseable.
pub fn parse_analysis(raw: &str) -> Result<Classification, ClassifierError> {
    let mut category: Option<String> = None;
    let mut location: Option<String> = None;
    let mut other_details: Option<String> = None;

    for line in raw.lines() {
        if let Some(value) = labelled_value(line, "Intent Classification:") {
            category = Some(value);
        } else if let Some(value) = labelled_value(line, "Location:") {
            location = Some(value);
        } else if let Some(value) = labelled_value(line, "Other Details:") {
            other_details = Some(value);
        }
    }

    let category = category.ok_or(ClassifierError::UnparseableResponse)?;
    Ok(Classification {
        category,
        location,
        other_details,
    })
}

/// Extract the value following `label` on a line, if present and meaningful.
fn labelled_value(line: &str, label: &str) -> Option<String> {
    let idx = line.find(label)?;
    let value = line[idx + label.len()..]
        .trim()
        .trim_matches('"')
        .to_string();
    if value.is_empty() || value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(value)
    }
}
