use super::sanitize;
use super::{GenerateRequest, GenerateResponse, Modality, Part, Provider, ProviderError};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative AI (Gemini API key) provider.
pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        Self::with_client(Client::new(), api_key, base_url)
    }

    pub fn with_client(client: Client, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List models that support `generateContent`.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        self.require_key()?;
        let url = format!("{}/models", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(sanitize::api_error_body(status.as_u16(), &body));
        }

        let list: ModelsListResponse = resp.json().await?;

        Ok(list
            .models
            .unwrap_or_default()
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .as_ref()
                    .is_some_and(|methods| methods.iter().any(|x| x == "generateContent"))
            })
            .map(|mut m| {
                if let Some(id) = m.name.strip_prefix("models/") {
                    m.name = id.to_string();
                }
                m
            })
            .collect())
    }

    fn require_key(&self) -> Result<(), ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::AuthRequired(
                "API key required for Google".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<Modality>>,
}

// ---------------------------------------------------------------------------
// Models list response
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ModelsListResponse {
    models: Option<Vec<ModelInfo>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
    pub supported_generation_methods: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn convert_request(request: &GenerateRequest) -> GenerateContentRequest {
    let parts = request
        .parts
        .iter()
        .map(|p| match p {
            Part::Text(t) => WirePart {
                text: Some(t.clone()),
                inline_data: None,
            },
            Part::InlineData(d) => WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: d.mime_type.clone(),
                    data: STANDARD.encode(&d.data),
                }),
            },
        })
        .collect();

    let cfg = &request.config;
    let generation_config = WireGenerationConfig {
        temperature: cfg.temperature,
        response_mime_type: cfg.response_mime_type.clone(),
        response_schema: cfg.response_schema.clone(),
        response_modalities: cfg.response_modalities.clone(),
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".into(),
            parts,
        }],
        generation_config: Some(generation_config),
    }
}

// ---------------------------------------------------------------------------
// Provider impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Provider for GoogleProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.require_key()?;

        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = convert_request(request);

        tracing::debug!(
            model = %request.model,
            parts = request.parts.len(),
            "sending generateContent request"
        );

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "generateContent failed");
            return Err(sanitize::api_error_body(status.as_u16(), &body));
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
