//! Turns design requests into provider calls and provider output back into
//! domain values.

pub mod image;
pub mod prompts;
pub mod schema;

use crate::config::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::providers::{
    GenerateRequest, GenerationConfig, InlineData, Modality, Part, Provider, ProviderError,
};
use crate::types::{ColorPalette, DesignPlan, GeneratedImage, RoomDimensions, RoomImage};
use serde_json::Value;
use std::sync::Arc;

const DESIGN_IDEAS_TEMPERATURE: f64 = 0.7;
const PALETTES_TEMPERATURE: f64 = 0.8;
const JSON_MIME_TYPE: &str = "application/json";

/// Failures of the design operations.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error("{0}")]
    ProviderBlocked(String),

    #[error("Image generation stopped unexpectedly. Reason: {0}")]
    GenerationStopped(String),

    #[error("The model returned text instead of an image: \"{0}\"")]
    UnexpectedTextResponse(String),

    #[error("The model did not return an image.")]
    NoImageReturned,

    #[error("Failed to parse the model response: {0}")]
    MalformedResponse(String),

    #[error("Invalid response structure from the model: {0}")]
    ValidationError(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Which models the adapter asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignerConfig {
    pub text_model: String,
    pub image_model: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// The three design operations on top of a [`Provider`].
#[derive(Clone)]
pub struct DesignAdapter {
    provider: Arc<dyn Provider>,
    config: DesignerConfig,
}

impl DesignAdapter {
    pub fn new(provider: Arc<dyn Provider>, config: DesignerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// Analyze a room photo and produce a full design plan.
    pub async fn request_design_ideas(
        &self,
        image: &RoomImage,
        style: &str,
        dimensions: Option<&RoomDimensions>,
        room_type: &str,
    ) -> Result<DesignPlan, DesignError> {
        let request = GenerateRequest {
            model: self.config.text_model.clone(),
            parts: vec![
                Part::Text(prompts::design_ideas_prompt(style, room_type, dimensions)),
                image_part(image),
            ],
            config: GenerationConfig {
                response_mime_type: Some(JSON_MIME_TYPE.into()),
                response_schema: Some(schema::design_plan_schema()),
                temperature: Some(DESIGN_IDEAS_TEMPERATURE),
                response_modalities: None,
            },
        };

        let response = self.provider.generate(&request).await?;
        parse_design_plan(&response.text())
    }

    /// Render the plan onto the original photo.
    pub async fn request_redesigned_image(
        &self,
        plan: &DesignPlan,
        style: &str,
        room_type: &str,
        image: &RoomImage,
        override_colors: Option<&ColorPalette>,
    ) -> Result<GeneratedImage, DesignError> {
        let request = GenerateRequest {
            model: self.config.image_model.clone(),
            parts: vec![
                image_part(image),
                Part::Text(prompts::redesign_prompt(plan, style, room_type, override_colors)),
            ],
            config: GenerationConfig {
                response_modalities: Some(vec![Modality::Image, Modality::Text]),
                ..Default::default()
            },
        };

        let response = self.provider.generate(&request).await?;
        image::extract_image(&response).inspect_err(|e| {
            tracing::warn!(error = %e, "image generation returned no usable image");
        })
    }

    /// Ask for three fresh palettes that differ from the ones in `plan`.
    pub async fn request_more_palettes(
        &self,
        plan: &DesignPlan,
        style: &str,
    ) -> Result<Vec<ColorPalette>, DesignError> {
        let request = GenerateRequest {
            model: self.config.text_model.clone(),
            parts: vec![Part::Text(prompts::more_palettes_prompt(plan, style))],
            config: GenerationConfig {
                response_mime_type: Some(JSON_MIME_TYPE.into()),
                response_schema: Some(schema::palettes_schema()),
                temperature: Some(PALETTES_TEMPERATURE),
                response_modalities: None,
            },
        };

        let response = self.provider.generate(&request).await?;
        parse_palettes(&response.text())
    }
}

fn image_part(image: &RoomImage) -> Part {
    Part::InlineData(InlineData {
        mime_type: image.mime_type.clone(),
        data: image.data.clone(),
    })
}

fn parse_json(text: &str) -> Result<Value, DesignError> {
    serde_json::from_str(text).map_err(|e| DesignError::MalformedResponse(e.to_string()))
}

fn is_missing(value: &Value, field: &str) -> bool {
    value.get(field).is_none_or(Value::is_null)
}

fn parse_design_plan(text: &str) -> Result<DesignPlan, DesignError> {
    let value = parse_json(text)?;

    let missing: Vec<&str> = schema::DESIGN_PLAN_CHECKED
        .into_iter()
        .filter(|field| is_missing(&value, field))
        .collect();
    if !missing.is_empty() {
        return Err(DesignError::ValidationError(format!(
            "missing {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(|e| DesignError::MalformedResponse(e.to_string()))
}

fn parse_palettes(text: &str) -> Result<Vec<ColorPalette>, DesignError> {
    let value = parse_json(text)?;

    let Some(items) = value.as_array() else {
        return Err(DesignError::ValidationError(
            "expected an array of palettes".into(),
        ));
    };

    for (i, item) in items.iter().enumerate() {
        if let Some(field) = schema::PALETTE_REQUIRED
            .into_iter()
            .find(|field| is_missing(item, field))
        {
            return Err(DesignError::ValidationError(format!(
                "palette {i} is missing {field}"
            )));
        }
    }

    if items.len() != 3 {
        tracing::warn!(count = items.len(), "expected exactly 3 palettes");
    }

    serde_json::from_value(value).map_err(|e| DesignError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use crate::types::{DimensionUnit, sample_plan};
    use serde_json::json;

    fn setup() -> (Arc<MockProvider>, DesignAdapter) {
        let mock = Arc::new(MockProvider::new());
        let adapter = DesignAdapter::new(mock.clone(), DesignerConfig::default());
        (mock, adapter)
    }

    fn photo() -> RoomImage {
        RoomImage::new("image/jpeg", b"jpeg-bytes".to_vec())
    }

    fn plan_json() -> Value {
        serde_json::to_value(sample_plan()).unwrap()
    }

    #[tokio::test]
    async fn design_ideas_sends_schema_and_parses_plan() {
        let (mock, adapter) = setup();
        mock.push_text(&plan_json().to_string());

        let dims = RoomDimensions {
            width: Some(12.0),
            length: Some(15.0),
            unit: DimensionUnit::Feet,
        };
        let plan = adapter
            .request_design_ideas(&photo(), "coastal", Some(&dims), "living room")
            .await
            .unwrap();
        assert_eq!(plan, sample_plan());

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, DEFAULT_TEXT_MODEL);
        assert_eq!(req.config.temperature, Some(0.7));
        assert_eq!(req.config.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(
            req.config.response_schema.as_ref().unwrap()["required"],
            json!(schema::DESIGN_PLAN_REQUIRED)
        );

        let prompt = req.parts[0].as_text().unwrap();
        assert!(prompt.contains("12 by 15 feet"));
        assert!(matches!(&req.parts[1], Part::InlineData(d) if d.data == b"jpeg-bytes"));
    }

    #[tokio::test]
    async fn design_ideas_rejects_missing_required_fields() {
        for field in schema::DESIGN_PLAN_CHECKED {
            let (mock, adapter) = setup();
            let mut v = plan_json();
            v.as_object_mut().unwrap().remove(field);
            mock.push_text(&v.to_string());

            let err = adapter
                .request_design_ideas(&photo(), "boho", None, "bedroom")
                .await
                .unwrap_err();
            assert!(matches!(err, DesignError::ValidationError(_)), "{field}: {err:?}");
            assert!(err.to_string().contains(field));
        }
    }

    #[tokio::test]
    async fn design_ideas_rejects_null_required_fields() {
        let (mock, adapter) = setup();
        let mut v = plan_json();
        v["estimatedCost"] = Value::Null;
        mock.push_text(&v.to_string());

        let err = adapter
            .request_design_ideas(&photo(), "boho", None, "bedroom")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::ValidationError(_)));
    }

    #[tokio::test]
    async fn design_ideas_reports_unparseable_text() {
        let (mock, adapter) = setup();
        mock.push_text("Sorry, I can't help with that.");

        let err = adapter
            .request_design_ideas(&photo(), "boho", None, "bedroom")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn provider_failures_are_wrapped() {
        let (mock, adapter) = setup();
        mock.push_error(ProviderError::Http {
            status: 429,
            body: "quota exceeded".into(),
        });

        let err = adapter
            .request_more_palettes(&sample_plan(), "boho")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::Provider(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn redesign_requests_image_modality_and_returns_image() {
        let (mock, adapter) = setup();
        mock.push_response(
            serde_json::from_value(json!({
                "candidates": [{
                    "finishReason": "STOP",
                    "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "iVBO"}}]}
                }]
            }))
            .unwrap(),
        );

        let palette = ColorPalette::new("Olive", "Ivory");
        let img = adapter
            .request_redesigned_image(&sample_plan(), "rustic", "kitchen", &photo(), Some(&palette))
            .await
            .unwrap();
        assert_eq!(img.mime_type, "image/png");

        let req = &mock.requests()[0];
        assert_eq!(req.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(
            req.config.response_modalities,
            Some(vec![Modality::Image, Modality::Text])
        );
        assert!(req.config.response_schema.is_none());
        let prompt = req.parts.iter().find_map(Part::as_text).unwrap();
        assert!(prompt.contains("Olive with Ivory accents"));
    }

    #[tokio::test]
    async fn more_palettes_returns_three() {
        let (mock, adapter) = setup();
        mock.push_text(
            &json!([
                {"color": "Seafoam", "accent": "White"},
                {"color": "Tangerine", "accent": "Teal"},
                {"color": "Plum", "accent": "Silver"}
            ])
            .to_string(),
        );

        let palettes = adapter
            .request_more_palettes(&sample_plan(), "mid-century modern")
            .await
            .unwrap();
        assert_eq!(palettes.len(), 3);
        assert_eq!(palettes[1], ColorPalette::new("Tangerine", "Teal"));

        let req = &mock.requests()[0];
        assert_eq!(req.config.temperature, Some(0.8));
        assert!(req.parts.iter().all(|p| p.as_text().is_some()));
    }

    #[tokio::test]
    async fn more_palettes_validates_items() {
        let (mock, adapter) = setup();
        mock.push_text(&json!([{"color": "Seafoam"}]).to_string());
        let err = adapter
            .request_more_palettes(&sample_plan(), "boho")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::ValidationError(_)));
        assert!(err.to_string().contains("accent"));

        let (mock, adapter) = setup();
        mock.push_text(&json!({"palettes": []}).to_string());
        let err = adapter
            .request_more_palettes(&sample_plan(), "boho")
            .await
            .unwrap_err();
        assert!(matches!(err, DesignError::ValidationError(_)));
    }
}
