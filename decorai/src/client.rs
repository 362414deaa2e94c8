use crate::dispatch::Action;
use crate::types::{
    ColorPalette, DesignPlan, ErrorBody, GeneratedImage, RoomDimensions, RoomImage,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

/// Marker the provider uses when a safety filter rejected the request.
const SAFETY_MARKER: &str = "SAFETY";

pub const SAFETY_BLOCKED_MESSAGE: &str =
    "The request was blocked by the safety filter. Please try a different image or style.";
pub const ERROR_PREFIX: &str = "An error occurred: ";
pub const UNPARSEABLE_ERROR_MESSAGE: &str = "Failed to parse error response";

/// The single failure value handed to callers of [`DesignClient`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    /// HTTP status, when the dispatcher answered at all.
    pub status: Option<u16>,
}

impl ClientError {
    fn new(raw: impl AsRef<str>, status: Option<u16>) -> Self {
        Self {
            message: user_facing_message(raw.as_ref()),
            status,
        }
    }
}

/// Turn a raw failure message into the text shown to users.
pub fn user_facing_message(raw: &str) -> String {
    if raw.contains(SAFETY_MARKER) {
        SAFETY_BLOCKED_MESSAGE.to_string()
    } else {
        format!("{ERROR_PREFIX}{raw}")
    }
}

/// Typed client for the design dispatcher endpoint.
#[derive(Debug, Clone)]
pub struct DesignClient {
    http: Client,
    endpoint: Url,
}

impl DesignClient {
    pub fn builder() -> DesignClientBuilder {
        DesignClientBuilder::new()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn generate_design_ideas(
        &self,
        image: &RoomImage,
        style: &str,
        dimensions: Option<&RoomDimensions>,
        room_type: &str,
    ) -> Result<DesignPlan, ClientError> {
        let payload = json!({
            "image": image,
            "style": style,
            "roomType": room_type,
            "dimensions": dimensions,
        });
        self.call(Action::GenerateDesignIdeas, payload).await
    }

    pub async fn generate_redesigned_image(
        &self,
        plan: &DesignPlan,
        style: &str,
        room_type: &str,
        image: &RoomImage,
        override_colors: Option<&ColorPalette>,
    ) -> Result<GeneratedImage, ClientError> {
        let payload = json!({
            "designPlan": plan,
            "style": style,
            "roomType": room_type,
            "image": image,
            "overrideColors": override_colors,
        });
        self.call(Action::GenerateRedesignedImage, payload).await
    }

    pub async fn generate_more_palettes(
        &self,
        plan: &DesignPlan,
        style: &str,
    ) -> Result<Vec<ColorPalette>, ClientError> {
        let payload = json!({
            "designPlan": plan,
            "style": style,
        });
        self.call(Action::GenerateMorePalettes, payload).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: Action,
        payload: Value,
    ) -> Result<T, ClientError> {
        let envelope = json!({"action": action.as_str(), "payload": payload});

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| ClientError::new(e.to_string(), None))?;

        let status = resp.status();
        if !status.is_success() {
            let raw = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => UNPARSEABLE_ERROR_MESSAGE.to_string(),
            };
            tracing::warn!(
                %action,
                status = status.as_u16(),
                error = %raw,
                "design request failed"
            );
            return Err(ClientError::new(raw, Some(status.as_u16())));
        }

        resp.json::<T>().await.map_err(|e| {
            ClientError::new(
                format!("Failed to parse response: {e}"),
                Some(status.as_u16()),
            )
        })
    }
}

pub struct DesignClientBuilder {
    endpoint: Option<String>,
    http: Option<Client>,
}

impl DesignClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            http: None,
        }
    }

    /// Full URL of the dispatcher, e.g. `http://127.0.0.1:8787/api/generate`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<DesignClient, ClientError> {
        let raw = self.endpoint.ok_or_else(|| ClientError {
            message: "Dispatcher endpoint is required".into(),
            status: None,
        })?;
        let endpoint = Url::parse(&raw).map_err(|e| ClientError {
            message: format!("Invalid dispatcher endpoint {raw}: {e}"),
            status: None,
        })?;

        Ok(DesignClient {
            http: self.http.unwrap_or_default(),
            endpoint,
        })
    }
}

impl Default for DesignClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_plan;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> DesignClient {
        DesignClient::builder()
            .endpoint(format!("{}/api/generate", server.uri()))
            .build()
            .unwrap()
    }

    #[test]
    fn safety_messages_are_replaced() {
        assert_eq!(
            user_facing_message("Request was blocked by the provider. Reason: SAFETY"),
            SAFETY_BLOCKED_MESSAGE
        );
        assert_eq!(
            user_facing_message("Server error: quota exceeded"),
            "An error occurred: Server error: quota exceeded"
        );
    }

    #[test]
    fn builder_validates_endpoint() {
        assert!(DesignClient::builder().build().is_err());
        assert!(DesignClient::builder().endpoint("not a url").build().is_err());
        let client = DesignClient::builder()
            .endpoint("http://localhost:8787/api/generate")
            .build()
            .unwrap();
        assert_eq!(client.endpoint().path(), "/api/generate");
    }

    #[tokio::test]
    async fn posts_envelope_and_decodes_palettes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "action": "generateMorePalettes",
                "payload": {"style": "boho"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"color": "Sand", "accent": "Rust"},
                {"color": "Moss", "accent": "Cream"},
                {"color": "Ink", "accent": "Copper"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let palettes = client.generate_more_palettes(&sample_plan(), "boho").await.unwrap();
        assert_eq!(palettes.len(), 3);
        assert_eq!(palettes[2], ColorPalette::new("Ink", "Copper"));
    }

    #[tokio::test]
    async fn decodes_image_data_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!("data:image/png;base64,AAEC")),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let img = client
            .generate_redesigned_image(
                &sample_plan(),
                "boho",
                "bedroom",
                &RoomImage::new("image/jpeg", b"x".to_vec()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.data, vec![0u8, 1, 2]);
    }

    #[tokio::test]
    async fn server_errors_are_prefixed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": "Server error: Provider error: boom"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.generate_more_palettes(&sample_plan(), "boho").await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(err.message, "An error occurred: Server error: Provider error: boom");
    }

    #[tokio::test]
    async fn safety_errors_get_friendly_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Server error: Image generation stopped unexpectedly. Reason: IMAGE_SAFETY"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .generate_redesigned_image(
                &sample_plan(),
                "boho",
                "bedroom",
                &RoomImage::new("image/jpeg", b"x".to_vec()),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.message, SAFETY_BLOCKED_MESSAGE);
    }

    #[tokio::test]
    async fn unparseable_error_body_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.generate_more_palettes(&sample_plan(), "boho").await.unwrap_err();
        assert_eq!(err.status, Some(502));
        assert_eq!(err.message, format!("{ERROR_PREFIX}{UNPARSEABLE_ERROR_MESSAGE}"));
    }
}
