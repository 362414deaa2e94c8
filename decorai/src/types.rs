use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Design plan
// ---------------------------------------------------------------------------

/// A primary/accent color pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub color: String,
    pub accent: String,
}

impl ColorPalette {
    pub fn new(color: impl Into<String>, accent: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            accent: accent.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    pub name: String,
    pub description: String,
    pub placement: String,
    pub estimated_price: f64,
    /// Link to a 3D asset, or a placeholder URL when none exists.
    #[serde(default)]
    pub model_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

/// Structured redesign plan produced by the text model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPlan {
    pub analysis: String,
    pub design_rationale: String,
    pub wall_color: ColorPalette,
    pub lighting: String,
    pub flooring: String,
    pub furniture_suggestions: Vec<FurnitureItem>,
    pub estimated_cost: CostRange,
    pub alternative_palettes: Vec<ColorPalette>,
}

// ---------------------------------------------------------------------------
// Room description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DimensionUnit {
    #[serde(rename = "ft")]
    Feet,
    #[default]
    #[serde(rename = "m")]
    Meters,
}

impl DimensionUnit {
    /// Unit name as written in prompts.
    pub fn spoken(self) -> &'static str {
        match self {
            DimensionUnit::Feet => "feet",
            DimensionUnit::Meters => "meters",
        }
    }
}

/// `"ft"` is feet. Anything else, including `null`, falls back to meters.
impl<'de> Deserialize<'de> for DimensionUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some("ft") => DimensionUnit::Feet,
            _ => DimensionUnit::Meters,
        })
    }
}

/// Room size as entered by the user. Either side may be left blank.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomDimensions {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub unit: DimensionUnit,
}

/// An uploaded photo, carried as base64 on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomImage {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl RoomImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A generated image. Serializes as a `data:` URL string.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (mime_type, payload) = rest.split_once(";base64,")?;
        let data = STANDARD.decode(payload).ok()?;
        Some(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }
}

impl Serialize for GeneratedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for GeneratedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_data_url(&s)
            .ok_or_else(|| serde::de::Error::custom("expected a base64 data URL"))
    }
}

// ---------------------------------------------------------------------------
// Transport envelope
// ---------------------------------------------------------------------------

/// The `{action, payload}` body posted to the dispatcher.
///
/// `action` stays a plain string here so an unknown or missing action can be
/// reported as such instead of as a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignIdeasPayload {
    pub image: RoomImage,
    pub style: String,
    pub room_type: String,
    #[serde(default)]
    pub dimensions: Option<RoomDimensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedesignedImagePayload {
    pub design_plan: DesignPlan,
    pub style: String,
    pub room_type: String,
    pub image: RoomImage,
    #[serde(default)]
    pub override_colors: Option<ColorPalette>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorePalettesPayload {
    pub design_plan: DesignPlan,
    pub style: String,
}

/// Result of a dispatched action. Serialized bare, without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionOutput {
    DesignPlan(DesignPlan),
    Image(GeneratedImage),
    Palettes(Vec<ColorPalette>),
}

/// Failure body returned by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Serde adapter for `Vec<u8>` fields carried as standard base64 strings.
pub mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) fn sample_plan() -> DesignPlan {
    serde_json::from_value(serde_json::json!({
        "analysis": "Small living room with north light",
        "designRationale": "Warm minimalism",
        "wallColor": {"color": "Sage green", "accent": "Cream"},
        "lighting": "Layered warm LEDs",
        "flooring": "Light oak",
        "furnitureSuggestions": [{
            "name": "Sofa",
            "description": "Low linen sofa",
            "placement": "Against the left wall",
            "estimatedPrice": 900,
            "modelUrl": null
        }],
        "estimatedCost": {"min": 1500, "max": 3000, "currency": "USD"},
        "alternativePalettes": [
            {"color": "Navy", "accent": "Brass"},
            {"color": "Terracotta", "accent": "Sand"},
            {"color": "Charcoal", "accent": "Blush"}
        ]
    }))
    .unwrap()
}
