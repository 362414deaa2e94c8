//! Response schemas for constrained JSON decoding.
//!
//! Gemini's `responseSchema` is an OpenAPI subset with upper-case type names.

use serde_json::{Value, json};

/// Top-level fields a design plan must carry.
pub const DESIGN_PLAN_REQUIRED: [&str; 8] = [
    "analysis",
    "designRationale",
    "wallColor",
    "lighting",
    "flooring",
    "furnitureSuggestions",
    "estimatedCost",
    "alternativePalettes",
];

/// Fields checked after parsing, whatever the schema promised.
pub const DESIGN_PLAN_CHECKED: [&str; 3] =
    ["furnitureSuggestions", "estimatedCost", "alternativePalettes"];

pub const PALETTE_REQUIRED: [&str; 2] = ["color", "accent"];

fn palette_schema(description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "description": description,
        "properties": {
            "color": {"type": "STRING", "description": "Primary color name and hex code"},
            "accent": {"type": "STRING", "description": "Accent color name and hex code"}
        },
        "required": PALETTE_REQUIRED
    })
}

pub fn design_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {"type": "STRING"},
            "designRationale": {"type": "STRING"},
            "wallColor": palette_schema("Main wall color with an accent"),
            "lighting": {"type": "STRING"},
            "flooring": {"type": "STRING"},
            "furnitureSuggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "description": {"type": "STRING"},
                        "placement": {"type": "STRING"},
                        "estimatedPrice": {"type": "NUMBER"},
                        "modelUrl": {"type": "STRING", "nullable": true}
                    },
                    "required": ["name", "description", "placement", "estimatedPrice", "modelUrl"]
                }
            },
            "estimatedCost": {
                "type": "OBJECT",
                "properties": {
                    "min": {"type": "NUMBER"},
                    "max": {"type": "NUMBER"},
                    "currency": {"type": "STRING"}
                },
                "required": ["min", "max", "currency"]
            },
            "alternativePalettes": {
                "type": "ARRAY",
                "description": "Exactly 3 alternative palettes",
                "items": palette_schema("An alternative palette")
            }
        },
        "required": DESIGN_PLAN_REQUIRED
    })
}

pub fn palettes_schema() -> Value {
    json!({
        "type": "ARRAY",
        "minItems": 3,
        "maxItems": 3,
        "items": palette_schema("A new palette")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_plan_schema_requires_every_top_level_field() {
        let schema = design_plan_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, DESIGN_PLAN_REQUIRED);
        for field in DESIGN_PLAN_REQUIRED {
            assert!(schema["properties"].get(field).is_some(), "{field} missing");
        }
    }

    #[test]
    fn palettes_schema_is_an_array_of_three() {
        let schema = palettes_schema();
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(schema["minItems"], 3);
        assert_eq!(schema["maxItems"], 3);
        assert_eq!(schema["items"]["required"], json!(["color", "accent"]));
    }
}
