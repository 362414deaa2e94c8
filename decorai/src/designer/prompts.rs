//! Prompt templates for the three design operations.

use crate::types::{ColorPalette, DesignPlan, RoomDimensions};
use std::fmt::Write;

/// Placeholder used when no 3D asset is known for a furniture item.
pub const PLACEHOLDER_MODEL_URL: &str = "https://modelviewer.dev/shared-assets/models/Chair.glb";

/// `true` when the redesign targets a building exterior rather than a room.
pub fn is_exterior(room_type: &str) -> bool {
    room_type.eq_ignore_ascii_case("exterior")
}

/// Sentence describing the room size, or `None` unless both sides are known.
pub fn dimension_sentence(dimensions: Option<&RoomDimensions>) -> Option<String> {
    let d = dimensions?;
    let (width, length) = (d.width?, d.length?);
    Some(format!(
        "The space measures {} by {} {}. Scale the furniture and the cost estimate to these dimensions.",
        width,
        length,
        d.unit.spoken()
    ))
}

pub fn design_ideas_prompt(
    style: &str,
    room_type: &str,
    dimensions: Option<&RoomDimensions>,
) -> String {
    let mut prompt = format!(
        "You are an expert interior and exterior designer. Analyze the attached photo of a {room_type} \
and produce a complete redesign plan in the \"{style}\" style.\n\
\n\
Your plan must include:\n\
- analysis: a short assessment of the current space, its light and its strengths.\n\
- designRationale: why the {style} style suits this space and how the plan applies it.\n\
- wallColor: the main wall color and an accent color.\n\
- lighting: a lighting concept.\n\
- flooring: a flooring recommendation.\n\
- furnitureSuggestions: the pieces to add, each with a name, a short description, \
where it goes in the photo, an estimated price and a modelUrl pointing to a .glb 3D model. \
If you do not know a real model, use \"{PLACEHOLDER_MODEL_URL}\".\n\
- estimatedCost: a realistic min and max total budget with its currency.\n\
- alternativePalettes: exactly 3 alternative wall/accent palettes that also fit the style, \
each clearly different from the main palette and from each other."
    );

    if let Some(sentence) = dimension_sentence(dimensions) {
        prompt.push_str("\n\n");
        prompt.push_str(&sentence);
    }

    prompt
}

pub fn redesign_prompt(
    plan: &DesignPlan,
    style: &str,
    room_type: &str,
    override_colors: Option<&ColorPalette>,
) -> String {
    let palette = override_colors.unwrap_or(&plan.wall_color);
    let items = furniture_lines(plan);

    if is_exterior(room_type) {
        format!(
            "Redesign the exterior of the building in this photo in a {style} style.\n\
\n\
Keep the architecture exactly as it is: the roofline, the building shape, windows, doors \
and the camera angle must not change.\n\
Replace every landscaping element, exterior finish and piece of outdoor decor according to this plan:\n\
- Exterior color: {color} with {accent} accents\n\
- Lighting: {lighting}\n\
- Ground surfaces: {flooring}\n\
Landscaping & decor:\n\
{items}\n\
Return only the photorealistic redesigned image. Do not add any text, labels or watermarks.",
            color = palette.color,
            accent = palette.accent,
            lighting = plan.lighting,
            flooring = plan.flooring,
        )
    } else {
        format!(
            "Redesign this {room_type} in a {style} style.\n\
\n\
Keep the room's structure exactly as it is: walls, windows, doors, ceiling, room layout \
and the camera angle must not change.\n\
Replace all furniture, decor and surfaces according to this plan:\n\
- Wall color: {color} with {accent} accents\n\
- Lighting: {lighting}\n\
- Flooring: {flooring}\n\
Furniture:\n\
{items}\n\
Return only the photorealistic redesigned image. Do not add any text, labels or watermarks.",
            color = palette.color,
            accent = palette.accent,
            lighting = plan.lighting,
            flooring = plan.flooring,
        )
    }
}

pub fn more_palettes_prompt(plan: &DesignPlan, style: &str) -> String {
    let mut existing = String::new();
    for palette in std::iter::once(&plan.wall_color).chain(&plan.alternative_palettes) {
        let _ = writeln!(existing, "- {} & {}", palette.color, palette.accent);
    }

    format!(
        "You are a color consultant working on a {style} design.\n\
These wall/accent palettes have already been suggested:\n\
{existing}\n\
Suggest exactly 3 new palettes that suit the {style} style and do not repeat any of the ones above. \
Vary the mood: one calming, one energetic and one sophisticated."
    )
}

fn furniture_lines(plan: &DesignPlan) -> String {
    plan.furniture_suggestions
        .iter()
        .map(|item| format!("- {}: {}", item.name, item.placement))
        .collect::<Vec<_>>()
        .join("\n")
}
