//! Unwrapping an image out of a provider response.

use super::DesignError;
use crate::providers::{FINISH_REASON_STOP, GenerateResponse};
use crate::types::GeneratedImage;

/// Longest text excerpt quoted back when the model answers with words.
pub const TEXT_EXCERPT_CHARS: usize = 100;

/// Pull the generated image out of `response`.
///
/// Checks run in a fixed order and the first one that applies decides the
/// outcome: missing candidate, abnormal finish reason, inline image data,
/// text-only answer, then nothing usable at all.
pub fn extract_image(response: &GenerateResponse) -> Result<GeneratedImage, DesignError> {
    let Some(candidate) = response.candidates.first() else {
        return Err(DesignError::ProviderBlocked(blocked_message(response)));
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != FINISH_REASON_STOP {
            return Err(DesignError::GenerationStopped(reason.to_string()));
        }
    }

    let parts = candidate.parts();

    if let Some(data) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
        return Ok(GeneratedImage {
            mime_type: data.mime_type.clone(),
            data: data.data.clone(),
        });
    }

    if let Some(text) = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .find(|t| !t.trim().is_empty())
    {
        let excerpt: String = text.chars().take(TEXT_EXCERPT_CHARS).collect();
        return Err(DesignError::UnexpectedTextResponse(excerpt));
    }

    Err(DesignError::NoImageReturned)
}

fn blocked_message(response: &GenerateResponse) -> String {
    let feedback = response.prompt_feedback.as_ref();

    if let Some(reason) = feedback.and_then(|f| f.block_reason.as_deref()) {
        return format!("Request was blocked by the provider. Reason: {reason}");
    }

    match feedback.map(|f| f.safety_ratings.as_slice()) {
        Some(ratings) if !ratings.is_empty() => {
            let pairs = ratings
                .iter()
                .map(|r| format!("{}: {}", r.category, r.probability))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Request was blocked due to safety ratings: {pairs}")
        }
        _ => "The model returned an empty response.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn response(v: Value) -> GenerateResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn empty_candidates_report_block_reason_verbatim() {
        let err = extract_image(&response(json!({
            "candidates": [],
            "promptFeedback": {
                "blockReason": "PROHIBITED_CONTENT",
                "safetyRatings": [{"category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH"}]
            }
        })))
        .unwrap_err();
        assert!(matches!(err, DesignError::ProviderBlocked(_)));
        assert!(err.to_string().contains("PROHIBITED_CONTENT"));
        assert!(!err.to_string().contains("HARM_CATEGORY_HARASSMENT"));
    }

    #[test]
    fn empty_candidates_enumerate_safety_ratings() {
        let err = extract_image(&response(json!({
            "promptFeedback": {
                "safetyRatings": [
                    {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "probability": "MEDIUM"},
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "probability": "LOW"}
                ]
            }
        })))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("HARM_CATEGORY_DANGEROUS_CONTENT: MEDIUM"), "{msg}");
        assert!(msg.contains("HARM_CATEGORY_HATE_SPEECH: LOW"), "{msg}");
    }

    #[test]
    fn empty_candidates_without_feedback_is_generic() {
        let err = extract_image(&response(json!({}))).unwrap_err();
        assert!(matches!(err, DesignError::ProviderBlocked(_)));
        assert!(err.to_string().contains("empty response"));
    }

    #[test]
    fn abnormal_finish_reason_is_reported() {
        let err = extract_image(&response(json!({
            "candidates": [{"finishReason": "IMAGE_SAFETY"}]
        })))
        .unwrap_err();
        assert!(matches!(err, DesignError::GenerationStopped(_)));
        assert!(err.to_string().contains("IMAGE_SAFETY"));
    }

    #[test]
    fn finish_reason_wins_over_image_part() {
        let err = extract_image(&response(json!({
            "candidates": [{
                "finishReason": "MAX_TOKENS",
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AAEC"}}]}
            }]
        })))
        .unwrap_err();
        assert!(matches!(err, DesignError::GenerationStopped(ref r) if r == "MAX_TOKENS"));
    }

    #[test]
    fn first_image_part_wins() {
        let img = extract_image(&response(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": {"parts": [
                    {"text": "Here is your room"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAEC"}},
                    {"inlineData": {"mimeType": "image/jpeg", "data": "AwQF"}}
                ]}
            }]
        })))
        .unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.data, vec![0u8, 1, 2]);
    }

    #[test]
    fn missing_finish_reason_still_scans_parts() {
        let img = extract_image(&response(json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/webp", "data": "AAEC"}}]}
            }]
        })))
        .unwrap();
        assert_eq!(img.mime_type, "image/webp");
    }

    #[test]
    fn text_only_answer_is_capped_at_100_chars() {
        let long = "x".repeat(250);
        let err = extract_image(&response(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": {"parts": [{"text": long}]}
            }]
        })))
        .unwrap_err();
        match err {
            DesignError::UnexpectedTextResponse(excerpt) => {
                assert_eq!(excerpt.chars().count(), TEXT_EXCERPT_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_text_is_quoted_whole() {
        let err = extract_image(&response(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": {"parts": [{"text": "I cannot edit this photo."}]}
            }]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("I cannot edit this photo."));
    }

    #[test]
    fn no_parts_means_no_image() {
        let err = extract_image(&response(json!({
            "candidates": [{"finishReason": "STOP", "content": {"parts": []}}]
        })))
        .unwrap_err();
        assert!(matches!(err, DesignError::NoImageReturned));
    }
}
