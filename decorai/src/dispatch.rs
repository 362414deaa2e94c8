//! Routes `{action, payload}` envelopes to the design operations.

use crate::designer::{DesignAdapter, DesignError};
use crate::types::{
    ActionOutput, DesignIdeasPayload, MorePalettesPayload, RedesignedImagePayload, RequestEnvelope,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GenerateDesignIdeas,
    GenerateRedesignedImage,
    GenerateMorePalettes,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::GenerateDesignIdeas => "generateDesignIdeas",
            Action::GenerateRedesignedImage => "generateRedesignedImage",
            Action::GenerateMorePalettes => "generateMorePalettes",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generateDesignIdeas" => Ok(Action::GenerateDesignIdeas),
            "generateRedesignedImage" => Ok(Action::GenerateRedesignedImage),
            "generateMorePalettes" => Ok(Action::GenerateMorePalettes),
            _ => Err(DispatchError::InvalidAction(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Unknown action name. Reported before any provider call.
    #[error("Invalid action")]
    InvalidAction(String),

    #[error("Invalid payload for {action}: {message}")]
    InvalidPayload { action: Action, message: String },

    #[error(transparent)]
    Design(#[from] DesignError),
}

impl DispatchError {
    /// `true` for caller mistakes, `false` for failures while handling.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DispatchError::InvalidAction(_))
    }
}

/// Stateless router over a [`DesignAdapter`].
#[derive(Clone)]
pub struct Dispatcher {
    adapter: DesignAdapter,
}

impl Dispatcher {
    pub fn new(adapter: DesignAdapter) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &DesignAdapter {
        &self.adapter
    }

    pub async fn dispatch(&self, envelope: RequestEnvelope) -> Result<ActionOutput, DispatchError> {
        let action: Action = envelope.action.parse()?;
        tracing::info!(%action, "dispatching action");

        match action {
            Action::GenerateDesignIdeas => {
                let p: DesignIdeasPayload = decode_payload(action, envelope.payload)?;
                let plan = self
                    .adapter
                    .request_design_ideas(&p.image, &p.style, p.dimensions.as_ref(), &p.room_type)
                    .await?;
                Ok(ActionOutput::DesignPlan(plan))
            }
            Action::GenerateRedesignedImage => {
                let p: RedesignedImagePayload = decode_payload(action, envelope.payload)?;
                let image = self
                    .adapter
                    .request_redesigned_image(
                        &p.design_plan,
                        &p.style,
                        &p.room_type,
                        &p.image,
                        p.override_colors.as_ref(),
                    )
                    .await?;
                Ok(ActionOutput::Image(image))
            }
            Action::GenerateMorePalettes => {
                let p: MorePalettesPayload = decode_payload(action, envelope.payload)?;
                let palettes = self
                    .adapter
                    .request_more_palettes(&p.design_plan, &p.style)
                    .await?;
                Ok(ActionOutput::Palettes(palettes))
            }
        }
    }
}

fn decode_payload<T: DeserializeOwned>(
    action: Action,
    payload: serde_json::Value,
) -> Result<T, DispatchError> {
    serde_json::from_value(payload).map_err(|e| DispatchError::InvalidPayload {
        action,
        message: e.to_string(),
    })
}
