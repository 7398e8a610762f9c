use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::turn::TurnInput;
use crate::runtime::InlineData;

/// The prompt plus the optional inline image sent for a single turn.
///
/// `inline_data` is present exactly when the user attached an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Build the outbound payload for a turn. Pure: same input, same payload.
pub fn build_payload(input: &TurnInput) -> RequestPayload {
    let inline_data = input.image.as_ref().map(|image| InlineData {
        mime_type: image.mime_type.clone(),
        data: STANDARD.encode(&image.bytes),
        display_name: image.file_name.clone(),
    });

    RequestPayload {
        prompt: input.prompt.clone(),
        inline_data,
    }
}
