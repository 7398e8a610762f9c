use chrono::{DateTime, Utc};

/// An image the user attached to a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

/// What the user submitted for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnInput {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
}

impl TurnInput {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResponse {
    /// Summary text returned by the agent.
    Reply(String),
    /// User-facing message describing why the turn failed.
    Failed(String),
}

/// One prompt, its optional image, and what came back.
#[derive(Debug, Clone)]
pub struct Turn {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
    pub response: TurnResponse,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(input: TurnInput, response: TurnResponse) -> Self {
        Self {
            prompt: input.prompt,
            image: input.image,
            response,
            created_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.response, TurnResponse::Failed(_))
    }
}
