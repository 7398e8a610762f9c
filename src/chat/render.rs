use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tera::{Context, Tera};

use super::turn::{Turn, TurnResponse};

const PAGE_TEMPLATE: &str = include_str!("../../templates/index.html");

/// A turn flattened for the template: prompt, optional preview, then either
/// the summary or the error message.
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub prompt: String,
    pub image_src: Option<String>,
    pub reply: Option<String>,
    pub error: Option<String>,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub title: String,
    pub agent_name: String,
    pub agent_description: String,
    pub model: String,
    pub runtime_url: String,
    pub session_id: Option<String>,
    pub notice: Option<String>,
    pub turns: Vec<TurnView>,
}

pub fn render_turn(turn: &Turn) -> TurnView {
    let image_src = turn
        .image
        .as_ref()
        .map(|image| format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.bytes)));

    let (reply, error) = match &turn.response {
        TurnResponse::Reply(text) => (Some(text.clone()), None),
        TurnResponse::Failed(message) => (None, Some(message.clone())),
    };

    TurnView {
        prompt: turn.prompt.clone(),
        image_src,
        reply,
        error,
        time: turn.created_at.format("%H:%M:%S").to_string(),
    }
}

/// Renders the chat page.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", PAGE_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render_page(&self, page: &PageView) -> Result<String, tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render("index.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::turn::{ImageAttachment, TurnInput};

    fn page(turns: Vec<TurnView>) -> PageView {
        PageView {
            title: "Image Analysis Agent".to_string(),
            agent_name: "image_agent".to_string(),
            agent_description: "Image summarization agent".to_string(),
            model: "gemini-2.0-flash".to_string(),
            runtime_url: "http://localhost:8000".to_string(),
            session_id: Some("session-1".to_string()),
            notice: None,
            turns,
        }
    }

    fn jpeg() -> ImageAttachment {
        ImageAttachment {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            mime_type: "image/jpeg".to_string(),
            file_name: Some("bike.jpg".to_string()),
        }
    }

    #[test]
    fn prompt_then_preview_then_summary() {
        let turn = Turn::new(
            TurnInput::text("Describe this photo").with_image(jpeg()),
            TurnResponse::Reply("A red bicycle.".to_string()),
        );
        let html = Renderer::new()
            .unwrap()
            .render_page(&page(vec![render_turn(&turn)]))
            .unwrap();

        let prompt_at = html.find("Describe this photo").unwrap();
        let image_at = html.find("data:image/jpeg;base64,/9j/4A==").unwrap();
        let summary_at = html.find("A red bicycle.").unwrap();
        assert!(prompt_at < image_at && image_at < summary_at);
    }

    #[test]
    fn failed_turn_shows_error_indicator() {
        let turn = Turn::new(
            TurnInput::text("hello"),
            TurnResponse::Failed("could not reach the agent runtime".to_string()),
        );
        let view = render_turn(&turn);
        assert!(view.reply.is_none());

        let html = Renderer::new().unwrap().render_page(&page(vec![view])).unwrap();
        assert!(html.contains("turn-error"));
        assert!(html.contains("could not reach the agent runtime"));
    }

    #[test]
    fn user_text_is_escaped() {
        let turn = Turn::new(
            TurnInput::text("<script>alert(1)</script>"),
            TurnResponse::Reply("fine".to_string()),
        );
        let html = Renderer::new()
            .unwrap()
            .render_page(&page(vec![render_turn(&turn)]))
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn only_turns_with_images_get_a_preview() {
        let first = Turn::new(
            TurnInput::text("first").with_image(jpeg()),
            TurnResponse::Reply("one".to_string()),
        );
        let second = Turn::new(TurnInput::text("second"), TurnResponse::Reply("two".to_string()));

        let views = vec![render_turn(&first), render_turn(&second)];
        assert!(views[0].image_src.is_some());
        assert!(views[1].image_src.is_none());

        let html = Renderer::new().unwrap().render_page(&page(views)).unwrap();
        assert_eq!(html.matches("class=\"preview\"").count(), 1);
    }
}
