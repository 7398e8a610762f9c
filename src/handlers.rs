use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::agent::AgentConfig;
use crate::chat::{self, render_turn, PageView, SessionStore};
use crate::state::AppState;

pub const CLIENT_COOKIE: &str = "image_agent_client";

/// Client id from the cookie, or a fresh one that must be set on the response.
fn client_id(headers: &HeaderMap) -> (String, bool) {
    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CLIENT_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty());

    match existing {
        Some(id) => (id, false),
        None => (SessionStore::generate_client_id(), true),
    }
}

fn with_cookie(mut response: Response, client_id: &str, is_new: bool) -> Response {
    if is_new {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", CLIENT_COOKIE, client_id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (client_id, is_new) = client_id(&headers);
    // Viewing the page never creates a session; the first submission does.
    let notice = state.sessions.take_notice(&client_id);

    let (session_id, turns) = state
        .sessions
        .with_session(&client_id, |s| {
            (
                s.runtime_session_id.clone(),
                s.turns.iter().map(render_turn).collect::<Vec<_>>(),
            )
        })
        .unwrap_or_default();

    let page = PageView {
        title: state.config.ui.title.clone(),
        agent_name: state.agent.name.clone(),
        agent_description: state.agent.description.clone(),
        model: state.agent.model.clone(),
        runtime_url: state.config.runtime.base_url.clone(),
        session_id,
        notice,
        turns,
    };

    let response = match state.renderer.render_page(&page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render chat page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    };
    with_cookie(response, &client_id, is_new)
}

pub async fn submit_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (client_id, is_new) = client_id(&headers);
    state.sessions.ensure(&client_id);

    match chat::collect_input(multipart, state.config.ui.max_upload_bytes).await {
        Ok(input) => {
            chat::run_turn(state.backend.as_ref(), &state.sessions, &client_id, input).await;
        }
        Err(e) => {
            warn!("Rejected chat input from {}: {}", client_id, e);
            state.sessions.set_notice(&client_id, e.to_string());
        }
    }

    with_cookie(Redirect::to("/").into_response(), &client_id, is_new)
}

pub async fn new_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (client_id, is_new) = client_id(&headers);

    if let Err(e) =
        chat::open_session(state.backend.as_ref(), &state.sessions, &client_id, true).await
    {
        warn!("Failed to create session for {}: {}", client_id, e);
        state
            .sessions
            .set_notice(&client_id, format!("Failed to create session: {}", e));
    }

    with_cookie(Redirect::to("/").into_response(), &client_id, is_new)
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let runtime_healthy = state.backend.health_check().await;
    Json(json!({
        "status": "ok",
        "agent_runtime": runtime_healthy,
        "sessions": state.sessions.len()
    }))
}

pub async fn agent_definition(State(state): State<AppState>) -> Json<AgentConfig> {
    info!("Serving agent definition '{}'", state.agent.name);
    Json(state.agent.as_ref().clone())
}
