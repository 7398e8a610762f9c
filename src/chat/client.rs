use tracing::{info, warn};

use super::payload::{build_payload, RequestPayload};
use super::session::{new_session_id, SessionStore};
use super::turn::{Turn, TurnInput, TurnResponse};
use crate::runtime::{AgentBackend, AgentError, AgentReply, SessionRef};

/// Create a runtime session for `client_id` and attach it. Clears the shown
/// history when `clear_history` is set.
pub async fn open_session(
    backend: &dyn AgentBackend,
    store: &SessionStore,
    client_id: &str,
    clear_history: bool,
) -> Result<SessionRef, AgentError> {
    store.ensure(client_id);
    let user_id = store.user_id(client_id).unwrap_or_default();
    let target = SessionRef {
        user_id,
        session_id: new_session_id(),
    };

    backend.create_session(&target).await?;
    store.start_runtime_session(client_id, target.session_id.clone(), clear_history);
    info!("Opened runtime session {} for {}", target.session_id, target.user_id);
    Ok(target)
}

/// One interaction: build the payload, make the single call, record the turn.
///
/// Failures become a failed turn rather than an error so the next turn can
/// proceed normally.
pub async fn run_turn(
    backend: &dyn AgentBackend,
    store: &SessionStore,
    client_id: &str,
    input: TurnInput,
) -> TurnResponse {
    let payload = build_payload(&input);

    let response = match send_on_session(backend, store, client_id, &payload).await {
        Ok(reply) => TurnResponse::Reply(reply.summary),
        Err(e) => {
            warn!("Turn failed for {} ({}): {}", client_id, e.kind(), e);
            TurnResponse::Failed(e.to_string())
        }
    };

    store.record_turn(client_id, Turn::new(input, response.clone()));
    response
}

async fn send_on_session(
    backend: &dyn AgentBackend,
    store: &SessionStore,
    client_id: &str,
    payload: &RequestPayload,
) -> Result<AgentReply, AgentError> {
    let target = match store.runtime_target(client_id) {
        Some(target) => target,
        None => open_session(backend, store, client_id, false).await?,
    };
    backend.send_request(&target, payload).await
}
