//! The conversational intake endpoints: `POST /chat` and `POST /reset`.
//!
//! Every conversation-level outcome — prompts, invalid choices, plans built
//! from the fallback — is a 200 with a JSON body. Only malformed requests and
//! rate limiting surface as HTTP errors.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use destress_core::conversation::Turn;
use destress_core::error::ApiError;
use destress_core::plan::PlanResult;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::session::SessionId;
use crate::state::AppState;

/// Confirmation sent by POST /reset.
pub const RESET_MESSAGE: &str = "Chat reset! Let's start fresh 😊";

pub fn chat_router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

pub fn reset_router() -> Router<AppState> {
    Router::new().route("/reset", post(reset))
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ChatRequest {
    /// The user's message. Optional — an empty or missing message is enough
    /// to bootstrap a session and receive the welcome prompt.
    #[serde(default)]
    pub message: Option<String>,
}

/// A non-terminal system message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChatMessage {
    pub message: String,
}

/// Either the next prompt in the flow or the terminal plan.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ChatResponse {
    Prompt(ChatMessage),
    Plan(PlanResult),
}

/// Advance the conversation for one session by one message.
///
/// Statelessness lives here, not in the core: the session store is looked up
/// per request and the state machine only ever sees its own session's state.
async fn run_turn(
    state: &AppState,
    session_id: &str,
    message: &str,
) -> Result<ChatResponse, AppError> {
    match state.sessions.advance(session_id, message, &state.catalog) {
        Turn::Prompt(text) => Ok(ChatResponse::Prompt(ChatMessage { message: text })),
        Turn::Completed(intake) => {
            // The session entry is already gone; synthesize exactly once.
            let domain = state.catalog.get(&intake.domain_id).ok_or_else(|| {
                AppError::Internal(format!(
                    "completed intake references unknown domain '{}'",
                    intake.domain_id
                ))
            })?;
            let plan = state.synthesizer.synthesize(domain, &intake.answers).await;
            Ok(ChatResponse::Plan(plan))
        }
    }
}

/// Send one message to the intake flow
///
/// The first call of a session (any content) returns the welcome prompt.
/// From there the flow is strictly forward-only: start keyword, domain
/// choice, five answers, terminal plan. The terminal reply uses the
/// `{stress_area, detailed_plan}` shape and clears the session.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Next prompt or terminal plan", body = ChatResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 429, description = "Rate limited", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    session: SessionId,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Response, AppError> {
    let message = request.message.unwrap_or_default();
    let response = run_turn(&state, &session.id, &message).await?;
    Ok(respond(session, Json(response)))
}

/// Clear the calling session's conversation state
#[utoipa::path(
    post,
    path = "/reset",
    responses(
        (status = 200, description = "Session cleared", body = ChatMessage),
        (status = 429, description = "Rate limited", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn reset(State(state): State<AppState>, session: SessionId) -> Response {
    state.sessions.reset(&session.id);
    respond(
        session,
        Json(ChatMessage {
            message: RESET_MESSAGE.to_string(),
        }),
    )
}

/// Attach the session cookie when the id was minted for this request.
fn respond<T: IntoResponse>(session: SessionId, body: T) -> Response {
    if session.is_new {
        (AppendHeaders([(SET_COOKIE, session.set_cookie())]), body).into_response()
    } else {
        body.into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use destress_core::catalog::DomainCatalog;
    use destress_core::conversation::WELCOME_MESSAGE;
    use destress_core::plan::PlanSynthesizer;

    use super::*;
    use crate::generate::DisabledGenerator;
    use crate::sessions::SessionStore;

    /// State with the generator disabled, so terminal turns take the
    /// deterministic fallback path.
    fn test_state() -> AppState {
        AppState {
            catalog: Arc::new(DomainCatalog::builtin()),
            sessions: SessionStore::new(),
            synthesizer: Arc::new(PlanSynthesizer::new(Arc::new(DisabledGenerator))),
        }
    }

    fn prompt_text(response: ChatResponse) -> String {
        match response {
            ChatResponse::Prompt(msg) => msg.message,
            ChatResponse::Plan(plan) => panic!("expected prompt, got plan {plan:?}"),
        }
    }

    #[tokio::test]
    async fn full_session_walkthrough() {
        let state = test_state();
        let sid = "walkthrough";

        let welcome = prompt_text(run_turn(&state, sid, "").await.unwrap());
        assert_eq!(welcome, WELCOME_MESSAGE);

        let selection = prompt_text(run_turn(&state, sid, "hello").await.unwrap());
        for id in ["1", "2", "3", "4", "5"] {
            assert!(selection.contains(&format!("[{id}]")));
        }

        let first_question = prompt_text(run_turn(&state, sid, "2").await.unwrap());
        let domain = state.catalog.get("2").unwrap();
        assert_eq!(first_question, domain.questions[0]);

        for i in 0..4 {
            let next = prompt_text(run_turn(&state, sid, &format!("answer {i}")).await.unwrap());
            assert_eq!(next, domain.questions[i + 1]);
        }

        let last = run_turn(&state, sid, "final answer").await.unwrap();
        let ChatResponse::Plan(plan) = last else {
            panic!("expected terminal plan, got {last:?}");
        };
        assert_eq!(plan.stress_area, "Mental Wellbeing");
        assert!(!plan.detailed_plan.is_empty());
        assert!(plan.detailed_plan.contains(domain.resource));

        // Terminal turn cleared the session: next call is a fresh welcome
        let again = prompt_text(run_turn(&state, sid, "hello").await.unwrap());
        assert_eq!(again, WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn invalid_domain_choice_is_answered_in_band() {
        let state = test_state();
        let sid = "invalid-choice";

        run_turn(&state, sid, "").await.unwrap();
        run_turn(&state, sid, "hello").await.unwrap();

        let reply = prompt_text(run_turn(&state, sid, "9").await.unwrap());
        assert!(reply.starts_with("⚠️ Invalid choice."));

        // Still selecting: a valid choice now works
        let question = prompt_text(run_turn(&state, sid, "3").await.unwrap());
        assert_eq!(question, state.catalog.get("3").unwrap().questions[0]);
    }

    #[tokio::test]
    async fn reset_clears_only_the_calling_session() {
        let state = test_state();

        run_turn(&state, "a", "").await.unwrap();
        run_turn(&state, "a", "hello").await.unwrap();
        run_turn(&state, "b", "").await.unwrap();

        assert!(state.sessions.reset("a"));
        assert_eq!(state.sessions.active(), 1);

        // "a" starts over with the welcome
        let welcome = prompt_text(run_turn(&state, "a", "1").await.unwrap());
        assert_eq!(welcome, WELCOME_MESSAGE);
    }

    #[test]
    fn prompt_and_plan_serialize_to_the_wire_shapes() {
        let prompt = ChatResponse::Prompt(ChatMessage {
            message: "next question".to_string(),
        });
        let value = serde_json::to_value(&prompt).unwrap();
        assert_eq!(value, serde_json::json!({"message": "next question"}));

        let plan = ChatResponse::Plan(PlanResult {
            stress_area: "Academics".to_string(),
            detailed_plan: "plan text".to_string(),
        });
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"stress_area": "Academics", "detailed_plan": "plan text"})
        );
    }
}
