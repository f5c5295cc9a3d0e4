//! HTTP/WebSocket Handlers

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::Response,
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use agent_core::{AgentError, Runner};
use site_assistant::WELCOME_MESSAGE;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_connected: bool,
}

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub turn_id: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Status and code for a failed turn; the body only carries the notice
fn agent_error(err: &AgentError) -> ApiError {
    let (status, code) = match err {
        AgentError::ModelUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE"),
        AgentError::TurnTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TURN_TIMEOUT"),
        AgentError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR"),
    };
    api_error(status, err.user_message(), code)
}

/// One inbound message, one outbound message
async fn run_turn(state: &AppState, message: &str) -> Result<ChatResponse, ApiError> {
    if message.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Message must not be empty.",
            "EMPTY_MESSAGE",
        ));
    }

    let result = Runner::run(&state.orchestrator, message, &state.run_config)
        .await
        .map_err(|e| {
            tracing::error!("Agent error: {}", e);
            agent_error(&e)
        })?;

    tracing::info!(
        turn = %result.turn.id,
        tools = ?result.turn.tool_names(),
        "Turn answered"
    );
    tracing::debug!(turn = %result.turn.id, response = %result.final_output, "Response");

    Ok(ChatResponse {
        message: result.final_output,
        turn_id: result.turn.id.to_string(),
        model: state.model().to_string(),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_connected,
    })
}

/// Greeting shown when a chat opens
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}

/// Main chat endpoint
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_turn(&state, &payload.message).await.map(Json)
}

/// WebSocket chat
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let greeting = serde_json::json!({"type": "welcome", "message": WELCOME_MESSAGE});
    if sender.send(Message::Text(greeting.to_string().into())).await.is_err() {
        return;
    }

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        let frame = match serde_json::from_str::<ChatRequest>(msg.as_str()) {
            Ok(request) => match run_turn(&state, &request.message).await {
                Ok(reply) => serde_json::json!({
                    "type": "reply",
                    "message": reply.message,
                    "turn_id": reply.turn_id,
                    "model": reply.model,
                }),
                Err((_, Json(error))) => serde_json::json!({
                    "type": "error",
                    "error": error.error,
                    "code": error.code,
                }),
            },
            Err(e) => serde_json::json!({
                "type": "error",
                "error": format!("Invalid message frame: {}", e),
                "code": "BAD_REQUEST",
            }),
        };

        if sender.send(Message::Text(frame.to_string().into())).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{body::Body, http::Request, Router};
    use tower::ServiceExt;

    use agent_core::testing::ScriptedProvider;
    use agent_core::{Completion, GenerationOptions, ModelBinding, RunConfig, ToolCall};
    use site_assistant::{build_orchestrator, CannedUpdateFeed};

    use tokio_tungstenite::tungstenite::{self, Message as WsMessage};

    use super::*;
    use crate::routes::api_routes;

    fn app(provider: ScriptedProvider, run_config: RunConfig) -> Router {
        let binding = ModelBinding::new(
            Arc::new(provider),
            GenerationOptions::for_model("gemini-2.0-flash"),
        );
        let orchestrator = build_orchestrator(Arc::new(CannedUpdateFeed::new()), binding).unwrap();
        api_routes().with_state(AppState::new(orchestrator, run_config))
    }

    fn chat(message: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({"message": message}).to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_final_output() {
        let provider = ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolCall::new("Payment_Agent", "payment methods")])),
            Ok(Completion::text("New methods and better security.")),
            Ok(Completion::text("We support several new payment methods.")),
        ]);

        let response = app(provider, RunConfig::default())
            .oneshot(chat("What payment methods do you support?"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "We support several new payment methods.");
        assert_eq!(body["model"], "gemini-2.0-flash");
        assert!(body["turn_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn test_model_failure_is_503() {
        let provider = ScriptedProvider::new(vec![Err(AgentError::ModelUnavailable(
            "401 from upstream".into(),
        ))]);

        let response = app(provider, RunConfig::default())
            .oneshot(chat("hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["code"], "MODEL_UNAVAILABLE");
        assert!(!body["error"].as_str().unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_round_budget_is_504() {
        let provider = ScriptedProvider::repeating(Completion::tool_calls(vec![ToolCall::new(
            "Website_Overview_Agent",
            "news",
        )]));
        // The specialist's own budget failure comes back as a tool failure,
        // so only the orchestrator's budget aborts the turn.
        let config = RunConfig::default().max_rounds(2);

        let response = app(provider, config).oneshot(chat("hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["code"], "TURN_TIMEOUT");
    }

    #[tokio::test]
    async fn test_elapsed_timeout_is_504() {
        let provider = ScriptedProvider::repeating(Completion::text("late"))
            .with_delay(Duration::from_millis(200));
        let config = RunConfig::default().turn_timeout(Duration::from_millis(20));

        let response = app(provider, config).oneshot(chat("hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_empty_message_is_400() {
        let provider = ScriptedProvider::new(Vec::new());

        let response = app(provider, RunConfig::default())
            .oneshot(chat("   "))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "EMPTY_MESSAGE");
    }

    #[tokio::test]
    async fn test_welcome() {
        let response = app(ScriptedProvider::new(Vec::new()), RunConfig::default())
            .oneshot(Request::get("/api/welcome").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Welcome to the AI Chatbot Agent!"
        );
    }

    #[tokio::test]
    async fn test_health_reports_provider() {
        let response = app(ScriptedProvider::new(Vec::new()), RunConfig::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["model_connected"].is_boolean());
    }

    /// Serve `router` on an ephemeral port and return the chat socket URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("ws://{}/api/chat/ws", addr)
    }

    async fn next_frame<S>(socket: &mut S) -> serde_json::Value
    where
        S: futures::Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
    {
        match socket.next().await.unwrap().unwrap() {
            WsMessage::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_websocket_answers_each_frame_once() {
        // One answer, then the script runs dry and the model is unavailable
        let provider = ScriptedProvider::new(vec![Ok(Completion::text("Hi there!"))]);
        let url = serve(app(provider, RunConfig::default())).await;
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.unwrap();

        let welcome = next_frame(&mut socket).await;
        assert_eq!(welcome["type"], "welcome");
        assert_eq!(welcome["message"], "Welcome to the AI Chatbot Agent!");

        let hello = serde_json::json!({"message": "hello"}).to_string();
        socket.send(WsMessage::Text(hello.into())).await.unwrap();
        let reply = next_frame(&mut socket).await;
        assert_eq!(reply["type"], "reply");
        assert_eq!(reply["message"], "Hi there!");
        assert_eq!(reply["model"], "gemini-2.0-flash");
        assert!(reply["turn_id"].as_str().is_some_and(|id| !id.is_empty()));

        socket.send(WsMessage::Text("not json".to_string().into())).await.unwrap();
        let bad = next_frame(&mut socket).await;
        assert_eq!(bad["type"], "error");
        assert_eq!(bad["code"], "BAD_REQUEST");

        let again = serde_json::json!({"message": "still there?"}).to_string();
        socket.send(WsMessage::Text(again.into())).await.unwrap();
        let failed = next_frame(&mut socket).await;
        assert_eq!(failed["type"], "error");
        assert_eq!(failed["code"], "MODEL_UNAVAILABLE");

        socket.close(None).await.unwrap();
    }
}
