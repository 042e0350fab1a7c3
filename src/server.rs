use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::Conversation;
use crate::error::ChatError;
use crate::gateway::HttpAssistantGateway;
use crate::session::Message;
use crate::settings::{
    resolve_effective_settings, ConversationSettings, GlobalDefaults, RequestOverrides,
};

type SharedConversation = Arc<Mutex<Conversation<HttpAssistantGateway>>>;

struct ConversationEntry {
    id: Uuid,
    conversation: SharedConversation,
}

#[derive(Clone)]
pub struct AppState {
    defaults: GlobalDefaults,
    conversations: Arc<RwLock<Vec<ConversationEntry>>>,
}

impl AppState {
    pub fn new(defaults: GlobalDefaults) -> Self {
        Self { defaults, conversations: Arc::new(RwLock::new(Vec::new())) }
    }

    async fn find(&self, id: Uuid) -> Option<SharedConversation> {
        let conversations = self.conversations.read().await;
        conversations.iter().find(|e| e.id == id).map(|e| e.conversation.clone())
    }
}

fn status_for(err: &ChatError) -> StatusCode {
    match err {
        ChatError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
        ChatError::SessionNotReady => StatusCode::CONFLICT,
        ChatError::NetworkFailure(_)
        | ChatError::InvalidResponse(_)
        | ChatError::RunNotCompleted(_)
        | ChatError::MissingAssistantMessage => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateConversationBody {
    pub settings: Option<ConversationSettings>,
}

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub id: Uuid,
    pub thread: String,
}

async fn create_conversation(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(body): Json<CreateConversationBody>,
) -> Result<Json<CreateConversationResponse>, StatusCode> {
    let settings = body.settings.unwrap_or_default();
    let effective =
        resolve_effective_settings(&state.defaults, &settings, &RequestOverrides::default());
    let gateway = HttpAssistantGateway::new(effective.base_url, effective.assistant_id);

    let mut conversation = Conversation::new(gateway);
    if let Err(err) = conversation.start().await {
        warn!(error = %err, "failed to start conversation");
        return Err(status_for(&err));
    }
    let thread = conversation.thread_id().map(str::to_string).unwrap_or_default();

    let id = Uuid::new_v4();
    let mut conversations = state.conversations.write().await;
    conversations.push(ConversationEntry {
        id,
        conversation: Arc::new(Mutex::new(conversation)),
    });
    info!(%id, thread = %thread, "conversation started");
    Ok(Json(CreateConversationResponse { id, thread }))
}

#[derive(Debug, Serialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<Uuid>,
}

async fn list_conversations(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<ListConversationsResponse> {
    let conversations = state.conversations.read().await;
    let ids = conversations.iter().map(|e| e.id).collect();
    Json(ListConversationsResponse { conversations: ids })
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub thread: Option<String>,
    pub pending: bool,
    pub messages: Vec<Message>,
}

async fn get_conversation(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(id): axum::extract::Path<Uuid>,
) -> Result<Json<ConversationResponse>, StatusCode> {
    let Some(shared) = state.find(id).await else {
        return Err(StatusCode::NOT_FOUND);
    };
    let conversation = shared.lock().await;
    Ok(Json(ConversationResponse {
        thread: conversation.thread_id().map(str::to_string),
        pending: conversation.is_pending(),
        messages: conversation.transcript().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PostMessageBody {
    pub text: String,
}

async fn post_message(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(id): axum::extract::Path<Uuid>,
    Json(body): Json<PostMessageBody>,
) -> Result<Json<Message>, StatusCode> {
    let Some(shared) = state.find(id).await else {
        return Err(StatusCode::NOT_FOUND);
    };
    // the per-conversation lock holds concurrent sends until the turn resolves
    let mut conversation = shared.lock().await;
    match conversation.send(&body.text).await {
        Ok(reply) => Ok(Json(reply)),
        Err(err) => {
            warn!(%id, error = %err, "turn failed");
            Err(status_for(&err))
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/conversations", post(create_conversation).get(list_conversations))
        .route("/v1/conversations/:id", get(get_conversation))
        .route("/v1/conversations/:id/messages", post(post_message))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
