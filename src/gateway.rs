use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ChatError;
use crate::session::Citation;

/// Final state of a thread run as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub id: String,
    pub status: String,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Assistant text plus its cited source documents, ordered by citation key.
#[derive(Debug, Clone, Default)]
pub struct AssistantReply {
    pub text: Option<String>,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait AssistantGateway: Send + Sync {
    async fn create_thread(&self) -> Result<String, ChatError>;
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<String, ChatError>;
    async fn run_thread(&self, thread_id: &str) -> Result<RunOutcome, ChatError>;
    async fn retrieve_message(&self, thread_id: &str) -> Result<AssistantReply, ChatError>;
}

#[derive(Debug, Deserialize)]
struct CreateThreadResponse {
    thread: String,
}

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RunThreadResponse {
    run: RunPayload,
}

#[derive(Debug, Deserialize)]
struct RunPayload {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct CitationPayload {
    file_name: String,
    url: String,
}

// Citation keys arrive as a JSON object; a BTreeMap fixes their order.
#[derive(Debug, Deserialize)]
struct RetrieveMessageResponse {
    message: Option<String>,
    citations: Option<BTreeMap<String, CitationPayload>>,
}

/// HTTP client for the remote assistant gateway. Explicitly constructed and
/// handed to the conversation client instead of living in a global.
#[derive(Clone)]
pub struct HttpAssistantGateway {
    client: reqwest::Client,
    base_url: String,
    assistant_id: String,
}

impl HttpAssistantGateway {
    pub fn new(base_url: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            assistant_id: assistant_id.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ChatError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::InvalidResponse(format!("status {}", status)));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AssistantGateway for HttpAssistantGateway {
    async fn create_thread(&self) -> Result<String, ChatError> {
        let resp = self
            .client
            .post(self.endpoint("create-thread"))
            .send()
            .await
            .map_err(|e| ChatError::NetworkFailure(e.to_string()))?;
        let body: CreateThreadResponse = Self::decode(resp).await?;
        Ok(body.thread)
    }

    async fn create_message(&self, thread_id: &str, content: &str) -> Result<String, ChatError> {
        let resp = self
            .client
            .get(self.endpoint("create-message"))
            .query(&[("thread_id", thread_id), ("content", content)])
            .send()
            .await
            .map_err(|e| ChatError::NetworkFailure(e.to_string()))?;
        let body: CreateMessageResponse = Self::decode(resp).await?;
        Ok(body.message)
    }

    async fn run_thread(&self, thread_id: &str) -> Result<RunOutcome, ChatError> {
        let resp = self
            .client
            .get(self.endpoint("run-thread"))
            .query(&[("thread_id", thread_id), ("assistant_id", self.assistant_id.as_str())])
            .send()
            .await
            .map_err(|e| ChatError::NetworkFailure(e.to_string()))?;
        let body: RunThreadResponse = Self::decode(resp).await?;
        Ok(RunOutcome { id: body.run.id, status: body.run.status })
    }

    async fn retrieve_message(&self, thread_id: &str) -> Result<AssistantReply, ChatError> {
        let resp = self
            .client
            .get(self.endpoint("retrieve-message"))
            .query(&[("thread_id", thread_id)])
            .send()
            .await
            .map_err(|e| ChatError::NetworkFailure(e.to_string()))?;
        let body: RetrieveMessageResponse = Self::decode(resp).await?;
        let citations = body
            .citations
            .unwrap_or_default()
            .into_values()
            .map(|c| Citation { file_name: c.file_name, url: c.url })
            .collect();
        Ok(AssistantReply { text: body.message, citations })
    }
}
