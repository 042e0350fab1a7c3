use tracing::debug;

use crate::error::ChatError;
use crate::gateway::AssistantGateway;
use crate::session::{dedup_citations, Message};

/// One conversation against the remote assistant: a single thread id, an
/// append-only transcript, and one in-flight turn at a time.
///
/// The transcript keeps whatever was appended before a failure; a user
/// message is never rolled back.
pub struct Conversation<G> {
    gateway: G,
    thread_id: Option<String>,
    pending: bool,
    transcript: Vec<Message>,
}

impl<G: AssistantGateway> Conversation<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway, thread_id: None, pending: false, transcript: Vec::new() }
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// True between sending a user message and resolving the assistant reply
    /// or an error. Callers hold new input while this is set.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Acquires a thread id from the gateway. Must succeed before any `send`;
    /// on failure the conversation stays without a thread and `send` fails
    /// fast with [`ChatError::SessionNotReady`].
    pub async fn start(&mut self) -> Result<(), ChatError> {
        let thread = self.gateway.create_thread().await?;
        debug!(thread = %thread, "conversation thread created");
        self.thread_id = Some(thread);
        Ok(())
    }

    /// Runs one user turn: append the user message, then create-message,
    /// run-thread, retrieve-message against the gateway, strictly in order.
    /// Any failure ends the turn with the pending flag cleared.
    pub async fn send(&mut self, text: &str) -> Result<Message, ChatError> {
        let thread_id = self.thread_id.clone().ok_or(ChatError::SessionNotReady)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        self.transcript.push(Message::user(trimmed));
        self.pending = true;
        let result = self.run_turn(&thread_id, trimmed).await;
        self.pending = false;

        let reply = result?;
        self.transcript.push(reply.clone());
        Ok(reply)
    }

    async fn run_turn(&self, thread_id: &str, content: &str) -> Result<Message, ChatError> {
        self.gateway.create_message(thread_id, content).await?;

        let run = self.gateway.run_thread(thread_id).await?;
        if !run.is_completed() {
            return Err(ChatError::RunNotCompleted(run.status));
        }

        let reply = self.gateway.retrieve_message(thread_id).await?;
        let text = reply.text.ok_or(ChatError::MissingAssistantMessage)?;
        Ok(Message::assistant(text, dedup_citations(reply.citations)))
    }
}
