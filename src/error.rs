use thiserror::Error;

/// Errors surfaced by the conversation client. All are terminal for the
/// current turn; the caller re-enables input and may try again.
#[derive(Debug, Error)]
pub enum ChatError {
    /// `send` was invoked before a thread id was acquired.
    #[error("conversation has no thread yet")]
    SessionNotReady,
    /// The trimmed message text was empty.
    #[error("message text is empty")]
    EmptyInput,
    /// Transport-level failure on a gateway call.
    #[error("gateway unreachable: {0}")]
    NetworkFailure(String),
    /// Non-success status code or undecodable payload from the gateway.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
    /// The assistant run finished with a status other than "completed".
    #[error("assistant run ended with status {0:?}")]
    RunNotCompleted(String),
    /// retrieve-message returned no message text.
    #[error("assistant reply contained no message")]
    MissingAssistantMessage,
}
