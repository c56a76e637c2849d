//! Pass-through client for the remote task assistant.
//!
//! The assistant does all the interpretation. This side only posts the text,
//! keeps the conversation id the assistant hands back, and records a
//! transcript for display. Tool calls are shown, never interpreted.

use chrono::{DateTime, Utc};
use reqwest::Method;
use taskdeck_core::{
    ChatReply, ChatRequest, ClientError, ClientResult, ConversationId, ConversationInfo,
    MessageInfo,
};

use crate::config::ClientConfig;
use crate::http::HttpTransport;

pub const GREETING: &str = "Hi! I am your AI task assistant. Try:\n\n\
• Add task: Buy groceries\n\
• What is on my list?\n\
• Mark task 3 as done\n\
• Delete task 2";

pub const CLEARED: &str = "Chat cleared! How can I help you?";

#[derive(Debug, Clone)]
pub struct ChatClient {
    transport: HttpTransport,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }

    /// Post one message. Error bodies' `detail` is surfaced verbatim.
    pub async fn send(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<ConversationId>,
    ) -> ClientResult<ChatReply> {
        if message.trim().is_empty() {
            return Err(ClientError::invalid_input("chat message must not be empty"));
        }
        tracing::debug!(user_id, ?conversation_id, "POST chat");

        let body = ChatRequest {
            message: message.to_string(),
            conversation_id,
        };
        let request = self
            .transport
            .request(Method::POST, self.transport.endpoint(&["api", user_id, "chat"]))
            .json(&body);
        let response = self.transport.send(request).await?;

        if !response.status().is_success() {
            return Err(HttpTransport::failure(response, "Failed to send message").await);
        }
        HttpTransport::decode(response).await
    }

    pub async fn conversations(&self, user_id: &str) -> ClientResult<Vec<ConversationInfo>> {
        let url = self
            .transport
            .endpoint(&["api", user_id, "chat", "conversations"]);
        let response = self
            .transport
            .send(self.transport.request(Method::GET, url))
            .await?;

        if !response.status().is_success() {
            return Err(HttpTransport::failure(response, "Failed to get conversations").await);
        }
        HttpTransport::decode(response).await
    }

    pub async fn messages(
        &self,
        user_id: &str,
        conversation_id: ConversationId,
    ) -> ClientResult<Vec<MessageInfo>> {
        let id = conversation_id.to_string();
        let url = self
            .transport
            .endpoint(&["api", user_id, "chat", "conversations", &id, "messages"]);
        let response = self
            .transport
            .send(self.transport.request(Method::GET, url))
            .await?;

        if !response.status().is_success() {
            return Err(
                HttpTransport::failure(response, "Failed to get conversation messages").await,
            );
        }
        HttpTransport::decode(response).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub tool_calls: Vec<String>,
}

impl ChatMessage {
    fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            timestamp: Utc::now(),
            tool_calls: Vec::new(),
        }
    }

    fn assistant(content: impl Into<String>, tool_calls: Vec<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            tool_calls,
        }
    }
}

/// One user's conversation with the assistant.
///
/// `send` takes `&mut self`, so a session never has two messages in flight.
#[derive(Debug)]
pub struct ChatSession {
    client: ChatClient,
    user_id: String,
    conversation_id: Option<ConversationId>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: ChatClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
            conversation_id: None,
            messages: vec![ChatMessage::assistant(GREETING, Vec::new())],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.conversation_id
    }

    /// Send `text` and append both sides to the transcript.
    ///
    /// Blank input is ignored and returns `None`. Otherwise returns the
    /// assistant's entry: the reply, or the error text when the call failed.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(text));

        let reply = self
            .client
            .send(&self.user_id, text, self.conversation_id)
            .await;

        let entry = match reply {
            Ok(reply) => {
                if self.conversation_id.is_none() {
                    self.conversation_id = Some(reply.conversation_id);
                }
                let mut entry = ChatMessage::assistant(reply.response, reply.tool_calls);
                if let Some(at) = reply.timestamp {
                    entry.timestamp = at;
                }
                entry
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "chat message failed");
                ChatMessage::assistant(error_text(&e), Vec::new())
            }
        };
        self.messages.push(entry);
        self.messages.last()
    }

    /// Start over: forget the conversation and reset the transcript.
    pub fn clear(&mut self) {
        self.conversation_id = None;
        self.messages = vec![ChatMessage::assistant(CLEARED, Vec::new())];
    }
}

fn error_text(error: &ClientError) -> String {
    match error {
        ClientError::RequestFailed { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
