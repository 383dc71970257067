use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

/// A citation attached to an agent reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub link: String,
}

/// One entry in an agent's chat history. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub content: String,
    pub sender: Sender,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(id: u64, agent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::User,
            agent_id: agent_id.into(),
            sources: None,
            created_at: Utc::now(),
        }
    }

    pub fn agent(id: u64, agent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::Agent,
            agent_id: agent_id.into(),
            sources: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = Some(sources);
        self
    }
}

/// A `{role, content}` pair sent to the proxy as conversational context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

impl From<&Message> for HistoryTurn {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.sender.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Body accepted by a proxy endpoint.
///
/// `input` is optional on the wire so a missing field can be reported as a
/// validation failure instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

impl ProxyRequest {
    pub fn new(input: impl Into<String>, history: Vec<HistoryTurn>) -> Self {
        Self {
            input: Some(input.into()),
            history,
        }
    }
}

/// Normalized success body returned by a proxy endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyReply {
    pub reply: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Failure body returned by a proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
