use serde::{Deserialize, Serialize};

/// Descriptive role/goal strings attached to an agent persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub agent_role: String,
    pub agent_goal: String,
}

/// A named agent persona and the backend endpoint that relays its chat turns.
///
/// Defined once at startup and never mutated; the registry hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Relative path of the proxy endpoint, e.g. `/api/agents/risk`.
    pub api_url: String,
    pub system_prompt: String,
    pub metadata: AgentMetadata,
}

impl AgentConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            api_url: format!("/api/agents/{id}"),
            id,
            name: name.into(),
            description: String::new(),
            icon: String::new(),
            system_prompt: String::new(),
            metadata: AgentMetadata {
                agent_role: String::new(),
                agent_goal: String::new(),
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_metadata(mut self, role: impl Into<String>, goal: impl Into<String>) -> Self {
        self.metadata = AgentMetadata {
            agent_role: role.into(),
            agent_goal: goal.into(),
        };
        self
    }
}
