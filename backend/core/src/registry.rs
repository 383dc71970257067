//! Static registry of the agent personas exposed by the chat page.

use std::collections::HashSet;

use crate::agent::AgentConfig;
use crate::error::FinnextError;

/// Ordered, non-empty, immutable list of agent personas.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentConfig>,
}

impl AgentRegistry {
    /// Build a registry, rejecting an empty list or duplicate identities.
    pub fn new(agents: Vec<AgentConfig>) -> Result<Self, FinnextError> {
        if agents.is_empty() {
            return Err(FinnextError::Config("agent registry cannot be empty".into()));
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id.as_str()) {
                return Err(FinnextError::Config(format!(
                    "duplicate agent id '{}'",
                    agent.id
                )));
            }
        }
        Ok(Self { agents })
    }

    /// The six financial-analysis personas shipped with the application.
    pub fn builtin() -> Self {
        Self {
            agents: builtin_agents(),
        }
    }

    /// All agents in definition order.
    pub fn list(&self) -> &[AgentConfig] {
        &self.agents
    }

    pub fn get(&self, id: &str) -> Result<&AgentConfig, FinnextError> {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| FinnextError::AgentNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.iter().any(|a| a.id == id)
    }

    /// The first agent; the chat page starts here.
    pub fn default_agent(&self) -> &AgentConfig {
        &self.agents[0]
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.id.as_str())
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig::new("portfolio", "Portfolio Analysis Agent")
            .with_description(
                "Analyzes user's holdings, sector weights, diversification, gain/loss, and preferences.",
            )
            .with_icon("📁")
            .with_system_prompt(
                "You are Portfolio Analysis Agent. Analyze user portfolio, sector weights, diversification, \
                 and strengths/weaknesses ONLY using provided data. If data is missing, ask for it. Do NOT hallucinate.",
            )
            .with_metadata(
                "Financial portfolio analyzer",
                "Identify portfolio strengths, weaknesses, and diversification opportunities.",
            ),
        AgentConfig::new("risk", "Risk Agent")
            .with_description(
                "Calculates personalized risk profile based on volatility, beta, and user tolerance.",
            )
            .with_icon("⚖️")
            .with_system_prompt(
                "You are Risk Agent. Provide risk score (1–10), category, and explanation based ONLY on \
                 user inputs and volatility/beta data. Do NOT hallucinate.",
            )
            .with_metadata(
                "Risk assessment",
                "Recommend optimal risk level and asset allocation guidelines.",
            ),
        AgentConfig::new("sentiment", "Sentiment Agent")
            .with_description("Analyzes market sentiment from news, social media, and indices.")
            .with_icon("📝")
            .with_system_prompt(
                "You are Sentiment Agent. Analyze market/news sentiment and return sentiment score \
                 (-1 to +1) with explanation. Only use provided data.",
            )
            .with_metadata(
                "Market sentiment analysis",
                "Provide sentiment scores for sectors and stocks.",
            ),
        AgentConfig::new("forecast", "Forecast Agent")
            .with_description("Generates short-term numeric forecasts.")
            .with_icon("🔮")
            .with_system_prompt(
                "You are Forecast Agent. ONLY generate numeric forecasts if data is available. \
                 Otherwise say 'insufficient data'.",
            )
            .with_metadata(
                "Forecast engine",
                "Predict short-term stock movements responsibly.",
            ),
        AgentConfig::new("screener", "Screener Agent")
            .with_description("Filters and screens stocks based on user preferences.")
            .with_icon("🔎")
            .with_system_prompt(
                "You are Screener Agent. Filter and screen stocks ONLY using provided dataset & filters. \
                 Never invent data.",
            )
            .with_metadata("Stock screener", "Return accurate filtered stock lists."),
        AgentConfig::new("recommendation", "Recommendation Agent")
            .with_description(
                "Generates final stock/portfolio recommendations using multi-agent results.",
            )
            .with_icon("🤖")
            .with_system_prompt(
                "You are Recommendation Agent. Make recommendations ONLY using outputs from Portfolio, \
                 Risk, Sentiment, Forecast, and Screener Agents.",
            )
            .with_metadata(
                "Recommendation engine",
                "Provide well-rounded stock recommendations using multi-agent inputs.",
            ),
    ]
}
