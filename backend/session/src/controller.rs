//! Chat Session Controller
//!
//! Submission is a two-phase write: [`ChatSession::begin_submit`] appends the
//! user message and captures the target agent, [`ChatSession::complete`]
//! appends exactly one terminal message to that same agent's history.
//!
//! A turn that is abandoned (its [`PendingTurn`] dropped, or a [`ChatSession::submit`]
//! future cancelled) still resolves, with [`UNEXPECTED_ERROR`].

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use anyhow::{Result, anyhow};
use tracing::{debug, warn};

use finnext_core::{AgentConfig, AgentRegistry, FinnextError, HistoryTurn, Message, ProxyRequest};

use crate::transport::{AgentTransport, Delivery};

/// Shown when no response could be obtained from the agent endpoint.
pub const UNEXPECTED_ERROR: &str = "Unexpected error talking to agent.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// One request is outstanding; input and agent switching are disabled.
    Submitting,
}

/// An accepted submission awaiting its response.
///
/// Consumed by [`ChatSession::complete`], so each submission resolves once.
/// Dropping it instead releases the session at its next mutation.
#[derive(Debug)]
pub struct PendingTurn {
    agent_id: String,
    endpoint: String,
    request: ProxyRequest,
    _live: Arc<()>,
}

impl PendingTurn {
    /// Agent that was active when the turn was submitted.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request(&self) -> &ProxyRequest {
        &self.request
    }
}

/// The accepted turn as seen from the session. `live` dies with its [`PendingTurn`].
struct Outstanding {
    agent_id: String,
    live: Weak<()>,
}

/// Owns an in-flight turn for [`ChatSession::submit`]; resolves it on cancellation.
struct InFlight<'a> {
    turn: Option<(&'a mut ChatSession, PendingTurn)>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some((session, pending)) = self.turn.take() {
            session.complete(pending, Err(anyhow!("submission cancelled before a reply arrived")));
        }
    }
}

/// Per-user chat state across all agent personas.
pub struct ChatSession {
    registry: Arc<AgentRegistry>,
    active_agent: String,
    histories: HashMap<String, Vec<Message>>,
    outstanding: Option<Outstanding>,
    input: String,
    next_id: u64,
}

impl ChatSession {
    /// Start on the registry's first agent with empty histories.
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        let active_agent = registry.default_agent().id.clone();
        let histories = registry
            .ids()
            .map(|id| (id.to_string(), Vec::new()))
            .collect();
        Self {
            registry,
            active_agent,
            histories,
            outstanding: None,
            input: String::new(),
            next_id: 1,
        }
    }

    pub fn with_active_agent(registry: Arc<AgentRegistry>, id: &str) -> Result<Self, FinnextError> {
        let mut session = Self::new(registry);
        session.switch_agent(id)?;
        Ok(session)
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn active_agent(&self) -> &AgentConfig {
        self.registry
            .get(&self.active_agent)
            .unwrap_or_else(|_| self.registry.default_agent())
    }

    pub fn state(&self) -> SessionState {
        if self.is_loading() {
            SessionState::Submitting
        } else {
            SessionState::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.outstanding
            .as_ref()
            .is_some_and(|turn| turn.live.strong_count() > 0)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// History for one agent; empty for identities outside the registry.
    pub fn history(&self, agent_id: &str) -> &[Message] {
        self.histories
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn active_history(&self) -> &[Message] {
        self.history(&self.active_agent)
    }

    /// Make `id` the active agent. Ignored while a request is outstanding.
    pub fn switch_agent(&mut self, id: &str) -> Result<(), FinnextError> {
        self.settle_abandoned();
        if self.is_loading() {
            debug!(requested = id, "Agent switch ignored while submitting");
            return Ok(());
        }
        self.registry.get(id)?;
        self.active_agent = id.to_string();
        Ok(())
    }

    /// Accept a submission: append the user message, clear the input, and
    /// enter [`SessionState::Submitting`].
    ///
    /// Returns `None` (and changes nothing) for blank text or while submitting.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingTurn> {
        self.settle_abandoned();
        let trimmed = text.trim();
        if trimmed.is_empty() || self.is_loading() {
            return None;
        }

        let (agent_id, endpoint) = {
            let agent = self.active_agent();
            (agent.id.clone(), agent.api_url.clone())
        };
        // Context is the history before this turn's user message.
        let history: Vec<HistoryTurn> = self.active_history().iter().map(HistoryTurn::from).collect();

        let id = self.next_message_id();
        self.append(Message::user(id, &agent_id, trimmed));
        self.input.clear();

        let live = Arc::new(());
        self.outstanding = Some(Outstanding {
            agent_id: agent_id.clone(),
            live: Arc::downgrade(&live),
        });

        Some(PendingTurn {
            agent_id,
            endpoint,
            request: ProxyRequest::new(trimmed, history),
            _live: live,
        })
    }

    /// Resolve a submission with its outcome and return to [`SessionState::Idle`].
    pub fn complete(&mut self, pending: PendingTurn, outcome: Result<Delivery>) -> &Message {
        let id = self.next_message_id();
        let agent_id = pending.agent_id;

        let message = match outcome {
            Ok(Delivery::Reply(reply)) => {
                Message::agent(id, &agent_id, reply.reply).with_sources(reply.sources)
            }
            Ok(Delivery::Rejected { status, error }) => {
                warn!(agent = %agent_id, status, error = %error, "Agent endpoint rejected turn");
                Message::agent(id, &agent_id, format!("Error ({status}): {error}"))
            }
            Err(e) => {
                warn!(agent = %agent_id, error = %e, "Agent endpoint unreachable");
                Message::agent(id, &agent_id, UNEXPECTED_ERROR)
            }
        };

        self.outstanding = None;
        self.append(message)
    }

    /// Submit `text` to the active agent and wait for the outcome.
    ///
    /// Returns the terminal agent message, or `None` if the submission was rejected.
    pub async fn submit<T>(&mut self, text: &str, transport: &T) -> Option<&Message>
    where
        T: AgentTransport + ?Sized,
    {
        let pending = self.begin_submit(text)?;
        let mut in_flight = InFlight {
            turn: Some((self, pending)),
        };

        let outcome = {
            let (_, pending) = in_flight.turn.as_ref()?;
            transport.deliver(&pending.endpoint, &pending.request).await
        };

        let (session, pending) = in_flight.turn.take()?;
        Some(session.complete(pending, outcome))
    }

    /// Submit the current input buffer.
    pub async fn submit_input<T>(&mut self, transport: &T) -> Option<&Message>
    where
        T: AgentTransport + ?Sized,
    {
        let text = self.input.clone();
        self.submit(&text, transport).await
    }

    /// Resolve a turn whose [`PendingTurn`] was dropped without completion.
    fn settle_abandoned(&mut self) {
        let Some(turn) = self
            .outstanding
            .take_if(|turn| turn.live.strong_count() == 0)
        else {
            return;
        };
        warn!(agent = %turn.agent_id, "Pending turn dropped before completion");
        let id = self.next_message_id();
        self.append(Message::agent(id, &turn.agent_id, UNEXPECTED_ERROR));
    }

    fn next_message_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn append(&mut self, message: Message) -> &Message {
        let history = self.histories.entry(message.agent_id.clone()).or_default();
        history.push(message);
        &history[history.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use finnext_core::{ProxyReply, Sender, Source};

    enum Script {
        Reply(&'static str, Vec<Source>),
        Rejected(u16, &'static str),
        Unreachable,
    }

    /// Plays back scripted outcomes and records every call.
    #[derive(Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Script>>,
        calls: Mutex<Vec<(String, ProxyRequest)>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Script>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn replying(reply: &'static str) -> Self {
            Self::new((0..16).map(|_| Script::Reply(reply, vec![])).collect())
        }

        fn calls(&self) -> Vec<(String, ProxyRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentTransport for ScriptedTransport {
        async fn deliver(&self, endpoint: &str, request: &ProxyRequest) -> Result<Delivery> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), request.clone()));
            match self.script.lock().unwrap().pop_front() {
                Some(Script::Reply(reply, sources)) => Ok(Delivery::Reply(ProxyReply {
                    reply: reply.to_string(),
                    sources,
                })),
                Some(Script::Rejected(status, error)) => Ok(Delivery::Rejected {
                    status,
                    error: error.to_string(),
                }),
                Some(Script::Unreachable) | None => {
                    Err(anyhow::anyhow!("connection refused (os error 111)"))
                }
            }
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(Arc::new(AgentRegistry::builtin()))
    }

    #[test]
    fn test_starts_idle_on_first_agent() {
        let session = session();
        assert_eq!(session.active_agent().id, "portfolio");
        assert_eq!(session.state(), SessionState::Idle);
        for id in session.registry().ids() {
            assert!(session.history(id).is_empty());
        }
    }

    #[tokio::test]
    async fn test_risk_scenario_success() {
        let mut session = session();
        session.switch_agent("risk").unwrap();
        let transport = ScriptedTransport::new(vec![Script::Reply("Your risk score is 6/10.", vec![])]);

        session.submit("What is my risk score?", &transport).await.unwrap();

        let history = session.history("risk");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].content, "What is my risk score?");
        assert_eq!(history[0].sources, None);
        assert_eq!(history[1].sender, Sender::Agent);
        assert_eq!(history[1].content, "Your risk score is 6/10.");
        assert_eq!(history[1].sources, Some(vec![]));
        assert!(history.iter().all(|m| m.agent_id == "risk"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/api/agents/risk");
        assert_eq!(calls[0].1.input.as_deref(), Some("What is my risk score?"));
        assert!(calls[0].1.history.is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_sources_are_kept() {
        let mut session = session();
        let source = Source {
            title: "Q3 filing".into(),
            link: "https://example.com/q3".into(),
        };
        let transport = ScriptedTransport::new(vec![Script::Reply("See filing.", vec![source.clone()])]);

        let reply = session.submit("holdings?", &transport).await.unwrap();
        assert_eq!(reply.sources, Some(vec![source]));
    }

    #[tokio::test]
    async fn test_upstream_error_is_visible() {
        let mut session = session();
        session.switch_agent("risk").unwrap();
        let transport = ScriptedTransport::new(vec![Script::Rejected(503, "overloaded")]);

        session.submit("What is my risk score?", &transport).await.unwrap();

        let history = session.history("risk");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[1].sender, Sender::Agent);
        assert!(history[1].content.contains("503"));
        assert!(history[1].content.contains("overloaded"));
        assert_eq!(history[1].content, "Error (503): overloaded");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_validation_error_is_visible() {
        let mut session = session();
        let transport =
            ScriptedTransport::new(vec![Script::Rejected(400, "Missing 'input' in request body")]);

        session.submit("hello", &transport).await.unwrap();

        let history = session.active_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "Error (400): Missing 'input' in request body");
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_text() {
        let mut session = session();
        let transport = ScriptedTransport::new(vec![Script::Unreachable]);

        session.submit("hello", &transport).await.unwrap();

        let history = session.active_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].sender, Sender::Agent);
        assert_eq!(history[1].content, UNEXPECTED_ERROR);
        assert!(!history[1].content.contains("os error"));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut session = session();
        let transport = ScriptedTransport::replying("unused");

        for text in ["", "   ", "\n\t "] {
            assert!(session.submit(text, &transport).await.is_none());
        }
        assert!(transport.calls().is_empty());
        assert!(session.active_history().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_submit_while_submitting_is_noop() {
        let mut session = session();
        let pending = session.begin_submit("first").unwrap();
        assert!(session.is_loading());

        assert!(session.begin_submit("second").is_none());
        assert_eq!(session.active_history().len(), 1);

        session.complete(
            pending,
            Ok(Delivery::Reply(ProxyReply {
                reply: "done".into(),
                sources: vec![],
            })),
        );
        let contents: Vec<&str> = session
            .active_history()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "done"]);
    }

    #[test]
    fn test_switch_refused_while_submitting() {
        let mut session = session();
        session.switch_agent("sentiment").unwrap();
        let pending = session.begin_submit("mood?").unwrap();

        session.switch_agent("forecast").unwrap();
        assert_eq!(session.active_agent().id, "sentiment");

        session.complete(pending, Err(anyhow::anyhow!("timeout")));
        session.switch_agent("forecast").unwrap();
        assert_eq!(session.active_agent().id, "forecast");
        assert!(session.history("forecast").is_empty());
        assert_eq!(session.history("sentiment").len(), 2);
    }

    #[test]
    fn test_response_goes_to_agent_captured_at_submit() {
        let mut session = session();
        session.switch_agent("screener").unwrap();
        let pending = session.begin_submit("low beta?").unwrap();
        assert_eq!(pending.agent_id(), "screener");
        assert_eq!(pending.endpoint(), "/api/agents/screener");

        // Force the active identity away to prove completion ignores it.
        session.active_agent = "forecast".to_string();
        session.complete(
            pending,
            Ok(Delivery::Reply(ProxyReply {
                reply: "KO, PG".into(),
                sources: vec![],
            })),
        );

        assert_eq!(session.history("screener").len(), 2);
        assert!(session.history("forecast").is_empty());
    }

    /// Never answers.
    struct StalledTransport;

    #[async_trait]
    impl AgentTransport for StalledTransport {
        async fn deliver(&self, _endpoint: &str, _request: &ProxyRequest) -> Result<Delivery> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_submit_still_resolves() {
        let mut session = session();
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            session.submit("hi", &StalledTransport),
        )
        .await;
        assert!(elapsed.is_err());

        assert_eq!(session.state(), SessionState::Idle);
        let history = session.history("portfolio");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[1].sender, Sender::Agent);
        assert_eq!(history[1].content, UNEXPECTED_ERROR);

        session.switch_agent("risk").unwrap();
        assert_eq!(session.active_agent().id, "risk");
        let transport = ScriptedTransport::replying("back online");
        let reply = session.submit("still there?", &transport).await.unwrap();
        assert_eq!(reply.content, "back online");
    }

    #[test]
    fn test_dropped_pending_turn_releases_session() {
        let mut session = session();
        let pending = session.begin_submit("first").unwrap();
        assert!(session.is_loading());

        drop(pending);
        assert_eq!(session.state(), SessionState::Idle);

        session.switch_agent("risk").unwrap();
        assert_eq!(session.active_agent().id, "risk");
        let contents: Vec<(Sender, &str)> = session
            .history("portfolio")
            .iter()
            .map(|m| (m.sender, m.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![(Sender::User, "first"), (Sender::Agent, UNEXPECTED_ERROR)]
        );

        // Settled once only.
        session.switch_agent("portfolio").unwrap();
        assert_eq!(session.history("portfolio").len(), 2);
    }

    #[test]
    fn test_switch_to_unknown_agent_fails() {
        let mut session = session();
        let err = session.switch_agent("astrology").unwrap_err();
        assert!(matches!(err, FinnextError::AgentNotFound(_)));
        assert_eq!(session.active_agent().id, "portfolio");
    }

    #[tokio::test]
    async fn test_histories_are_isolated() {
        let mut session = session();
        let transport = ScriptedTransport::replying("ack");
        let ids: Vec<String> = session.registry().ids().map(str::to_string).collect();

        for (round, id) in ids.iter().enumerate() {
            let before: Vec<usize> = ids.iter().map(|other| session.history(other).len()).collect();
            session.switch_agent(id).unwrap();
            session.submit(&format!("question {round}"), &transport).await.unwrap();

            for (other, len_before) in ids.iter().zip(before) {
                let expected = if other == id { len_before + 2 } else { len_before };
                assert_eq!(session.history(other).len(), expected, "agent {other}");
            }
            assert!(session.history(id).iter().all(|m| m.agent_id == *id));
        }
    }

    #[tokio::test]
    async fn test_history_context_round_trip() {
        let mut session = session();
        session.switch_agent("forecast").unwrap();
        let transport = ScriptedTransport::new(vec![
            Script::Reply("AAPL +2% next week", vec![]),
            Script::Rejected(502, "bad gateway"),
            Script::Reply("insufficient data", vec![]),
        ]);

        session.submit("Forecast AAPL", &transport).await.unwrap();
        session.submit("And MSFT?", &transport).await.unwrap();
        session.submit("And TSLA?", &transport).await.unwrap();

        let calls = transport.calls();
        let third = &calls[2].1;
        assert_eq!(third.input.as_deref(), Some("And TSLA?"));

        let prior = &session.history("forecast")[..4];
        assert_eq!(third.history.len(), prior.len());
        for (turn, message) in third.history.iter().zip(prior) {
            assert_eq!(turn.role, message.sender.as_str());
            assert_eq!(turn.content, message.content);
        }
        assert_eq!(third.history[3].content, "Error (502): bad gateway");
    }

    #[tokio::test]
    async fn test_submit_input_clears_buffer() {
        let mut session = session();
        let transport = ScriptedTransport::replying("ok");

        session.set_input("   ");
        assert!(session.submit_input(&transport).await.is_none());
        assert_eq!(session.input(), "   ");

        session.set_input("  rebalance?  ");
        session.submit_input(&transport).await.unwrap();
        assert_eq!(session.input(), "");
        assert_eq!(session.active_history()[0].content, "rebalance?");
    }

    #[tokio::test]
    async fn test_message_ids_increase() {
        let mut session = session();
        let transport = ScriptedTransport::replying("ok");
        session.submit("a", &transport).await.unwrap();
        session.switch_agent("risk").unwrap();
        session.submit("b", &transport).await.unwrap();

        let mut ids: Vec<u64> = session.history("portfolio").iter().map(|m| m.id).collect();
        ids.extend(session.history("risk").iter().map(|m| m.id));
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
