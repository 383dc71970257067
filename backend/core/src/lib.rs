pub mod agent;
pub mod error;
pub mod message;
pub mod registry;
pub mod traits;

pub use agent::{AgentConfig, AgentMetadata};
pub use error::FinnextError;
pub use message::{ErrorBody, HistoryTurn, Message, ProxyReply, ProxyRequest, Sender, Source};
pub use registry::AgentRegistry;
pub use traits::{InferenceProvider, InferenceRequest};
