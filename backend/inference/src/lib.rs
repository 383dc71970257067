pub mod normalize;
pub mod providers;

pub use normalize::{normalize_reply, NO_REPLY_PLACEHOLDER};
pub use providers::lyzr::{LyzrProvider, DEFAULT_INFERENCE_URL};
pub use providers::mock::MockProvider;
