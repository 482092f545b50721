pub mod anthropic;
pub mod confidence;
pub mod factory;
pub mod fallback;
pub mod timeout;

pub use anthropic::AnthropicClient;
pub use confidence::extract_confidence;
pub use factory::AnthropicLlmFactory;
pub use fallback::parse_tool_call_fallback;
pub use timeout::TimeoutLlmClient;
