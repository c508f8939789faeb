//! Provider adapters
//!
//! HTTP adapters for hosted model APIs, a deterministic local adapter and
//! the family router that the engine is built on.

mod anthropic;
mod http;
mod local;
mod openai;
mod routing;

pub use anthropic::AnthropicAdapter;
pub use local::LocalAdapter;
pub use openai::OpenAiCompatibleAdapter;
pub use routing::RoutingProvider;
