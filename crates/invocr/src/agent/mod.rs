pub mod client;
pub mod prompt;
pub mod runner;

pub use client::{AnthropicClient, ContentBlock, Message, MessagesRequest, MessagesResponse, ModelTransport, ToolDefinition};
pub use prompt::build_task_prompt;
pub use runner::{ExtractionAgent, MAX_AGENT_TURNS};
