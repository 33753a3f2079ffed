pub mod agent;
pub mod config;
pub mod error;
pub mod normalize;
pub mod processor;
pub mod report;
pub mod schema;
pub mod secrets;
pub mod session;
pub mod store;
pub mod tools;

pub use config::{ExtractionConfig, CLAUDE_SONNET_MODEL, DEFAULT_TASK};
pub use error::{AgentError, ConfigError, InvocrError, ProcessError, Result, StoreError};
pub use report::{LlmInfo, RunReport, RESULT_FILENAME};
pub use session::ExtractionSession;
pub use store::{DocumentStore, Page};
