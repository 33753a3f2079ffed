//! The tool-calling loop: send the conversation, execute any tool calls
//! locally against the document store, feed the results back, and stop at
//! the first final text answer.

use crate::agent::client::{
    ContentBlock, Message, MessagesRequest, MessagesResponse, ModelTransport,
};
use crate::agent::prompt::build_task_prompt;
use crate::error::AgentError;
use crate::tools::DocumentTools;

/// Upper bound on model round trips for one run. A well-behaved run needs
/// two or three; the bound only guards against a runaway loop.
pub const MAX_AGENT_TURNS: usize = 16;

const MAX_ANSWER_TOKENS: u32 = 4096;

pub struct ExtractionAgent<'a, T> {
    transport: &'a T,
    tools: DocumentTools<'a>,
    model: String,
    temperature: f32,
}

impl<'a, T: ModelTransport> ExtractionAgent<'a, T> {
    pub fn new(transport: &'a T, tools: DocumentTools<'a>, model: &str, temperature: f32) -> Self {
        Self {
            transport,
            tools,
            model: model.to_string(),
            temperature,
        }
    }

    /// Runs one agent session and returns the raw final answer text.
    pub async fn run(&self, task: &str) -> Result<String, AgentError> {
        let mut messages = vec![Message::user(vec![ContentBlock::Text {
            text: build_task_prompt(task),
        }])];

        for turn in 0..MAX_AGENT_TURNS {
            let _span = tracing::info_span!("agent.turn", turn).entered();

            let request = MessagesRequest {
                model: self.model.clone(),
                max_tokens: MAX_ANSWER_TOKENS,
                temperature: self.temperature,
                messages: messages.clone(),
                tools: DocumentTools::definitions(),
            };
            let response = self.transport.send(&request).await?;

            if response.stop_reason.as_deref() == Some("tool_use") {
                let results = self.execute_tool_calls(&response);
                if !results.is_empty() {
                    // unrecognized block types can't be round-tripped, so
                    // the echoed assistant message omits them
                    let echoed = response
                        .content
                        .into_iter()
                        .filter(|block| !matches!(block, ContentBlock::Unknown))
                        .collect();
                    messages.push(Message::assistant(echoed));
                    messages.push(Message::user(results));
                    continue;
                }
            }

            return final_text(&response);
        }

        Err(AgentError::ToolLoopExceeded(MAX_AGENT_TURNS))
    }

    fn execute_tool_calls(&self, response: &MessagesResponse) -> Vec<ContentBlock> {
        response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    tracing::debug!(tool = %name, "executing tool call");
                    Some(ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content: self.tools.dispatch(name, input),
                    })
                }
                _ => None,
            })
            .collect()
    }
}

fn final_text(response: &MessagesResponse) -> Result<String, AgentError> {
    let text: String = response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        Err(AgentError::EmptyAnswer)
    } else {
        Ok(text)
    }
}
