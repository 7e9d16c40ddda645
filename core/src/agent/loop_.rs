use crate::agent::ToolRegistry;
use crate::traits::{ChatRequest, Console, FunctionCall, FunctionResponse, Provider, Turn};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Drives one chat session: user turn, model turn, tool results, and a single
/// follow-up model turn whenever tools were called.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    tool_registry: Arc<ToolRegistry>,
    conversation: Vec<Turn>,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tool_registry,
            conversation: Vec::new(),
        }
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    /// Reads lines until the console runs dry. Running out of input is a
    /// normal end of session; only inference failures are returned as errors.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<()> {
        console.banner();

        while let Some(input) = console.read_line() {
            self.process(&input, console).await?;
        }

        Ok(())
    }

    /// Handles a single user message and returns the text shown to the user,
    /// if any.
    pub async fn process(
        &mut self,
        message: &str,
        console: &mut dyn Console,
    ) -> Result<Option<String>> {
        self.conversation.push(Turn::user(message));

        let mut turn = self.infer().await?;
        self.conversation.push(turn.clone());

        let calls: Vec<FunctionCall> = turn.function_calls().cloned().collect();
        if !calls.is_empty() {
            self.dispatch(calls, console).await;

            turn = self.infer().await?;
            self.conversation.push(turn.clone());

            if turn.has_function_calls() {
                debug!(
                    calls = turn.function_calls().count(),
                    "ignoring function calls in follow-up response"
                );
            }
        }

        let text = turn.text();
        if text.is_empty() {
            return Ok(None);
        }

        console.reply(&text);
        Ok(Some(text))
    }

    async fn dispatch(&mut self, calls: Vec<FunctionCall>, console: &mut dyn Console) {
        for call in calls {
            console.tool_call(&call);

            let result = self
                .tool_registry
                .execute(&call.name, call.args.clone())
                .await;

            self.conversation
                .push(Turn::function_response(FunctionResponse {
                    id: call.id,
                    name: call.name,
                    response: result.to_response(),
                }));
        }
    }

    async fn infer(&self) -> Result<Turn> {
        let tools = self.tool_registry.get_specs();
        let request = ChatRequest {
            turns: &self.conversation,
            tools: &tools,
        };

        debug!(
            provider = self.provider.name(),
            turns = self.conversation.len(),
            tools = tools.len(),
            "requesting completion"
        );

        let response = self.provider.chat(request).await?;
        Ok(response.turn)
    }
}
