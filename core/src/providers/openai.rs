use crate::traits::{
    ChatRequest, ChatResponse, FunctionCall, Part, Provider, Role, ToolSpec, Turn,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool<'a>>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest<'a> {
    id: &'a str,
    r#type: &'a str,
    function: OpenAIFunctionRequest<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionRequest<'a> {
    name: &'a str,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool<'a> {
    r#type: &'a str,
    function: OpenAIToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One message per turn, except function turns which become one `tool`
    /// message per response part.
    fn convert_turns<'a>(&self, turns: &'a [Turn]) -> Vec<OpenAIMessage<'a>> {
        let mut messages = Vec::with_capacity(turns.len());

        for turn in turns {
            match turn.role {
                Role::User => messages.push(OpenAIMessage {
                    role: "user",
                    content: Some(turn.text()),
                    tool_calls: None,
                    tool_call_id: None,
                }),
                Role::Model => {
                    let tool_calls: Vec<_> = turn
                        .function_calls()
                        .map(|call| OpenAIToolCallRequest {
                            id: &call.id,
                            r#type: "function",
                            function: OpenAIFunctionRequest {
                                name: &call.name,
                                arguments: call.args.to_string(),
                            },
                        })
                        .collect();

                    messages.push(OpenAIMessage {
                        role: "assistant",
                        content: Some(turn.text()),
                        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                        tool_call_id: None,
                    });
                }
                Role::Function => {
                    for part in &turn.parts {
                        if let Part::FunctionResponse(response) = part {
                            messages.push(OpenAIMessage {
                                role: "tool",
                                content: Some(response.response.to_string()),
                                tool_calls: None,
                                tool_call_id: Some(response.id.as_str()),
                            });
                        }
                    }
                }
            }
        }

        messages
    }

    fn convert_tools<'a>(&self, tools: &'a [ToolSpec]) -> Option<Vec<OpenAITool<'a>>> {
        if tools.is_empty() {
            return None;
        }

        Some(
            tools
                .iter()
                .map(|t| OpenAITool {
                    r#type: "function",
                    function: OpenAIToolFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters_schema,
                    },
                })
                .collect(),
        )
    }
}

fn parse_turn(response: OpenAIResponse) -> anyhow::Result<Turn> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No choices in response"))?;

    let mut parts = Vec::new();
    if let Some(content) = choice.message.content
        && !content.is_empty()
    {
        parts.push(Part::Text(content));
    }

    for tc in choice.message.tool_calls.unwrap_or_default() {
        // Malformed JSON is passed through so argument validation reports it
        // back to the model.
        let args = serde_json::from_str(&tc.function.arguments)
            .unwrap_or(serde_json::Value::String(tc.function.arguments));
        let mut call = FunctionCall::new(tc.function.name, args);
        call.id = tc.id;
        parts.push(Part::FunctionCall(call));
    }

    Ok(Turn::model(parts))
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let openai_request = OpenAIRequest {
            model: &self.model,
            messages: self.convert_turns(request.turns),
            tools: self.convert_tools(request.tools),
        };

        debug!(model = %self.model, "OpenAI chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "OpenAI API error {}: {}",
                status,
                error_text
            ));
        }

        let openai_response: OpenAIResponse = response.json().await?;

        Ok(ChatResponse {
            turn: parse_turn(openai_response)?,
        })
    }
}
