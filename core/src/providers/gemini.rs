use crate::config::DEFAULT_MODEL;
use crate::traits::{
    ChatRequest, ChatResponse, FunctionCall, Part, Provider, Role, ToolSpec, Turn,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPartRequest<'a>>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCallRequest<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponseRequest<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought_signature: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionCallRequest<'a> {
    name: &'a str,
    args: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionResponseRequest<'a> {
    name: &'a str,
    response: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool<'a> {
    function_declarations: Vec<GeminiFunctionDeclaration<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    function_call: Option<GeminiFunctionCall>,
    thought_signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiFunctionCall {
    id: Option<String>,
    name: String,
    args: Option<serde_json::Value>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
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

    fn convert_turns<'a>(&self, turns: &'a [Turn]) -> Vec<GeminiContent<'a>> {
        turns
            .iter()
            .map(|turn| GeminiContent {
                role: match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                    Role::Function => "function",
                },
                parts: turn.parts.iter().map(convert_part).collect(),
            })
            .collect()
    }

    fn convert_tools<'a>(&self, tools: &'a [ToolSpec]) -> Vec<GeminiTool<'a>> {
        if tools.is_empty() {
            return Vec::new();
        }

        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: &t.name,
                    description: &t.description,
                    parameters: &t.parameters_schema,
                })
                .collect(),
        }]
    }
}

fn convert_part(part: &Part) -> GeminiPartRequest<'_> {
    match part {
        Part::Text(text) => GeminiPartRequest {
            text: Some(text.as_str()),
            ..Default::default()
        },
        Part::FunctionCall(call) => GeminiPartRequest {
            function_call: Some(GeminiFunctionCallRequest {
                name: &call.name,
                args: &call.args,
            }),
            thought_signature: call.thought_signature.as_deref(),
            ..Default::default()
        },
        Part::FunctionResponse(response) => GeminiPartRequest {
            function_response: Some(GeminiFunctionResponseRequest {
                name: &response.name,
                response: &response.response,
            }),
            ..Default::default()
        },
    }
}

/// Model turn of the first candidate. Thought summaries are dropped.
fn parse_turn(response: GeminiResponse) -> anyhow::Result<Turn> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            anyhow::bail!("Gemini blocked the prompt: {}", reason);
        }
        anyhow::bail!("No candidates in Gemini response");
    };

    let content = candidate.content.ok_or_else(|| {
        anyhow::anyhow!(
            "Gemini returned no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )
    })?;

    let mut parts = Vec::with_capacity(content.parts.len());
    for part in content.parts {
        if let Some(fc) = part.function_call {
            let mut call = FunctionCall::new(
                fc.name,
                fc.args
                    .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            );
            if let Some(id) = fc.id {
                call.id = id;
            }
            call.thought_signature = part.thought_signature;
            parts.push(Part::FunctionCall(call));
        } else if let Some(text) = part.text
            && !part.thought
        {
            parts.push(Part::Text(text));
        }
    }

    Ok(Turn::model(parts))
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let gemini_request = GeminiRequest {
            contents: self.convert_turns(request.turns),
            tools: self.convert_tools(request.tools),
        };

        debug!(model = %self.model, "Gemini generateContent");

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Gemini API error {}: {}",
                status,
                error_text
            ));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        Ok(ChatResponse {
            turn: parse_turn(gemini_response)?,
        })
    }
}
