use crate::traits::ToolSpec;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    Function,
}

/// A model-emitted request to invoke a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Pairs the call with its [`FunctionResponse`]. Generated locally when the
    /// provider does not return one.
    pub id: String,
    pub name: String,
    pub args: serde_json::Value,
    /// Opaque provider token that has to be sent back unchanged with the call.
    pub thought_signature: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            args,
            thought_signature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    pub id: String,
    pub name: String,
    pub response: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::model(vec![Part::Text(text.into())])
    }

    pub fn function_response(response: FunctionResponse) -> Self {
        Self {
            role: Role::Function,
            parts: vec![Part::FunctionResponse(response)],
        }
    }

    /// Concatenation of every text part, in order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(|p| match p {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        })
    }

    pub fn has_function_calls(&self) -> bool {
        self.function_calls().next().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub turn: Turn,
}

impl ChatResponse {
    pub fn has_tool_calls(&self) -> bool {
        self.turn.has_function_calls()
    }

    pub fn text(&self) -> String {
        self.turn.text()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub turns: &'a [Turn],
    pub tools: &'a [ToolSpec],
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Label shown next to model replies.
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn turn_text_joins_text_parts_only() {
        let turn = Turn::model(vec![
            Part::Text("Writing ".into()),
            Part::FunctionCall(FunctionCall::new("write_file", json!({}))),
            Part::Text("now".into()),
        ]);
        assert_eq!(turn.text(), "Writing now");
        assert!(turn.has_function_calls());
    }

    #[test]
    fn function_calls_keep_emission_order() {
        let turn = Turn::model(vec![
            Part::FunctionCall(FunctionCall::new("a", json!({}))),
            Part::Text("between".into()),
            Part::FunctionCall(FunctionCall::new("b", json!({}))),
        ]);
        let names: Vec<_> = turn.function_calls().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn generated_call_ids_are_unique() {
        let a = FunctionCall::new("x", json!({}));
        let b = FunctionCall::new("x", json!({}));
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("call_"));
    }
}
