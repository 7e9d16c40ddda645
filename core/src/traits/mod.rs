pub mod console;
pub mod provider;
pub mod tool;

pub use console::Console;
pub use provider::{
    ChatRequest, ChatResponse, FunctionCall, FunctionResponse, Part, Provider, Role, Turn,
};
pub use tool::{Tool, ToolResult, ToolSpec};
