use crate::traits::FunctionCall;

/// The user-facing side of a chat session.
pub trait Console: Send {
    fn banner(&mut self) {}

    /// Next line of user input, `None` once input is exhausted.
    fn read_line(&mut self) -> Option<String>;

    fn tool_call(&mut self, _call: &FunctionCall) {}

    fn reply(&mut self, text: &str);
}
