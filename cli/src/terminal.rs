use clanker_core::{Console, FunctionCall};
use console::style;
use std::io::{self, BufRead, Write};

/// Line-based terminal console. Blank lines are skipped; EOF or a read
/// error ends the session.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
    model_label: String,
}

impl TerminalConsole<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdin(model_label: impl Into<String>) -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout(), model_label)
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W, model_label: impl Into<String>) -> Self {
        Self {
            input,
            output,
            model_label: model_label.into(),
        }
    }

    fn next_line(&mut self) -> Option<String> {
        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = line.trim_end_matches(['\r', '\n']);
                    if !line.trim().is_empty() {
                        return Some(line.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read input");
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead + Send, W: Write + Send> Console for TerminalConsole<R, W> {
    fn banner(&mut self) {
        let _ = writeln!(
            self.output,
            "Chat with {} (use 'ctrl-c' to quit)",
            self.model_label
        );
    }

    fn read_line(&mut self) -> Option<String> {
        let _ = write!(self.output, "{}: ", style("You").blue());
        let _ = self.output.flush();

        let line = self.next_line();
        if line.is_none() {
            let _ = writeln!(self.output);
        }
        line
    }

    fn tool_call(&mut self, call: &FunctionCall) {
        let _ = writeln!(
            self.output,
            "{}: {}({})",
            style("Tool").magenta(),
            call.name,
            call.args
        );
    }

    fn reply(&mut self, text: &str) {
        let _ = writeln!(
            self.output,
            "{}: {}",
            style(&self.model_label).yellow(),
            text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn scripted(input: &str) -> TerminalConsole<Cursor<String>, Vec<u8>> {
        console::set_colors_enabled(false);
        TerminalConsole::new(Cursor::new(input.to_string()), Vec::new(), "Gemini")
    }

    fn written(console: &TerminalConsole<Cursor<String>, Vec<u8>>) -> String {
        String::from_utf8(console.output.clone()).unwrap()
    }

    #[test]
    fn skips_blank_lines_and_strips_newlines() {
        let mut console = scripted("\n  \nhello\r\nworld\n");

        assert_eq!(console.next_line().as_deref(), Some("hello"));
        assert_eq!(console.next_line().as_deref(), Some("world"));
        assert_eq!(console.next_line(), None);
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        let mut console = scripted("bye");

        assert_eq!(console.next_line().as_deref(), Some("bye"));
        assert_eq!(console.next_line(), None);
    }

    #[test]
    fn tool_call_shows_name_and_arguments() {
        let mut console = scripted("");
        let call = FunctionCall::new("write_file", json!({ "content": "hi", "path": "a.txt" }));

        console.tool_call(&call);

        assert_eq!(
            written(&console),
            "Tool: write_file({\"content\":\"hi\",\"path\":\"a.txt\"})\n"
        );
    }

    #[test]
    fn reply_is_labelled_with_model() {
        let mut console = scripted("");

        console.reply("Hello");

        assert_eq!(written(&console), "Gemini: Hello\n");
    }

    #[test]
    fn prompts_for_input_and_ends_line_on_eof() {
        let mut console = scripted("hi\n");

        console.banner();
        assert_eq!(console.read_line().as_deref(), Some("hi"));
        assert_eq!(console.read_line(), None);

        assert_eq!(
            written(&console),
            "Chat with Gemini (use 'ctrl-c' to quit)\nYou: You: \n"
        );
    }
}
