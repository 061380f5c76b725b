//! Line commands understood by the interview prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open or close the microphone.
    Mic,
    /// Typed answer. Any line that is not a command is treated as one.
    Type(String),
    Confirm,
    Retry,
    Back,
    Repeat,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  mic               open / close the microphone
  type <answer>     type an answer (any other text works too)
  yes | confirm     accept the staged answer
  no  | retry       discard it and answer again
  back              previous question
  repeat            hear the question again
  status            show where you are
  quit              leave without a report";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let command = match head.to_lowercase().as_str() {
            "type" | "say" => Command::Type(rest.to_string()),
            _ if !rest.is_empty() => Command::Type(line.to_string()),
            "mic" | "m" => Command::Mic,
            "yes" | "y" | "confirm" => Command::Confirm,
            "no" | "n" | "retry" => Command::Retry,
            "back" | "previous" => Command::Back,
            "repeat" | "again" => Command::Repeat,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Type(line.to_string()),
        };
        Some(command)
    }
}
