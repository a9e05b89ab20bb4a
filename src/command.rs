//! Terminal command parsing
//!
//! Lines starting with `/` are commands; anything else is a question.

use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  /pdf <path>      upload a PDF as the source
  /youtube <url>   load a YouTube transcript as the source
  /clear           detach the current source
  /status          show the current source and session state
  /health          ask the backend whether it is up
  /help            show this help
  /quit            leave
Anything else is sent as a question about the current source.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line
    Empty,
    AttachPdf(PathBuf),
    /// Possibly empty; an empty URL is a no-op for the session
    AttachVideo(String),
    Clear,
    Status,
    Health,
    Help,
    Quit,
    /// Question text exactly as typed
    Ask(String),
    /// Known command missing its argument
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        if !trimmed.starts_with('/') {
            return Command::Ask(line.trim_end_matches(['\r', '\n']).to_string());
        }

        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (trimmed, ""),
        };

        match name {
            "/pdf" | "/upload" => {
                if arg.is_empty() {
                    Command::Usage("/pdf <path>")
                } else {
                    Command::AttachPdf(PathBuf::from(arg))
                }
            }
            "/youtube" | "/yt" => Command::AttachVideo(arg.to_string()),
            "/clear" | "/remove" => Command::Clear,
            "/status" => Command::Status,
            "/health" => Command::Health,
            "/help" | "/?" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}
