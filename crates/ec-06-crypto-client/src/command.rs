//! # Client Commands
//!
//! One line of user input maps to one `Command`:
//!
//! ```text
//! capabilities                  (or 1)
//! encrypt <method> [text...]    (or 2)
//! decrypt <method> [text...]    (or 3)
//! quit                          (or 4, exit)
//! help
//! ```
//!
//! Everything after the method name is the text, inner whitespace kept.
//! The text may be empty.

use std::fmt;
use thiserror::Error;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask for the supported methods.
    Capabilities,
    /// Encrypt `text` with `method`.
    Encrypt { method: String, text: String },
    /// Decrypt `text` with `method`.
    Decrypt { method: String, text: String },
    /// Print usage.
    Help,
    /// Leave the client.
    Quit,
}

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank input.
    #[error("empty command")]
    Empty,

    /// First word is not a known command.
    #[error("unknown command: {0} (try 'help')")]
    Unknown(String),

    /// Encrypt/decrypt without a method name.
    #[error("{0} needs a method name, e.g. '{0} rot13 some text'")]
    MissingMethod(&'static str),

    /// Arguments given to a command that takes none.
    #[error("{command} takes no arguments, got '{extra}'")]
    UnexpectedArguments { command: &'static str, extra: String },
}

/// Usage text printed by `help`.
pub const USAGE: &str = "\
Commands:
  capabilities                 (1) list the service's cipher methods
  encrypt <method> [text...]   (2) encrypt text
  decrypt <method> [text...]   (3) decrypt text
  quit                         (4) leave";

impl Command {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// See [`CommandError`].
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(CommandError::Empty);
        }

        let (word, rest) = split_word(line);
        match word.to_ascii_lowercase().as_str() {
            "capabilities" | "caps" | "1" => no_arguments("capabilities", rest, Command::Capabilities),
            "encrypt" | "2" => {
                let (method, text) = method_and_text("encrypt", rest)?;
                Ok(Command::Encrypt { method, text })
            }
            "decrypt" | "3" => {
                let (method, text) = method_and_text("decrypt", rest)?;
                Ok(Command::Decrypt { method, text })
            }
            "quit" | "exit" | "4" => no_arguments("quit", rest, Command::Quit),
            "help" | "?" => Ok(Command::Help),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Capabilities => write!(f, "capabilities"),
            Command::Encrypt { method, text } => write!(f, "encrypt {method} {text}"),
            Command::Decrypt { method, text } => write!(f, "decrypt {method} {text}"),
            Command::Help => write!(f, "help"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

/// Split off the first whitespace-delimited word; the rest loses only the
/// single separating whitespace run.
fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim_start()),
        None => (s, ""),
    }
}

fn no_arguments(
    command: &'static str,
    rest: &str,
    parsed: Command,
) -> Result<Command, CommandError> {
    if rest.trim().is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArguments {
            command,
            extra: rest.trim().to_string(),
        })
    }
}

fn method_and_text(command: &'static str, rest: &str) -> Result<(String, String), CommandError> {
    let (method, text) = split_word(rest);
    if method.is_empty() {
        return Err(CommandError::MissingMethod(command));
    }
    Ok((method.to_string(), text.to_string()))
}
