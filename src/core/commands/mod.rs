use std::collections::BTreeMap;
use std::io::Write;

mod cd;
mod clear;
mod exit;
mod help;

pub use cd::CdCommand;
pub use clear::ClearCommand;
pub use exit::ExitCommand;
pub use help::HelpCommand;

use crate::highlight::Highlighter;
use crate::process::{ProcessError, Session};

#[derive(Debug)]
pub enum CommandError {
    InvalidArguments(String),
    ExecutionError(String),
    IoError(std::io::Error),
    ProcessError(ProcessError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::InvalidArguments(msg) => write!(f, "invalid arguments: {}", msg),
            CommandError::ExecutionError(msg) => write!(f, "execution error: {}", msg),
            CommandError::IoError(err) => write!(f, "IO error: {}", err),
            CommandError::ProcessError(err) => write!(f, "Process error: {}", err),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IoError(err)
    }
}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::ProcessError(err)
    }
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything an intercepted command may touch.
pub struct CommandContext<'a> {
    pub session: &'a mut Session,
    pub out: &'a mut dyn Write,
    pub highlighter: &'a Highlighter,
    pub registry: &'a CommandRegistry,
}

pub trait Command {
    fn description(&self) -> &'static str;
    fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Help(HelpCommand),
    Exit(ExitCommand),
}

impl Command for CommandType {
    fn description(&self) -> &'static str {
        match self {
            CommandType::Help(cmd) => cmd.description(),
            CommandType::Exit(cmd) => cmd.description(),
        }
    }

    fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
        match self {
            CommandType::Help(cmd) => cmd.execute(args, ctx),
            CommandType::Exit(cmd) => cmd.execute(args, ctx),
        }
    }
}

/// Commands matched by exact name before anything reaches the backing shell.
#[derive(Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandType>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("help".to_string(), CommandType::Help(HelpCommand::new()));
        commands.insert("exit".to_string(), CommandType::Exit(ExitCommand::new()));
        Self { commands }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Names and descriptions, sorted by name.
    pub fn listing(&self) -> Vec<(&str, &'static str)> {
        self.commands
            .iter()
            .map(|(name, cmd)| (name.as_str(), cmd.description()))
            .collect()
    }

    /// Runs `name` if it is registered; `None` means it is not intercepted.
    pub fn execute(
        &self,
        name: &str,
        args: &[String],
        ctx: &mut CommandContext<'_>,
    ) -> Option<Result<Flow, CommandError>> {
        self.commands.get(name).map(|cmd| cmd.execute(args, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_commands() {
        let registry = CommandRegistry::new();
        assert!(registry.contains("help"));
        assert!(registry.contains("exit"));
        assert!(!registry.contains("cd"));
        assert!(!registry.contains("clear"));
        assert!(!registry.contains("HELP"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_listing_is_sorted_with_descriptions() {
        let registry = CommandRegistry::new();
        let listing = registry.listing();
        let names: Vec<&str> = listing.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["exit", "help"]);
        assert!(listing.iter().all(|(_, description)| !description.is_empty()));
    }

    #[test]
    fn test_command_error_display() {
        let errors = vec![
            CommandError::InvalidArguments("bad args".to_string()),
            CommandError::ExecutionError("failed".to_string()),
            CommandError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "io error")),
            CommandError::ProcessError(ProcessError::SessionLost),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
