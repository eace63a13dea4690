use super::{Command, CommandContext, CommandError, Flow};
use crate::path::PathExpander;
use std::env;

/// `cd <path>`: moves the front-end itself, then restarts the backing shell
/// there. A failed move leaves the live session alone.
#[derive(Clone, Default)]
pub struct CdCommand {
    path_expander: PathExpander,
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            path_expander: PathExpander::new(),
        }
    }
}

impl Command for CdCommand {
    fn description(&self) -> &'static str {
        "Changes the working directory"
    }

    fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
        let target = args
            .first()
            .ok_or_else(|| CommandError::InvalidArguments("cd needs a target".to_string()))?;

        let changed = self
            .path_expander
            .expand(target)
            .map_err(|e| e.to_string())
            .and_then(|path| env::set_current_dir(&path).map_err(|e| e.to_string()));

        if let Err(e) = changed {
            tracing::debug!(path = %target, error = %e, "cd failed, keeping session");
            writeln!(ctx.out, "{}", ctx.highlighter.error(&format!("cd: {}", e)))?;
            return Ok(Flow::Continue);
        }

        let cwd = env::current_dir()?;
        ctx.session.restart(&cwd)?;
        Ok(Flow::Continue)
    }
}
