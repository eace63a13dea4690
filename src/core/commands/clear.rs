use super::{Command, CommandContext, CommandError, Flow};
use crate::highlight::CLEAR_SCREEN;

/// `clear` / `cls`: wipes the terminal and redraws the banner.
#[derive(Clone, Default)]
pub struct ClearCommand;

impl ClearCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn matches(name: &str) -> bool {
        matches!(name, "clear" | "cls")
    }
}

impl Command for ClearCommand {
    fn description(&self) -> &'static str {
        "Clears the screen"
    }

    fn execute(&self, _args: &[String], ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
        write!(ctx.out, "{}", CLEAR_SCREEN)?;
        writeln!(ctx.out, "{}", ctx.highlighter.banner())?;
        ctx.out.flush()?;
        Ok(Flow::Continue)
    }
}
