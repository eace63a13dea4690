use super::{Command, CommandContext, CommandError, Flow};

#[derive(Clone, Default)]
pub struct ExitCommand;

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn description(&self) -> &'static str {
        "Exits the program"
    }

    /// Says goodbye and reaps the backing shell; the loop ends on `Flow::Exit`.
    fn execute(&self, _args: &[String], ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
        writeln!(ctx.out, "{}", ctx.highlighter.farewell())?;
        ctx.out.flush()?;
        ctx.session.shutdown()?;
        Ok(Flow::Exit)
    }
}
