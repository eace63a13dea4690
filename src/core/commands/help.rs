use super::{CdCommand, ClearCommand, Command, CommandContext, CommandError, Flow};

#[derive(Clone, Default)]
pub struct HelpCommand;

impl HelpCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for HelpCommand {
    fn description(&self) -> &'static str {
        "Prints the help menu"
    }

    fn execute(&self, _args: &[String], ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
        writeln!(ctx.out, "\nHere are your available commands:")?;
        for (name, description) in ctx.registry.listing() {
            writeln!(ctx.out, " - {}: {}", name, description)?;
        }
        writeln!(ctx.out, " - cd <path>: {}", CdCommand::new().description())?;
        writeln!(ctx.out, " - clear, cls: {}", ClearCommand::new().description())?;
        writeln!(
            ctx.out,
            "{}",
            ctx.highlighter.hint("Anything else is run by the backing shell.")
        )?;
        writeln!(ctx.out)?;
        Ok(Flow::Continue)
    }
}
