use std::env;
use std::io::Write;

use super::commands::{CdCommand, ClearCommand, Command, CommandContext, CommandRegistry, Flow};
use crate::error::ShellError;
use crate::highlight::Highlighter;
use crate::input::{NormalizedInput, Normalizer};
use crate::process::{Interrupter, ProcessError, Session};

/// Where one line of input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Blank line: re-prompt.
    Empty,
    /// A registered built-in, matched by exact name.
    Intercepted(String),
    ChangeDirectory(String),
    ClearScreen,
    /// Everything else, re-joined for the backing shell.
    Forward(String),
}

pub struct Dispatcher {
    registry: CommandRegistry,
    normalizer: Normalizer,
    interrupter: Interrupter,
    highlighter: Highlighter,
    cd: CdCommand,
    clear: ClearCommand,
}

impl Dispatcher {
    pub fn new(normalizer: Normalizer, interrupter: Interrupter, highlighter: Highlighter) -> Self {
        Self {
            registry: CommandRegistry::new(),
            normalizer,
            interrupter,
            highlighter,
            cd: CdCommand::new(),
            clear: ClearCommand::new(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn route(&self, input: &NormalizedInput) -> Route {
        let Some(name) = input.command() else {
            return Route::Empty;
        };

        if self.registry.contains(&name) {
            return Route::Intercepted(name);
        }

        match (name.as_str(), input.args().first()) {
            ("cd", Some(target)) => Route::ChangeDirectory(target.clone()),
            (name, _) if ClearCommand::matches(name) => Route::ClearScreen,
            // bare `cd` goes to the shell so it reports the missing operand itself
            _ => Route::Forward(input.joined()),
        }
    }

    /// Handles one raw input line against the live session.
    pub fn dispatch(
        &self,
        line: &str,
        session: &mut Session,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<Flow, ShellError> {
        let input = self.normalizer.normalize(line);
        let route = self.route(&input);
        tracing::debug!(?route, "dispatching input");

        let args = input.args();
        let mut ctx = CommandContext {
            session,
            out,
            highlighter: &self.highlighter,
            registry: &self.registry,
        };

        let flow = match route {
            Route::Empty => Flow::Continue,
            Route::Intercepted(name) => match self.registry.execute(&name, args, &mut ctx) {
                Some(result) => result?,
                None => Flow::Continue,
            },
            Route::ChangeDirectory(target) => self.cd.execute(&[target], &mut ctx)?,
            Route::ClearScreen => self.clear.execute(&[], &mut ctx)?,
            Route::Forward(command) => self.forward(&command, ctx.session, ctx.out, err)?,
        };
        Ok(flow)
    }

    fn forward(
        &self,
        command: &str,
        session: &mut Session,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<Flow, ShellError> {
        let result = {
            let _armed = self.interrupter.arm(session.pid());
            session.run(command, out, err)
        };

        match result {
            Ok(_) => {
                writeln!(out)?;
                out.flush()?;
            }
            Err(ProcessError::SessionLost) => {
                writeln!(
                    err,
                    "{}",
                    self.highlighter.error("backing shell exited, starting a new one")
                )?;
                writeln!(out)?;
                out.flush()?;
                let cwd = env::current_dir()?;
                session.restart(&cwd)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Flow::Continue)
    }
}
