use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::{
    config::Config,
    core::{commands::Flow, Dispatcher},
    error::ShellError,
    highlight::Highlighter,
    input::{LineReader, Normalizer, ReadOutcome},
    process::{Interrupter, Session, Terminator},
};

/// The interactive front-end: prompt, dispatch, repeat.
pub struct Shell {
    reader: LineReader,
    session: Session,
    dispatcher: Dispatcher,
    highlighter: Highlighter,
    terminator: Terminator,
    config: Config,
}

impl Shell {
    /// Starts the backing shell and wires up signal handling.
    ///
    /// Failing to spawn the backing shell is fatal.
    pub fn new(config: Config) -> Result<Self, ShellError> {
        let reader = LineReader::new()?;
        let highlighter = Highlighter::new();

        let session = Session::start(&config.program, None)?;

        let interrupter = Interrupter::new();
        interrupter.install(config.quiet)?;

        let terminator = Terminator::new();
        terminator.track(session.pid());
        terminator.install()?;

        let dispatcher = Dispatcher::new(
            Normalizer::new(config.case_mode),
            interrupter,
            highlighter,
        );

        Ok(Shell {
            reader,
            session,
            dispatcher,
            highlighter,
            terminator,
            config,
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        if !self.config.quiet {
            println!("{}", self.highlighter.banner());
        }

        loop {
            let prompt = self.highlighter.prompt(&self.prompt_dir());
            match self.reader.read(&prompt)? {
                ReadOutcome::Line(line) => {
                    let flow = self.dispatcher.dispatch(
                        &line,
                        &mut self.session,
                        &mut io::stdout(),
                        &mut io::stderr(),
                    );
                    // cd and a lost session both replace the backing shell
                    self.terminator.track(self.session.pid());
                    match flow {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Exit) => return Ok(()),
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => eprintln!("{}", self.highlighter.error(&e.to_string())),
                    }
                }
                ReadOutcome::Interrupted => {
                    if !self.config.quiet {
                        println!("CTRL-C");
                    }
                }
                ReadOutcome::Eof => {
                    if !self.config.quiet {
                        println!("CTRL-D");
                    }
                    println!("{}", self.highlighter.farewell());
                    break;
                }
            }
        }

        self.session.shutdown()?;
        io::stdout().flush()?;
        Ok(())
    }

    fn prompt_dir(&self) -> PathBuf {
        match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("{}", self.highlighter.error(&e.to_string()));
                self.session
                    .working_dir()
                    .map(PathBuf::from)
                    .unwrap_or_default()
            }
        }
    }
}
