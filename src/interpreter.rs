use crate::builtin::{Cd, Exit, Pwd};
use crate::command::{CommandFactory, ExitCode, Flow};
use crate::editor::{self, ReadOutcome};
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::keys::KeyDecoder;
use crate::term::{AnsiDisplay, DisplaySink, RawModeGuard};
use crate::tokenizer;
use anyhow::Result;
use std::io;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The shell session: an [`Environment`] plus the set of command factories
/// queried to resolve each dispatched line.
///
/// Example
/// ```
/// use rawsh::Interpreter;
/// use rawsh::command::Flow;
/// let mut sh = Interpreter::default();
/// assert_eq!(sh.run_line("pwd").unwrap(), Flow::Continue(0));
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's flow signal, or an error if no factory
    /// recognizes the name or the command fails to start.
    pub fn run(&mut self, name: &str, args: &[&str]) -> Result<Flow> {
        let mut stdout = io::stdout().lock();
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(&mut stdout, &mut self.env);
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name))
    }

    /// Tokenize one finalized line and dispatch it.
    ///
    /// A blank (or whitespace-only) line is not an error and runs nothing.
    pub fn run_line(&mut self, line: &str) -> Result<Flow> {
        let tokens = tokenizer::split_line(line);
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(Flow::Continue(0));
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.run(name, &args)
    }

    /// The interactive loop: prompt, read one line in raw mode, tokenize,
    /// dispatch, repeat. Returns the exit code the process should end with.
    ///
    /// Raw mode is held only while a line is being edited; commands run
    /// against a cooked terminal.
    pub fn repl(&mut self, prompt: &str) -> Result<ExitCode> {
        let mut sink = AnsiDisplay::new(io::stdout(), prompt);
        let mut decoder = KeyDecoder::new(io::stdin());
        loop {
            let outcome = {
                let _raw = RawModeGuard::acquire()?;
                sink.prompt()?;
                editor::read_line(&mut decoder, &mut sink)?
            };
            match outcome {
                ReadOutcome::Interrupted => return Ok(130),
                ReadOutcome::Line(line) => {
                    if let Flow::Terminate = self.dispatch(&line) {
                        println!("exiting...");
                        return Ok(0);
                    }
                }
                ReadOutcome::Eof(rest) => {
                    // The stream is gone; run what was typed, then leave.
                    println!();
                    let flow = self.dispatch(&rest);
                    if let Flow::Terminate = flow {
                        println!("exiting...");
                    }
                    return Ok(flow.code());
                }
            }
        }
    }

    /// Dispatch one line, reporting failure without ending the session.
    fn dispatch(&mut self, line: &str) -> Flow {
        match self.run_line(line) {
            Ok(flow) => flow,
            Err(err) => {
                eprintln!("rawsh: {err:#}");
                Flow::Continue(127)
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `cd`, `exit`, `pwd`
    /// - the external command launcher
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
