use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools.
pub type ExitCode = i32;

/// What the dispatcher tells the read loop after running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading lines; carries the exit code of the command that ran.
    Continue(ExitCode),
    /// The command asked the shell session to end.
    Terminate,
}

impl Flow {
    /// The exit code this flow resolves to if the session ends here.
    pub fn code(self) -> ExitCode {
        match self {
            Flow::Continue(code) => code,
            Flow::Terminate => 0,
        }
    }
}

/// Object-safe trait for any command the shell can run.
///
/// Implemented by built-ins via a blanket impl and by external commands.
/// Built-ins write their output to the provided sink so tests can capture
/// it; external commands inherit the real stdio and ignore it.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<Flow>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables
/// (e.g. using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and
    /// arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
