use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Executes the command against the session environment.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<Flow> {
        match T::execute(*self, stdout, env) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                // A builtin failure never ends the session.
                writeln!(stdout, "{e:#}")?;
                Ok(Flow::Continue(1))
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<Flow> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(Flow::Continue(if self.is_error { 1 } else { 0 }))
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// With no target, changes to the directory named by HOME.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to, absolute or relative to the current
    /// directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => {
                if let Some(home) = env.get_var("HOME") {
                    PathBuf::from(home)
                } else {
                    return Err(anyhow::anyhow!("cd: no target and HOME not set"));
                }
            }
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(Flow::Continue(0))
    }
}

#[derive(FromArgs)]
/// End the shell session.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; a numeric status argument is accepted for compatibility.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<Flow> {
        // The read loop unwinds normally so the terminal guard can restore
        // the original mode; no process::exit here.
        Ok(Flow::Terminate)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(Flow::Continue(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lock_current_dir, make_unique_temp_dir};
    use std::collections::HashMap;
    use std::env as stdenv;

    #[test]
    fn pwd_prints_current_dir() {
        let _lock = lock_current_dir();
        let cur = stdenv::current_dir().unwrap();

        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: cur.clone(),
        };

        let mut out: Vec<u8> = Vec::new();
        let cmd = Pwd {};
        let flow = cmd.execute(&mut out, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue(0));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}\n", cur.to_string_lossy())
        );
    }

    #[test]
    fn exit_terminates_without_touching_the_process() {
        let mut env = Environment::new();
        let cmd = Exit { _args: Vec::new() };
        let flow = cmd.execute(&mut std::io::sink(), &mut env).unwrap();
        assert_eq!(flow, Flow::Terminate);
    }

    #[test]
    fn cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");

        let orig = stdenv::current_dir().unwrap();

        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: orig.clone(),
        };

        let cmd = Cd {
            target: Some(canonical_temp.to_string_lossy().to_string()),
        };
        let flow = cmd.execute(&mut std::io::sink(), &mut env).unwrap();

        assert_eq!(flow, Flow::Continue(0));
        assert_eq!(
            fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(),
            canonical_temp
        );
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn cd_defaults_to_home() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");

        let orig = stdenv::current_dir().unwrap();

        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: orig.clone(),
        };
        env.set_var("HOME", canonical_temp.to_string_lossy().to_string());

        let cmd = Cd { target: None };
        let flow = cmd.execute(&mut std::io::sink(), &mut env).unwrap();

        assert_eq!(flow, Flow::Continue(0));
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn cd_nonexistent_path_errors_and_stays_put() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: orig.clone(),
        };

        let cmd = Cd {
            target: Some(format!("nonexistent_dir_for_rawsh_test_{}", std::process::id())),
        };
        let res = cmd.execute(&mut std::io::sink(), &mut env);

        assert!(res.is_err());
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn builtin_failure_reports_and_continues() {
        let _lock = lock_current_dir();
        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
        };

        let cmd: Box<Cd> = Box::new(Cd {
            target: Some(format!("missing_{}", std::process::id())),
        });
        let mut out: Vec<u8> = Vec::new();
        // Through the blanket impl the error is reported, not propagated.
        let flow = ExecutableCommand::execute(cmd, &mut out, &mut env).unwrap();

        assert_eq!(flow, Flow::Continue(1));
        assert!(String::from_utf8(out).unwrap().contains("cd:"));
    }
}
