use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// A command resolved to an executable on disk rather than a builtin.
///
/// The child inherits the shell's stdio; by the time it runs, the terminal
/// is back in cooked mode, so interactive children behave normally.
pub struct ExternalCommand {
    path: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(path: OsString, args: Vec<OsString>) -> Self {
        Self { path, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH")?;
        match find_command_path(OsStr::new(&search_paths), Path::new(&name)) {
            Some(executable) => Some(Box::new(ExternalCommand::new(
                executable.as_os_str().to_owned(),
                args.iter().map(|x| x.into()).collect(),
            ))),
            None => None,
        }
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<Flow> {
        let mut child = std::process::Command::new(&self.path)
            .args(&self.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("failed to run {}", self.path.to_string_lossy()))?;
        let exit_status = child.wait()?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        Ok(Flow::Continue(code))
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name to an executable path.
///
/// - Absolute or multi-component relative paths are used as given when they
///   exist.
/// - A single component (no separator) is searched for in each directory of
///   `search_paths` (PATH), first match wins.
/// - An empty name resolves to nothing.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_path_is_used_as_given() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(osstr("/bin"), path).expect("/bin/sh should exist");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_missing_path_is_not_found() {
        let path = Path::new("/bin/nonexisting");
        assert!(find_command_path(osstr("/bin"), path).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_is_searched_in_path() {
        let found = find_command_path(osstr("/bin"), Path::new("sh"))
            .expect("'sh' should resolve via PATH");
        assert!(found.as_ref().starts_with("/bin"));
        assert!(found.as_ref().ends_with("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_missing_from_path() {
        assert!(find_command_path(osstr("/bin"), Path::new("nonexisting")).is_none());
    }

    #[test]
    fn empty_name_resolves_to_nothing() {
        assert!(find_command_path(OsStr::new(""), Path::new("")).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn external_true_and_false_report_their_codes() {
        let mut env = Environment::new();
        let mut out: Vec<u8> = Vec::new();

        let ok = Box::new(ExternalCommand::new("/usr/bin/true".into(), Vec::new()));
        if Path::new("/usr/bin/true").exists() {
            assert_eq!(
                ok.execute(&mut out, &mut env).unwrap(),
                Flow::Continue(0)
            );
        }

        let fail = Box::new(ExternalCommand::new("/usr/bin/false".into(), Vec::new()));
        if Path::new("/usr/bin/false").exists() {
            assert_eq!(
                fail.execute(&mut out, &mut env).unwrap(),
                Flow::Continue(1)
            );
        }
    }
}
