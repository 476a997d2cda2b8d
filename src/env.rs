use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable view of the process environment owned by the interpreter.
///
/// Holds the variable map handed to spawned commands and the working
/// directory command execution happens in. Both start as a snapshot of the
/// real process state; `cd` mutates `current_dir` for the rest of the
/// session.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g. PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The working directory commands run in.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// Get the value of an environment variable, falling back to the real
    /// process environment for keys never touched in this session.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_var() {
        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
        };

        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);
        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }
}
