use anyhow::Result;
use argh::FromArgs;
use rawsh::Interpreter;

#[derive(FromArgs)]
/// An interactive shell with raw-mode line editing.
struct Cli {
    /// tokenize and run a single command line instead of starting the
    /// interactive loop
    #[argh(option, short = 'c')]
    command: Option<String>,

    /// prompt text to show instead of the default
    #[argh(option)]
    prompt: Option<String>,
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();
    let mut interpreter = Interpreter::default();

    let code = match cli.command {
        Some(line) => interpreter.run_line(&line)?.code(),
        None => interpreter.repl(cli.prompt.as_deref().unwrap_or(rawsh::term::DEFAULT_PROMPT))?,
    };
    std::process::exit(code);
}
