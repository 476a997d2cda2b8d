//! A small interactive shell with its own raw-mode line editor.
//!
//! The crate reads keystrokes straight from the terminal (printable bytes,
//! backspace, and the three-byte arrow-key escape sequences) into an
//! editable buffer with a movable cursor, tokenizes the finished line while
//! honoring quoted substrings, and dispatches the resulting argument vector
//! either to a builtin (`cd`, `exit`, `pwd`) or to an external program that
//! is spawned and waited for.
//!
//! The main entry point is [`Interpreter`], which drives the interactive
//! loop and one-shot dispatch. The line-editing core ([`keys`], [`editor`],
//! [`tokenizer`]) is exposed so it can be exercised against in-memory byte
//! streams; nothing in it touches the terminal directly.

mod builtin;
pub mod command;
pub mod editor;
pub mod env;
mod external;
mod interpreter;
pub mod keys;
pub mod term;
pub mod tokenizer;

pub use editor::ReadOutcome;
pub use interpreter::Interpreter;
