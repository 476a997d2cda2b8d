//! Terminal collaborators: the raw-mode guard and the ANSI display sink.

use crate::editor::DisplayOp;
use anyhow::Context;
use crossterm::terminal;
use std::io::{Result as IoResult, Write};

/// Default prompt text. [`AnsiDisplay`] adds the styling.
pub const DEFAULT_PROMPT: &str = "rawsh> ";

/// Puts the terminal into raw mode for the lifetime of the value.
///
/// Restoration happens in `Drop`, so every path out of a line read (normal
/// finalization, Ctrl-C, an I/O error, a panic) puts the terminal back into
/// cooked mode. A restore failure during drop is reported and swallowed:
/// at that point the process is already on its way out of the read cycle.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("cannot switch the terminal into raw mode")?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            eprintln!("rawsh: failed to restore terminal mode: {err}");
        }
    }
}

/// Renders the editor's display updates, plus the handful of collaborator
/// actions (prompt, line break, interrupt echo) the read loop needs.
pub trait DisplaySink {
    /// Render one keystroke's worth of display updates.
    fn render(&mut self, ops: &[DisplayOp]) -> IoResult<()>;

    /// Show the prompt at the current cursor position.
    fn prompt(&mut self) -> IoResult<()>;

    /// Move to the start of the next line.
    fn line_break(&mut self) -> IoResult<()>;

    /// Enter on an empty line: open a new row and prompt again.
    fn fresh_prompt(&mut self) -> IoResult<()> {
        self.line_break()?;
        self.prompt()
    }

    /// Echo an interrupt the way terminals conventionally do.
    fn interrupt_echo(&mut self) -> IoResult<()>;
}

/// [`DisplaySink`] that writes ANSI escape sequences to any byte sink.
///
/// Raw mode suspends the terminal's own line discipline, so everything is
/// flushed eagerly; a buffered keystroke would otherwise stay invisible
/// until some later write pushed it out.
pub struct AnsiDisplay<W> {
    out: W,
    prompt: String,
}

impl<W: Write> AnsiDisplay<W> {
    pub fn new(out: W, prompt: &str) -> Self {
        Self {
            out,
            prompt: format!("\x1b[1;34m{prompt}\x1b[0m"),
        }
    }

    fn apply(&mut self, op: DisplayOp) -> IoResult<()> {
        match op {
            DisplayOp::EmitChar(ch) => {
                let mut buf = [0u8; 4];
                self.out.write_all(ch.encode_utf8(&mut buf).as_bytes())
            }
            DisplayOp::ClearToEndOfLine => self.out.write_all(b"\x1b[K"),
            DisplayOp::MoveCursor(cols) if cols < 0 => {
                write!(self.out, "\x1b[{}D", -cols)
            }
            DisplayOp::MoveCursor(cols) if cols > 0 => {
                write!(self.out, "\x1b[{cols}C")
            }
            DisplayOp::MoveCursor(_) => Ok(()),
        }
    }
}

impl<W: Write> DisplaySink for AnsiDisplay<W> {
    fn render(&mut self, ops: &[DisplayOp]) -> IoResult<()> {
        for &op in ops {
            self.apply(op)?;
        }
        self.out.flush()
    }

    fn prompt(&mut self) -> IoResult<()> {
        self.out.write_all(self.prompt.as_bytes())?;
        self.out.flush()
    }

    fn line_break(&mut self) -> IoResult<()> {
        self.out.write_all(b"\r\n")?;
        self.out.flush()
    }

    fn interrupt_echo(&mut self) -> IoResult<()> {
        self.out.write_all(b"^C\r\n")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(ops: &[DisplayOp]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut display = AnsiDisplay::new(&mut out, DEFAULT_PROMPT);
        display.render(ops).unwrap();
        out
    }

    #[test]
    fn emit_char_writes_the_char() {
        assert_eq!(rendered(&[DisplayOp::EmitChar('x')]), b"x");
    }

    #[test]
    fn clear_to_end_of_line_is_csi_k() {
        assert_eq!(rendered(&[DisplayOp::ClearToEndOfLine]), b"\x1b[K");
    }

    #[test]
    fn cursor_moves_map_to_csi_c_and_d() {
        assert_eq!(rendered(&[DisplayOp::MoveCursor(3)]), b"\x1b[3C");
        assert_eq!(rendered(&[DisplayOp::MoveCursor(-2)]), b"\x1b[2D");
        assert_eq!(rendered(&[DisplayOp::MoveCursor(0)]), b"");
    }

    #[test]
    fn prompt_is_styled_and_reset() {
        let mut out = Vec::new();
        let mut display = AnsiDisplay::new(&mut out, "sh> ");
        display.prompt().unwrap();
        assert_eq!(out, b"\x1b[1;34msh> \x1b[0m");
    }

    #[test]
    fn fresh_prompt_opens_a_new_row_first() {
        let mut out = Vec::new();
        let mut display = AnsiDisplay::new(&mut out, "sh> ");
        display.fresh_prompt().unwrap();
        assert_eq!(out, b"\r\n\x1b[1;34msh> \x1b[0m");
    }
}
