//! The line editor: an editable buffer with a cursor, driven one keystroke at
//! a time.
//!
//! The editor never touches the terminal. Every mutation queues [`DisplayOp`]s
//! describing how the visible line must change, and a [`DisplaySink`] renders
//! them. That keeps the whole state machine testable against plain vectors.

use crate::keys::{KeyDecoder, RawKey};
use crate::term::DisplaySink;
use std::io::{Read, Result as IoResult};

/// One display update the editor asks its sink to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOp {
    /// Write one character at the current cursor cell, advancing the cursor.
    EmitChar(char),
    /// Erase from the cursor to the end of the visible line.
    ClearToEndOfLine,
    /// Move the cursor by a signed number of columns; negative is left.
    MoveCursor(isize),
}

/// The editable command line: characters plus a cursor index.
///
/// `cursor` counts characters from the start of the line and always satisfies
/// `cursor <= len()`. Every insertion and deletion goes through methods that
/// keep that true.
#[derive(Debug, Default)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Characters at and after the cursor.
    fn tail(&self) -> &[char] {
        &self.chars[self.cursor..]
    }

    fn into_line(self) -> String {
        self.chars.into_iter().collect()
    }
}

/// What a single keystroke did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Still editing. Any display updates have been queued.
    Editing,
    /// Enter on an empty buffer: nothing to run, the caller shows a fresh
    /// prompt and editing continues.
    EmptyLine,
    /// Enter confirmed a non-empty buffer; editing is over.
    Finalized,
    /// Ctrl-C; the line is abandoned.
    Interrupted,
}

/// The keystroke state machine. Owns the buffer from the first key until the
/// line is finalized and moved out.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: EditBuffer,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// Consume the editor and hand the accumulated text over.
    pub fn into_line(self) -> String {
        self.buffer.into_line()
    }

    /// Apply one keystroke, queueing display updates onto `ops`.
    pub fn apply(&mut self, key: RawKey, ops: &mut Vec<DisplayOp>) -> Applied {
        let buf = &mut self.buffer;
        match key {
            RawKey::Printable(ch) => {
                if buf.cursor == buf.chars.len() {
                    buf.chars.push(ch);
                    buf.cursor += 1;
                    ops.push(DisplayOp::EmitChar(ch));
                } else {
                    buf.chars.insert(buf.cursor, ch);
                    buf.cursor += 1;
                    // Redraw the shifted tail, then step the cursor back to
                    // just after the inserted character.
                    ops.push(DisplayOp::EmitChar(ch));
                    ops.push(DisplayOp::ClearToEndOfLine);
                    let tail = buf.tail().len();
                    ops.extend(buf.tail().iter().map(|&c| DisplayOp::EmitChar(c)));
                    ops.push(DisplayOp::MoveCursor(-(tail as isize)));
                }
                Applied::Editing
            }
            RawKey::Backspace => {
                if buf.cursor == 0 {
                    return Applied::Editing;
                }
                buf.cursor -= 1;
                buf.chars.remove(buf.cursor);
                // Step left, redraw the tail over the old cells, blank the
                // ghost of the last character, then walk back.
                ops.push(DisplayOp::MoveCursor(-1));
                let tail = buf.tail().len();
                ops.extend(buf.tail().iter().map(|&c| DisplayOp::EmitChar(c)));
                ops.push(DisplayOp::EmitChar(' '));
                ops.push(DisplayOp::MoveCursor(-(tail as isize + 1)));
                Applied::Editing
            }
            RawKey::ArrowLeft => {
                if buf.cursor > 0 {
                    buf.cursor -= 1;
                    ops.push(DisplayOp::MoveCursor(-1));
                }
                Applied::Editing
            }
            RawKey::ArrowRight => {
                if buf.cursor < buf.chars.len() {
                    buf.cursor += 1;
                    ops.push(DisplayOp::MoveCursor(1));
                }
                Applied::Editing
            }
            // Reserved for history and completion.
            RawKey::ArrowUp | RawKey::ArrowDown | RawKey::Tab | RawKey::UnknownEscape => {
                Applied::Editing
            }
            RawKey::Newline => {
                if buf.is_empty() {
                    Applied::EmptyLine
                } else {
                    Applied::Finalized
                }
            }
            RawKey::CtrlC => Applied::Interrupted,
        }
    }
}

/// How a line-read cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Enter confirmed a non-empty line.
    Line(String),
    /// The input stream ended mid-line; whatever was typed so far is handed
    /// over, and the caller knows there is nothing more to read.
    Eof(String),
    /// Ctrl-C abandoned the line.
    Interrupted,
}

/// Read one command line: decode keystrokes until the line is confirmed,
/// the stream ends, or the user interrupts.
///
/// The caller is responsible for having printed the prompt and for holding
/// the terminal in raw mode around this call.
pub fn read_line<R, S>(decoder: &mut KeyDecoder<R>, sink: &mut S) -> IoResult<ReadOutcome>
where
    R: Read,
    S: DisplaySink,
{
    let mut editor = LineEditor::new();
    let mut ops = Vec::new();
    loop {
        let Some(key) = decoder.next_key()? else {
            return Ok(ReadOutcome::Eof(editor.into_line()));
        };
        ops.clear();
        match editor.apply(key, &mut ops) {
            Applied::Editing => sink.render(&ops)?,
            Applied::EmptyLine => sink.fresh_prompt()?,
            Applied::Finalized => {
                sink.line_break()?;
                return Ok(ReadOutcome::Line(editor.into_line()));
            }
            Applied::Interrupted => {
                sink.interrupt_echo()?;
                return Ok(ReadOutcome::Interrupted);
            }
        }
    }
}
