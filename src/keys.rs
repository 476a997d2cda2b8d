//! Decoding raw terminal bytes into keystrokes.

use std::io::{ErrorKind, Read, Result as IoResult};

/// A single decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKey {
    /// A byte to be inserted into the line as typed.
    Printable(char),
    /// Enter. Raw mode delivers it as `\r`, cooked pipes as `\n`; both count.
    Newline,
    /// Backspace, either DEL (0x7f) or BS (0x08).
    Backspace,
    /// Tab. Recognized so it can be ignored instead of inserted.
    Tab,
    /// Ctrl-C, delivered in-band because raw mode disables signal generation.
    CtrlC,
    /// Left arrow (`ESC [ D`).
    ArrowLeft,
    /// Right arrow (`ESC [ C`).
    ArrowRight,
    /// Up arrow (`ESC [ A`).
    ArrowUp,
    /// Down arrow (`ESC [ B`).
    ArrowDown,
    /// An escape sequence this shell does not interpret.
    UnknownEscape,
}

/// Pulls one keystroke at a time out of a blocking byte stream.
///
/// The decoder owns the reader for the duration of a session; it keeps no
/// buffer of its own beyond the two lookahead bytes an escape sequence needs.
pub struct KeyDecoder<R> {
    input: R,
}

impl<R: Read> KeyDecoder<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Decode the next keystroke.
    ///
    /// `Ok(None)` means the stream is exhausted. An escape sequence cut short
    /// by end-of-input also yields `Ok(None)`: once `ESC` has been seen, both
    /// lookahead bytes must arrive before the key can be classified, and a
    /// stream that ends in the middle has nothing more to say.
    pub fn next_key(&mut self) -> IoResult<Option<RawKey>> {
        let Some(byte) = self.read_byte()? else {
            return Ok(None);
        };
        let key = match byte {
            b'\n' | b'\r' => RawKey::Newline,
            0x7f | 0x08 => RawKey::Backspace,
            b'\t' => RawKey::Tab,
            0x03 => RawKey::CtrlC,
            0x1b => return self.decode_escape(),
            b => RawKey::Printable(b as char),
        };
        Ok(Some(key))
    }

    /// Arrows arrive as the three-byte CSI form `ESC [ letter`.
    fn decode_escape(&mut self) -> IoResult<Option<RawKey>> {
        let Some(introducer) = self.read_byte()? else {
            return Ok(None);
        };
        let Some(code) = self.read_byte()? else {
            return Ok(None);
        };
        if introducer != b'[' {
            return Ok(Some(RawKey::UnknownEscape));
        }
        let key = match code {
            b'A' => RawKey::ArrowUp,
            b'B' => RawKey::ArrowDown,
            b'C' => RawKey::ArrowRight,
            b'D' => RawKey::ArrowLeft,
            _ => RawKey::UnknownEscape,
        };
        Ok(Some(key))
    }

    fn read_byte(&mut self) -> IoResult<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            return match self.input.read(&mut buf) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
        }
    }
}
