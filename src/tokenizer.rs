//! Splitting a finalized command line into argument tokens.
//!
//! Runs of unquoted whitespace separate tokens and never produce empty ones.
//! A `'...'` or `"..."` span contributes its contents verbatim (embedded
//! spaces included) to the surrounding token; the quote characters themselves
//! are stripped. Quotes delimit at every position, and a span left open runs
//! to the end of the line.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between tokens, discarding whitespace.
    Start,
    /// Accumulating an unquoted word.
    ReadingWord,
    /// Inside a `'...'` span.
    ReadingSingleQuote,
    /// Inside a `"..."` span.
    ReadingDoubleQuote,
}

struct ScanFsm {
    input: Vec<char>,
    pos: usize,
    state: ScanState,
    buffer: String,
}

impl ScanFsm {
    fn new(line: &str) -> Self {
        ScanFsm {
            input: line.chars().collect(),
            pos: 0,
            state: ScanState::Start,
            buffer: String::new(),
        }
    }

    fn make_tokens(&mut self) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                ScanState::Start => self.handle_start(ch),
                ScanState::ReadingWord => self.handle_word(ch, &mut out),
                ScanState::ReadingSingleQuote => self.handle_quote(ch, '\''),
                ScanState::ReadingDoubleQuote => self.handle_quote(ch, '"'),
            }
        }

        // A word in flight at end of input becomes the last token. This also
        // covers an unterminated quote: the partial span is emitted as-is.
        self.flush_word(&mut out);
        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            ' ' | '\t' => {}
            '\'' => self.state = ScanState::ReadingSingleQuote,
            '"' => self.state = ScanState::ReadingDoubleQuote,
            c => {
                self.buffer.push(c);
                self.state = ScanState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            ' ' | '\t' => {
                self.flush_word(out);
                self.state = ScanState::Start;
            }
            '\'' => self.state = ScanState::ReadingSingleQuote,
            '"' => self.state = ScanState::ReadingDoubleQuote,
            c => self.buffer.push(c),
        }
    }

    /// Inside a quoted span only the matching close quote is special.
    fn handle_quote(&mut self, ch: char, close: char) {
        if ch == close {
            self.state = ScanState::ReadingWord;
        } else {
            self.buffer.push(ch);
        }
    }

    fn flush_word(&mut self, out: &mut Vec<String>) {
        if !self.buffer.is_empty() {
            out.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Tokenize one finalized command line into an argument vector.
pub fn split_line(line: &str) -> Vec<String> {
    ScanFsm::new(line).make_tokens()
}
