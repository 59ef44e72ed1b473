//! Streaming whitespace and comment remover for scripts.
//!
//! The minifier is a byte-level state machine. Every byte it cares about is
//! ASCII, so multi-byte UTF-8 sequences pass through or get dropped whole
//! depending on the state they fall in.
//!
//! A `/` is ambiguous between division, a comment opener and a regular
//! expression literal. It is treated as a possible regex start when the last
//! significant character was one of `( , = : [ ! & | ? { } ;` or a newline;
//! regex literals are then copied verbatim up to the end of the line.
//!
//! A space between tokens is held back until the next token is written, so
//! a line break that can end a statement replaces it instead of following
//! it, and trailing whitespace never reaches the output.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    TextSkipSpace,
    TextAfterNewline,
    Slash,
    MaybeRegex,
    RegexLiteral,
    LineComment,
    BlockComment { at_start: bool },
    BlockCommentStar,
    ConditionalComment,
    ConditionalCommentStar,
    QuotedString { quote: u8, escaped: bool },
}

impl State {
    /// States whose input is copied byte for byte.
    fn is_verbatim(self) -> bool {
        matches!(
            self,
            State::QuotedString { .. }
                | State::RegexLiteral
                | State::ConditionalComment
                | State::ConditionalCommentStar
        )
    }
}

/// Characters after which a `/` may open a regex literal.
fn is_regex_context(prev: u8) -> bool {
    matches!(
        prev,
        b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';' | b'\n'
    )
}

/// Characters after which following whitespace is never significant.
fn swallows_space(c: u8) -> bool {
    matches!(
        c,
        b' ' | b'{' | b',' | b';' | b':' | b'=' | b'(' | b'[' | b'!' | b'&' | b'|' | b'?'
    )
}

/// Characters that would fuse with a following `next` if written adjacently.
fn needs_separator(prev: u8, next: u8) -> bool {
    let word = |c: u8| c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c >= 0x80;
    (word(prev) && word(next)) || (matches!(next, b'+' | b'-') && prev == next)
}

/// Incremental script minifier writing into `W`.
///
/// Feed it chunks with [`ScriptMinifier::feed`] and call
/// [`ScriptMinifier::finish`] once the input is exhausted. Unterminated
/// strings, comments and regex literals at end of input are not errors.
pub struct ScriptMinifier<W: Write> {
    out: W,
    state: State,
    /// Text state to return to after a block comment.
    resume: State,
    /// Last non-space input character, in any state.
    prev_lex: u8,
    /// Last non-space character written, or 0 before any output.
    last_emitted: u8,
    /// A space is owed before the next non-newline character.
    pending_space: bool,
    /// A block comment was just dropped between two text characters.
    comment_gap: bool,
    after_cr: bool,
}

impl<W: Write> ScriptMinifier<W> {
    /// Creates a minifier writing into `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: State::TextSkipSpace,
            resume: State::TextSkipSpace,
            prev_lex: b'\n',
            last_emitted: 0,
            pending_space: false,
            comment_gap: false,
            after_cr: false,
        }
    }

    /// Consumes a chunk of input.
    pub fn feed(&mut self, input: &[u8]) -> io::Result<()> {
        for &byte in input {
            self.step(byte)?;
        }
        Ok(())
    }

    /// Flushes any pending slash and returns the writer. A trailing space is
    /// dropped.
    pub fn finish(mut self) -> io::Result<W> {
        if matches!(self.state, State::Slash | State::MaybeRegex) {
            self.emit(b'/')?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, c: u8) -> io::Result<()> {
        if std::mem::take(&mut self.pending_space) && c != b'\n' {
            self.out.write_all(b" ")?;
        }
        if c != b' ' {
            self.last_emitted = c;
        }
        self.out.write_all(&[c])
    }

    /// True if the output so far may end a statement.
    fn ends_statement(&self) -> bool {
        self.last_emitted != 0 && self.last_emitted != b'\n' && !swallows_space(self.last_emitted)
    }

    fn step(&mut self, byte: u8) -> io::Result<()> {
        let after_cr = std::mem::replace(&mut self.after_cr, byte == b'\r');
        let c = match byte {
            b'\n' if after_cr => return Ok(()),
            b'\r' | b'\n' => b'\n',
            b'\t' if self.state.is_verbatim() => b'\t',
            b'\t' => b' ',
            0..=0x1f => return Ok(()),
            other => other,
        };

        match self.state {
            State::QuotedString { quote, escaped } => {
                self.emit(c)?;
                self.state = if escaped {
                    State::QuotedString {
                        quote,
                        escaped: false,
                    }
                } else if c == b'\\' {
                    State::QuotedString {
                        quote,
                        escaped: true,
                    }
                } else if c == quote {
                    self.resume = State::Text;
                    State::Text
                } else {
                    self.state
                };
            }

            State::TextSkipSpace => {
                if c == b'\n' && self.pending_space && self.ends_statement() {
                    self.emit(c)?;
                    self.state = State::TextAfterNewline;
                    self.resume = State::TextAfterNewline;
                } else if c != b' ' && c != b'\n' {
                    self.text(c)?;
                }
            }

            State::TextAfterNewline => {
                if c != b' ' && c != b'\n' {
                    self.text(c)?;
                }
            }

            State::Text => self.text(c)?,

            State::Slash => match c {
                b'*' => self.state = State::BlockComment { at_start: true },
                b'/' => self.state = State::LineComment,
                _ => {
                    self.emit(b'/')?;
                    self.state = State::Text;
                    self.text(c)?;
                }
            },

            State::MaybeRegex => match c {
                b'*' => self.state = State::BlockComment { at_start: true },
                b'/' => self.state = State::LineComment,
                b'\n' => {
                    self.emit(b'/')?;
                    self.emit(b'\n')?;
                    self.state = State::TextAfterNewline;
                }
                _ => {
                    self.emit(b'/')?;
                    self.emit(c)?;
                    self.state = State::RegexLiteral;
                }
            },

            State::RegexLiteral => {
                self.emit(c)?;
                if c == b'\n' {
                    self.state = State::TextAfterNewline;
                }
            }

            State::LineComment => {
                if c == b'\n' {
                    self.end_line_comment()?;
                }
            }

            State::BlockComment { at_start } => {
                if c == b'*' {
                    self.state = State::BlockCommentStar;
                } else if at_start && c == b'@' {
                    self.emit(b'/')?;
                    self.emit(b'*')?;
                    self.emit(c)?;
                    self.state = State::ConditionalComment;
                } else {
                    self.state = State::BlockComment { at_start: false };
                }
            }

            State::BlockCommentStar => match c {
                b'/' => {
                    self.state = self.resume;
                    self.comment_gap = self.resume == State::Text;
                }
                b'*' => {}
                _ => self.state = State::BlockComment { at_start: false },
            },

            State::ConditionalComment => {
                self.emit(c)?;
                if c == b'*' {
                    self.state = State::ConditionalCommentStar;
                }
            }

            State::ConditionalCommentStar => {
                self.emit(c)?;
                self.state = match c {
                    b'/' => self.resume,
                    b'*' => State::ConditionalCommentStar,
                    _ => State::ConditionalComment,
                };
            }
        }

        if c != b' ' {
            self.prev_lex = c;
        }
        Ok(())
    }

    /// Handles a character in one of the text states.
    fn text(&mut self, c: u8) -> io::Result<()> {
        if std::mem::take(&mut self.comment_gap) && needs_separator(self.last_emitted, c) {
            self.pending_space = true;
        }
        if c == b' ' {
            self.pending_space = true;
            self.state = State::TextSkipSpace;
            self.resume = State::TextSkipSpace;
            return Ok(());
        }
        if c == b'/' {
            self.state = if is_regex_context(self.prev_lex) {
                State::MaybeRegex
            } else {
                State::Slash
            };
            return Ok(());
        }

        let next = match c {
            b'\n' => State::TextAfterNewline,
            b'\'' | b'"' | b'`' => State::QuotedString {
                quote: c,
                escaped: false,
            },
            c if swallows_space(c) => State::TextSkipSpace,
            _ => State::Text,
        };

        self.emit(c)?;
        self.state = next;
        if !matches!(next, State::QuotedString { .. }) {
            self.resume = next;
        }
        Ok(())
    }

    /// The newline ending a line comment survives only where it may end a
    /// statement.
    fn end_line_comment(&mut self) -> io::Result<()> {
        let next = if self.ends_statement() {
            self.emit(b'\n')?;
            State::TextAfterNewline
        } else {
            State::TextSkipSpace
        };
        self.state = next;
        self.resume = next;
        Ok(())
    }
}

/// Minifies script source read from `reader` into `writer`.
pub fn minify_script<R: Read, W: Write>(reader: R, writer: W) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut minifier = ScriptMinifier::new(BufWriter::new(writer));
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        let len = chunk.len();
        minifier.feed(chunk)?;
        reader.consume(len);
    }
    minifier.finish()?.flush()
}

/// Minifies script source held in memory.
pub fn minify_script_str(input: &str) -> String {
    let mut minifier = ScriptMinifier::new(Vec::with_capacity(input.len()));
    // Writes into a Vec cannot fail.
    let output = match minifier
        .feed(input.as_bytes())
        .and_then(|()| minifier.finish())
    {
        Ok(output) => output,
        Err(_) => return input.to_string(),
    };
    match String::from_utf8(output) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
