use inkline_common::{Pool, Span};

use crate::error::{MarkupError, Result};
use crate::token::{TagType, Token};

/// The tokenizer state machine.
///
/// ```text
///            '{'             other           ':' (emit prefix)
///   Start ---------> OpenBrace ------> InsideTag ----+
///     ^  \              |  '{' (escape)     | '}'     |
///     |   \ '}'         |  '/'              v         |
///     |    +------> CloseBrace <------------+---------+
///     |                 |
///     +--- other / '}' -+          OpenBrace --'/'--> CloseTag --'}'--> Start
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenizerState {
    /// Accumulating prose.
    Start,
    /// Just saw `{`; either an escape or the start of a tag.
    OpenBrace,
    /// Reading a tag name and, after `:`, its body.
    InsideTag,
    /// Reading the name of a `{/name}` closing tag.
    CloseTag,
    /// Just saw `}`; either the end of a tag or an escape.
    CloseBrace,
}

/// What the main loop does after a state handler returns.
enum Step {
    /// Move on to the next character.
    Advance,
    /// Handle the same character again in the (new) current state.
    Reconsume,
}

/// Markup tokenizer writing into a fixed-capacity token pool.
///
/// The tokenizer never allocates: every token is a [`Span`] into `input`
/// pushed onto the caller's pool. A full pool aborts with
/// [`MarkupError::OutOfMemory`].
pub struct Tokenizer<'a, 'p> {
    input: &'a str,
    pool: &'p mut Pool<Token>,
    state: TokenizerState,
    /// Start of the prose not yet emitted as a text token.
    text_start: usize,
    /// Offset of the `{` that opened the current tag.
    tag_start: usize,
    /// Offset of the `}` being examined in [`TokenizerState::CloseBrace`].
    brace_at: usize,
    /// Start of the tag name (after `{` or `{/`).
    name_start: usize,
    /// Start of the tag body (after `:`), once the prefix has been emitted.
    body_start: Option<usize>,
    /// End of a finished tag body waiting in [`TokenizerState::CloseBrace`].
    pending_body: Option<Span>,
}

impl<'a, 'p> Tokenizer<'a, 'p> {
    /// Create a tokenizer over `input`. The pool is cleared first.
    pub fn new(input: &'a str, pool: &'p mut Pool<Token>) -> Self {
        pool.clear();
        Self {
            input,
            pool,
            state: TokenizerState::Start,
            text_start: 0,
            tag_start: 0,
            brace_at: 0,
            name_start: 0,
            body_start: None,
            pending_body: None,
        }
    }

    /// Tokenize the whole input and return the number of tokens written.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error in the input, or
    /// [`MarkupError::OutOfMemory`] if the pool fills up.
    pub fn run(mut self) -> Result<usize> {
        let input = self.input;
        let mut chars = input.char_indices();
        let mut current = chars.next();

        while let Some((offset, c)) = current {
            let step = match self.state {
                TokenizerState::Start => self.handle_start(offset, c)?,
                TokenizerState::OpenBrace => self.handle_open_brace(offset, c)?,
                TokenizerState::InsideTag => self.handle_inside_tag(offset, c)?,
                TokenizerState::CloseTag => self.handle_close_tag(offset, c)?,
                TokenizerState::CloseBrace => self.handle_close_brace(offset, c)?,
            };
            if let Step::Advance = step {
                current = chars.next();
            }
        }

        self.finish()?;
        Ok(self.pool.len())
    }

    fn handle_start(&mut self, offset: usize, c: char) -> Result<Step> {
        match c {
            '{' => {
                self.tag_start = offset;
                self.state = TokenizerState::OpenBrace;
            }
            '}' => {
                self.brace_at = offset;
                self.state = TokenizerState::CloseBrace;
            }
            '\n' => {
                self.flush_text(offset)?;
                self.emit(Token::newline(Span::new(offset, offset + 1)))?;
                self.text_start = offset + 1;
            }
            _ => {}
        }
        Ok(Step::Advance)
    }

    fn handle_open_brace(&mut self, offset: usize, c: char) -> Result<Step> {
        match c {
            // "{{" stays in the text verbatim.
            '{' => self.state = TokenizerState::Start,
            '/' => {
                self.flush_text(self.tag_start)?;
                self.name_start = offset + 1;
                self.state = TokenizerState::CloseTag;
            }
            '}' | ':' | '\n' => return Err(unexpected(c, offset)),
            _ => {
                self.flush_text(self.tag_start)?;
                self.name_start = offset;
                self.body_start = None;
                self.state = TokenizerState::InsideTag;
            }
        }
        Ok(Step::Advance)
    }

    fn handle_inside_tag(&mut self, offset: usize, c: char) -> Result<Step> {
        match c {
            ':' if self.body_start.is_none() => {
                let name = Span::new(self.name_start, offset);
                let tag = TagType::from_name(name.slice(self.input))
                    .ok_or(MarkupError::InvalidTagPrefix { span: name })?;
                self.emit(Token::tag_prefix(tag, name))?;
                self.body_start = Some(offset + 1);
            }
            '}' => {
                let Some(body_start) = self.body_start.take() else {
                    return Err(MarkupError::InvalidTagPrefix {
                        span: Span::new(self.name_start, offset),
                    });
                };
                self.pending_body = Some(Span::new(body_start, offset));
                self.brace_at = offset;
                self.state = TokenizerState::CloseBrace;
            }
            '{' | '\n' => return Err(unexpected(c, offset)),
            _ => {}
        }
        Ok(Step::Advance)
    }

    fn handle_close_tag(&mut self, offset: usize, c: char) -> Result<Step> {
        match c {
            '}' => {
                let name = Span::new(self.name_start, offset);
                let tag = TagType::from_name(name.slice(self.input))
                    .ok_or(MarkupError::InvalidCloseTag { span: name })?;
                self.emit(Token::tag_close(tag, name))?;
                self.text_start = offset + 1;
                self.state = TokenizerState::Start;
            }
            '{' | ':' | '/' | '\n' => return Err(unexpected(c, offset)),
            _ => {}
        }
        Ok(Step::Advance)
    }

    fn handle_close_brace(&mut self, offset: usize, c: char) -> Result<Step> {
        // A `}` that ended a tag: emit the body, then let the start state
        // deal with whatever follows (including `{` for the next tag).
        if let Some(body) = self.pending_body.take() {
            self.emit(Token::tag_body(body))?;
            self.text_start = offset;
            self.state = TokenizerState::Start;
            return Ok(Step::Reconsume);
        }

        match c {
            // "}}" stays in the text verbatim.
            '}' => {
                self.state = TokenizerState::Start;
                Ok(Step::Advance)
            }
            _ => Err(unexpected('}', self.brace_at)),
        }
    }

    /// End of input: flush prose or reject an unfinished construct.
    fn finish(&mut self) -> Result<()> {
        match self.state {
            TokenizerState::Start => self.flush_text(self.input.len()),
            TokenizerState::CloseBrace => match self.pending_body.take() {
                Some(body) => self.emit(Token::tag_body(body)),
                None => Err(MarkupError::UnexpectedEndOfInput {
                    offset: self.brace_at,
                }),
            },
            TokenizerState::OpenBrace | TokenizerState::InsideTag | TokenizerState::CloseTag => {
                Err(MarkupError::UnexpectedEndOfInput {
                    offset: self.tag_start,
                })
            }
        }
    }

    /// Emit the pending prose up to `end`, if there is any.
    fn flush_text(&mut self, end: usize) -> Result<()> {
        if self.text_start < end {
            self.emit(Token::text(Span::new(self.text_start, end)))?;
        }
        self.text_start = end;
        Ok(())
    }

    fn emit(&mut self, token: Token) -> Result<()> {
        self.pool.push(token)?;
        Ok(())
    }
}

const fn unexpected(character: char, offset: usize) -> MarkupError {
    MarkupError::UnexpectedCharacter { character, offset }
}

/// Tokenize `input` into `pool`, returning the number of tokens written.
///
/// The pool is cleared first; on success it holds exactly the returned
/// number of tokens.
///
/// # Errors
///
/// See [`Tokenizer::run`].
pub fn tokenize(input: &str, pool: &mut Pool<Token>) -> Result<usize> {
    Tokenizer::new(input, pool).run()
}
