use std::sync::Arc;

use smallvec::SmallVec;

use crate::code_point_range::CodePointRange;
use crate::token::{Token, TokenType};

/// Incremental lexer contract.
///
/// A lexer is started over a region of a UTF-16 buffer and then stepped with
/// [`advance`](Self::advance). The single integer returned by [`state`](Self::state) is enough
/// to resume lexing from the start of the current token, which lets editors relex only the
/// damaged part of a document.
pub trait Lexer {
    /// Start lexing `buffer[start..end]` in `initial_state` and move to the first token.
    fn start(&mut self, buffer: Arc<[u16]>, start: usize, end: usize, initial_state: u32);

    /// Move to the next token.
    fn advance(&mut self);

    /// The current token, or `None` once the lexer is exhausted.
    fn token_type(&self) -> Option<TokenType>;

    fn token_start(&self) -> usize;

    fn token_end(&self) -> usize;

    /// State at the start of the current token.
    fn state(&self) -> u32;

    fn buffer_end(&self) -> usize;

    /// Drain the remaining tokens.
    fn tokens(&mut self) -> Vec<Token> {
        let mut out = Vec::new();
        while let Some(kind) = self.token_type() {
            out.push(Token { kind, start: self.token_start(), end: self.token_end() });
            self.advance();
        }
        out
    }
}

/// Shared bookkeeping for hand-written lexers: the codepoint cursor, the current token type
/// and the state stack.
#[derive(Debug, Clone)]
pub struct LexerState {
    pub range: CodePointRange,
    pub token: Option<TokenType>,
    default_state: u32,
    states: SmallVec<[u32; 8]>,
    token_state: u32,
}

impl LexerState {
    pub fn new(default_state: u32) -> Self {
        Self {
            range: CodePointRange::new(),
            token: None,
            default_state,
            states: SmallVec::new(),
            token_state: default_state,
        }
    }

    /// Reset the cursor and the state stack. A non-default initial state is stacked on top of
    /// the default state so that popping it returns to the default state.
    pub fn start(&mut self, buffer: Arc<[u16]>, start: usize, end: usize, initial_state: u32) {
        self.range.start(buffer, start, end);
        self.states.clear();
        if initial_state != self.default_state {
            self.states.push(self.default_state);
        }
        self.states.push(initial_state);
        self.token = None;
    }

    /// Begin a new token. Returns the state the token is lexed in.
    pub fn begin_token(&mut self) -> u32 {
        self.range.flush();
        self.token_state = self.next_state();
        self.token_state
    }

    pub fn next_state(&self) -> u32 {
        self.states.last().copied().unwrap_or(self.default_state)
    }

    pub fn push_state(&mut self, state: u32) {
        self.states.push(state);
    }

    pub fn pop_state(&mut self) {
        self.states.pop();
    }

    /// Replace the top of the state stack.
    pub fn set_state(&mut self, state: u32) {
        self.pop_state();
        self.push_state(state);
    }

    pub fn token_state(&self) -> u32 {
        self.token_state
    }

    pub fn token_start(&self) -> usize {
        self.range.start_offset()
    }

    pub fn token_end(&self) -> usize {
        self.range.end_offset()
    }

    pub fn buffer_end(&self) -> usize {
        self.range.buffer_end()
    }
}
