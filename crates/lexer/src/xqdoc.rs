//! Lexer for the body of xqDoc comments (`(:~ ... :)`).
//!
//! The lexer is meant to run as a sub-lexer of [`XPathLexer`](crate::XPathLexer) through
//! [`CombinedLexer`](crate::CombinedLexer): it stops without consuming the closing `:)` so the
//! parent lexer can report the comment end tag.
//!
//! Nested `(: ... :)` comments inside the body are reported as contents. The nesting depth is
//! kept above [`XQDocLexer::STATE_BITS`] so lexing can resume inside a nested comment.

use std::sync::Arc;

use crate::character_class::CharacterClass;
use crate::code_point_range::END_OF_BUFFER;
use crate::lexer::{Lexer, LexerState};
use crate::token::TokenType;

const TAGGED_KEYWORDS: &[&str] =
    &["author", "deprecated", "error", "param", "return", "see", "since", "version"];

#[derive(Debug, Clone)]
pub struct XQDocLexer {
    state: LexerState,
    depth: u32,
}

impl Default for XQDocLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl XQDocLexer {
    pub const STATE_CONTENTS: u32 = 0;
    pub const STATE_LINE_START: u32 = 1;
    pub const STATE_TAG: u32 = 2;
    pub const STATE_PARAM_START: u32 = 3;
    pub const STATE_PARAM_VARNAME: u32 = 4;

    /// Low bits of a state holding the states above; the rest is the nested comment depth.
    pub const STATE_BITS: u32 = 8;
    const BASE_MASK: u32 = (1 << Self::STATE_BITS) - 1;
    const MAX_DEPTH: u32 = (crate::combined::STATE_MASK >> Self::STATE_BITS) - 1;

    pub fn new() -> Self {
        Self { state: LexerState::new(Self::STATE_CONTENTS), depth: 0 }
    }

    /// Switch to `base`, keeping the current nesting depth.
    fn set(&mut self, base: u32) {
        self.state.set_state(base | (self.depth << Self::STATE_BITS));
    }

    fn cp(&self) -> i32 {
        self.state.range.code_point()
    }

    fn class(&self) -> CharacterClass {
        CharacterClass::of(self.cp())
    }

    fn bump(&mut self) {
        self.state.range.match_char();
    }

    fn is_inline_space(cp: i32) -> bool {
        cp == ' ' as i32 || cp == '\t' as i32
    }

    fn is_line_break(cp: i32) -> bool {
        cp == '\n' as i32 || cp == '\r' as i32
    }

    /// `true` in front of `first` followed by `second`.
    fn at_pair(&mut self, first: char, second: char) -> bool {
        if self.cp() != first as i32 {
            return false;
        }
        self.state.range.save();
        self.bump();
        let found = self.cp() == second as i32;
        self.state.range.restore();
        found
    }

    /// `true` at the end of input or in front of the `:)` closing the xqDoc comment itself.
    fn at_terminator(&mut self) -> bool {
        self.cp() == END_OF_BUFFER || (self.depth == 0 && self.at_pair(':', ')'))
    }

    fn trim(&mut self) -> TokenType {
        while Self::is_line_break(self.cp()) {
            self.bump();
        }
        while Self::is_inline_space(self.cp()) {
            self.bump();
        }
        if self.cp() == ':' as i32 && !self.at_pair(':', ')') {
            self.bump();
        }
        self.set(Self::STATE_LINE_START);
        TokenType::XQDocTrim
    }

    fn contents(&mut self) -> TokenType {
        while !self.at_terminator() && !Self::is_line_break(self.cp()) {
            if self.at_pair('(', ':') {
                self.state.range.match_n(2);
                self.depth = (self.depth + 1).min(Self::MAX_DEPTH);
            } else if self.at_pair(':', ')') {
                self.state.range.match_n(2);
                self.depth -= 1;
            } else {
                self.bump();
            }
        }
        self.set(Self::STATE_CONTENTS);
        TokenType::XQDocContents
    }

    fn inline_space(&mut self) -> TokenType {
        while Self::is_inline_space(self.cp()) {
            self.bump();
        }
        TokenType::XQDocWhiteSpace
    }

    fn ncname(&mut self) {
        self.bump();
        while self.class().is_name() {
            self.bump();
        }
    }

    fn state_contents(&mut self) -> TokenType {
        if Self::is_line_break(self.cp()) { self.trim() } else { self.contents() }
    }

    fn state_line_start(&mut self) -> TokenType {
        let c = self.cp();
        if Self::is_line_break(c) {
            self.trim()
        } else if Self::is_inline_space(c) {
            self.inline_space()
        } else if c == '@' as i32 {
            self.bump();
            self.set(Self::STATE_TAG);
            TokenType::XQDocTagMarker
        } else {
            self.contents()
        }
    }

    fn state_tag(&mut self) -> TokenType {
        if !self.class().is_name_start() {
            return self.state_contents();
        }
        self.ncname();
        let name = self.state.range.token_text();
        if name == "param" {
            self.set(Self::STATE_PARAM_START);
        } else {
            self.set(Self::STATE_CONTENTS);
        }
        if TAGGED_KEYWORDS.contains(&name.as_str()) {
            TokenType::XQDocTaggedKeyword
        } else {
            TokenType::XQDocTag
        }
    }

    fn state_param_start(&mut self) -> TokenType {
        let c = self.cp();
        if Self::is_inline_space(c) {
            self.inline_space()
        } else if c == '$' as i32 {
            self.bump();
            self.set(Self::STATE_PARAM_VARNAME);
            TokenType::XQDocVariableIndicator
        } else {
            self.state_contents()
        }
    }

    fn state_param_varname(&mut self) -> TokenType {
        if self.class().is_name_start() {
            self.ncname();
            self.set(Self::STATE_CONTENTS);
            TokenType::XQDocNCName
        } else {
            self.state_contents()
        }
    }
}

impl Lexer for XQDocLexer {
    fn start(&mut self, buffer: Arc<[u16]>, start: usize, end: usize, initial_state: u32) {
        self.state.start(buffer, start, end, initial_state);
        self.advance();
    }

    fn advance(&mut self) {
        let state = self.state.begin_token();
        self.depth = state >> Self::STATE_BITS;
        if self.at_terminator() {
            self.state.token = None;
            return;
        }
        let token = match state & Self::BASE_MASK {
            Self::STATE_LINE_START => self.state_line_start(),
            Self::STATE_TAG => self.state_tag(),
            Self::STATE_PARAM_START => self.state_param_start(),
            Self::STATE_PARAM_VARNAME => self.state_param_varname(),
            _ => self.state_contents(),
        };
        self.state.token = Some(token);
    }

    fn token_type(&self) -> Option<TokenType> {
        self.state.token
    }

    fn token_start(&self) -> usize {
        self.state.token_start()
    }

    fn token_end(&self) -> usize {
        self.state.token_end()
    }

    fn state(&self) -> u32 {
        self.state.token_state()
    }

    fn buffer_end(&self) -> usize {
        self.state.buffer_end()
    }
}
