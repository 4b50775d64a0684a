//! Hand-written lexer for XPath 3.1 with the XQuery keyword vocabulary.

use std::sync::Arc;

use crate::character_class::CharacterClass;
use crate::code_point_range::END_OF_BUFFER;
use crate::lexer::{Lexer, LexerState};
use crate::token::{Keyword, TokenType};

const fn cp(c: char) -> i32 {
    c as i32
}

/// Character-class driven lexer for the XPath/XQuery expression language.
///
/// Malformed input never fails: unknown characters become [`TokenType::BadCharacter`] and
/// unterminated constructs are reported with partial token types or simply end at the end of
/// the buffer.
#[derive(Debug, Clone)]
pub struct XPathLexer {
    state: LexerState,
}

impl Default for XPathLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl XPathLexer {
    pub const STATE_DEFAULT: u32 = 0;
    pub const STATE_STRING_LITERAL_QUOTE: u32 = 1;
    pub const STATE_STRING_LITERAL_APOSTROPHE: u32 = 2;
    pub const STATE_COMMENT: u32 = 3;
    pub const STATE_PRAGMA_PRE_QNAME: u32 = 4;
    pub const STATE_PRAGMA_QNAME: u32 = 5;
    pub const STATE_PRAGMA_CONTENTS: u32 = 6;
    pub const STATE_BRACED_URI_LITERAL: u32 = 7;
    pub const STATE_XQDOC_COMMENT_MARKER: u32 = 8;

    pub fn new() -> Self {
        Self { state: LexerState::new(Self::STATE_DEFAULT) }
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

    fn eat(&mut self, c: char) -> bool {
        if self.cp() == cp(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(CharacterClass) -> bool) {
        while pred(self.class()) {
            self.bump();
        }
    }

    fn state_default(&mut self) -> Option<TokenType> {
        let token = match self.class() {
            CharacterClass::EndOfBuffer => return None,
            CharacterClass::Whitespace => {
                self.eat_while(|c| c == CharacterClass::Whitespace);
                TokenType::WhiteSpace
            }
            CharacterClass::Dot => {
                self.bump();
                if self.eat('.') {
                    TokenType::ParentSelector
                } else if self.class() == CharacterClass::Digit {
                    self.eat_while(|c| c == CharacterClass::Digit);
                    self.exponent(TokenType::DecimalLiteral)
                } else {
                    TokenType::ContextItem
                }
            }
            CharacterClass::Digit => self.number(),
            CharacterClass::Quote => {
                self.bump();
                self.state.push_state(Self::STATE_STRING_LITERAL_QUOTE);
                TokenType::StringLiteralStart
            }
            CharacterClass::Apostrophe => {
                self.bump();
                self.state.push_state(Self::STATE_STRING_LITERAL_APOSTROPHE);
                TokenType::StringLiteralStart
            }
            CharacterClass::NameStartChar => self.name_or_braced_uri(),
            CharacterClass::ParenthesisOpen => {
                self.bump();
                if self.eat(':') {
                    if self.cp() == cp('~') {
                        self.state.push_state(Self::STATE_XQDOC_COMMENT_MARKER);
                    } else {
                        self.state.push_state(Self::STATE_COMMENT);
                    }
                    TokenType::CommentStartTag
                } else if self.eat('#') {
                    self.state.push_state(Self::STATE_PRAGMA_PRE_QNAME);
                    TokenType::PragmaBegin
                } else {
                    TokenType::ParenthesisOpen
                }
            }
            CharacterClass::ParenthesisClose => {
                self.bump();
                TokenType::ParenthesisClose
            }
            CharacterClass::Colon => {
                self.bump();
                if self.eat(':') {
                    TokenType::AxisSeparator
                } else if self.eat('=') {
                    TokenType::Assign
                } else if self.eat(')') {
                    TokenType::CommentEndTag
                } else {
                    TokenType::QNameSeparator
                }
            }
            CharacterClass::Hash => {
                self.bump();
                if self.eat(')') { TokenType::PragmaEnd } else { TokenType::FunctionRefOperator }
            }
            CharacterClass::ExclamationMark => {
                self.bump();
                if self.eat('=') { TokenType::NotEqual } else { TokenType::MapOperator }
            }
            CharacterClass::Equal => {
                self.bump();
                if self.eat('>') { TokenType::ArrowOperator } else { TokenType::Equal }
            }
            CharacterClass::LessThan => {
                self.bump();
                if self.eat('=') {
                    TokenType::LessThanOrEqual
                } else if self.eat('<') {
                    TokenType::NodeBefore
                } else {
                    TokenType::LessThan
                }
            }
            CharacterClass::GreaterThan => {
                self.bump();
                if self.eat('=') {
                    TokenType::GreaterThanOrEqual
                } else if self.eat('>') {
                    TokenType::NodeAfter
                } else {
                    TokenType::GreaterThan
                }
            }
            CharacterClass::VerticalBar => {
                self.bump();
                if self.eat('|') { TokenType::Concatenation } else { TokenType::Union }
            }
            CharacterClass::ForwardSlash => {
                self.bump();
                if self.eat('/') { TokenType::AllDescendants } else { TokenType::DirectDescendants }
            }
            class => {
                self.bump();
                match class {
                    CharacterClass::AtSign => TokenType::AttributeSelector,
                    CharacterClass::Comma => TokenType::Comma,
                    CharacterClass::SquareBracketOpen => TokenType::SquareOpen,
                    CharacterClass::SquareBracketClose => TokenType::SquareClose,
                    CharacterClass::CurlyBraceOpen => TokenType::BlockOpen,
                    CharacterClass::CurlyBraceClose => TokenType::BlockClose,
                    CharacterClass::Plus => TokenType::Plus,
                    CharacterClass::HyphenMinus => TokenType::Minus,
                    CharacterClass::Star => TokenType::Star,
                    CharacterClass::QuestionMark => TokenType::Optional,
                    CharacterClass::Dollar => TokenType::VariableIndicator,
                    CharacterClass::Semicolon => TokenType::Separator,
                    _ => TokenType::BadCharacter,
                }
            }
        };
        Some(token)
    }

    fn number(&mut self) -> TokenType {
        self.eat_while(|c| c == CharacterClass::Digit);
        let kind = if self.eat('.') {
            self.eat_while(|c| c == CharacterClass::Digit);
            TokenType::DecimalLiteral
        } else {
            TokenType::IntegerLiteral
        };
        self.exponent(kind)
    }

    fn exponent(&mut self, kind: TokenType) -> TokenType {
        let c = self.cp();
        if c != cp('e') && c != cp('E') {
            return kind;
        }
        self.state.range.save();
        self.bump();
        if !self.eat('+') {
            self.eat('-');
        }
        if self.class() == CharacterClass::Digit {
            self.eat_while(|c| c == CharacterClass::Digit);
            return TokenType::DoubleLiteral;
        }
        if self.class().is_name_start() {
            // `1else`: the name is a separate token, missing whitespace is a parser concern.
            self.state.range.restore();
            return kind;
        }
        TokenType::PartialDoubleLiteralExponent
    }

    fn name_or_braced_uri(&mut self) -> TokenType {
        if self.cp() == cp('Q') {
            self.state.range.save();
            self.bump();
            if self.eat('{') {
                self.state.push_state(Self::STATE_BRACED_URI_LITERAL);
                return TokenType::BracedUriLiteralStart;
            }
            self.state.range.restore();
        }
        self.ncname();
        match Keyword::lookup(&self.state.range.token_text()) {
            Some(keyword) => TokenType::Keyword(keyword),
            None => TokenType::NCName,
        }
    }

    fn ncname(&mut self) {
        self.bump();
        self.eat_while(CharacterClass::is_name);
    }

    fn entity_reference(&mut self) -> TokenType {
        self.bump();
        match self.class() {
            CharacterClass::NameStartChar => {
                self.ncname();
                if self.eat(';') {
                    TokenType::PredefinedEntityReference
                } else {
                    TokenType::PartialEntityReference
                }
            }
            CharacterClass::Hash => {
                self.bump();
                if self.eat('x') {
                    while matches!(self.cp(), 0x30..=0x39 | 0x41..=0x46 | 0x61..=0x66) {
                        self.bump();
                    }
                } else {
                    self.eat_while(|c| c == CharacterClass::Digit);
                }
                if self.eat(';') {
                    TokenType::CharacterReference
                } else {
                    TokenType::PartialEntityReference
                }
            }
            _ => {
                self.eat(';');
                TokenType::EmptyEntityReference
            }
        }
    }

    fn state_string(&mut self, quote: char) -> Option<TokenType> {
        let c = self.cp();
        if c == END_OF_BUFFER {
            return None;
        }
        if c == cp(quote) {
            self.bump();
            if self.eat(quote) {
                return Some(TokenType::EscapedCharacter);
            }
            self.state.pop_state();
            return Some(TokenType::StringLiteralEnd);
        }
        if c == cp('&') {
            return Some(self.entity_reference());
        }
        while self.cp() != END_OF_BUFFER && self.cp() != cp(quote) && self.cp() != cp('&') {
            self.bump();
        }
        Some(TokenType::StringLiteralContents)
    }

    fn state_braced_uri(&mut self) -> Option<TokenType> {
        let c = self.cp();
        if c == END_OF_BUFFER {
            return None;
        }
        if c == cp('}') {
            self.bump();
            self.state.pop_state();
            return Some(TokenType::BracedUriLiteralEnd);
        }
        if c == cp('&') {
            return Some(self.entity_reference());
        }
        while self.cp() != END_OF_BUFFER && self.cp() != cp('}') && self.cp() != cp('&') {
            self.bump();
        }
        Some(TokenType::StringLiteralContents)
    }

    fn state_comment(&mut self) -> Option<TokenType> {
        match self.cp() {
            END_OF_BUFFER => return None,
            c if c == cp(':') => {
                self.state.range.save();
                self.bump();
                if self.eat(')') {
                    self.state.pop_state();
                    return Some(TokenType::CommentEndTag);
                }
                self.state.range.restore();
            }
            _ => {}
        }
        let mut depth = 0usize;
        loop {
            let c = self.cp();
            if c == END_OF_BUFFER {
                return Some(TokenType::PartialComment);
            }
            if c == cp('(') {
                self.bump();
                if self.eat(':') {
                    depth += 1;
                }
            } else if c == cp(':') {
                self.state.range.save();
                self.bump();
                if self.eat(')') {
                    if depth == 0 {
                        self.state.range.restore();
                        return Some(TokenType::Comment);
                    }
                    depth -= 1;
                }
            } else {
                self.bump();
            }
        }
    }

    fn state_xqdoc_comment_marker(&mut self) -> Option<TokenType> {
        self.state.set_state(Self::STATE_COMMENT);
        if self.eat('~') { Some(TokenType::XQDocCommentMarker) } else { self.state_comment() }
    }

    fn pragma_end(&mut self) -> Option<TokenType> {
        self.state.range.save();
        if self.eat('#') && self.eat(')') {
            self.state.pop_state();
            return Some(TokenType::PragmaEnd);
        }
        self.state.range.restore();
        None
    }

    fn state_pragma_qname(&mut self, pre_qname: bool) -> Option<TokenType> {
        if let Some(end) = self.pragma_end() {
            return Some(end);
        }
        let token = match self.class() {
            CharacterClass::EndOfBuffer => return None,
            CharacterClass::Whitespace => {
                self.eat_while(|c| c == CharacterClass::Whitespace);
                if !pre_qname {
                    self.state.set_state(Self::STATE_PRAGMA_CONTENTS);
                }
                TokenType::WhiteSpace
            }
            CharacterClass::NameStartChar => {
                self.ncname();
                TokenType::NCName
            }
            CharacterClass::Colon => {
                self.bump();
                TokenType::QNameSeparator
            }
            _ => {
                self.bump();
                TokenType::BadCharacter
            }
        };
        if pre_qname && token != TokenType::WhiteSpace {
            self.state.set_state(Self::STATE_PRAGMA_QNAME);
        }
        Some(token)
    }

    fn state_pragma_contents(&mut self) -> Option<TokenType> {
        if let Some(end) = self.pragma_end() {
            return Some(end);
        }
        if self.cp() == END_OF_BUFFER {
            return None;
        }
        loop {
            let c = self.cp();
            if c == END_OF_BUFFER {
                break;
            }
            if c == cp('#') {
                self.state.range.save();
                self.bump();
                if self.eat(')') {
                    self.state.range.restore();
                    break;
                }
            } else {
                self.bump();
            }
        }
        Some(TokenType::PragmaContents)
    }
}

impl Lexer for XPathLexer {
    fn start(&mut self, buffer: Arc<[u16]>, start: usize, end: usize, initial_state: u32) {
        self.state.start(buffer, start, end, initial_state);
        self.advance();
    }

    fn advance(&mut self) {
        let token = match self.state.begin_token() {
            Self::STATE_STRING_LITERAL_QUOTE => self.state_string('"'),
            Self::STATE_STRING_LITERAL_APOSTROPHE => self.state_string('\''),
            Self::STATE_COMMENT => self.state_comment(),
            Self::STATE_PRAGMA_PRE_QNAME => self.state_pragma_qname(true),
            Self::STATE_PRAGMA_QNAME => self.state_pragma_qname(false),
            Self::STATE_PRAGMA_CONTENTS => self.state_pragma_contents(),
            Self::STATE_BRACED_URI_LITERAL => self.state_braced_uri(),
            Self::STATE_XQDOC_COMMENT_MARKER => self.state_xqdoc_comment_marker(),
            _ => self.state_default(),
        };
        self.state.token = token;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_point_range::utf16;

    fn kinds(text: &str) -> Vec<TokenType> {
        let buffer = utf16(text);
        let len = buffer.len();
        let mut lexer = XPathLexer::new();
        lexer.start(buffer, 0, len, XPathLexer::STATE_DEFAULT);
        lexer.tokens().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(kinds("").is_empty());
    }

    #[test]
    fn state_reports_the_state_the_token_started_in() {
        let buffer = utf16("'a'");
        let mut lexer = XPathLexer::new();
        lexer.start(buffer, 0, 3, XPathLexer::STATE_DEFAULT);
        assert_eq!(lexer.state(), XPathLexer::STATE_DEFAULT);
        lexer.advance();
        assert_eq!(lexer.token_type(), Some(TokenType::StringLiteralContents));
        assert_eq!(lexer.state(), XPathLexer::STATE_STRING_LITERAL_APOSTROPHE);
        lexer.advance();
        assert_eq!(lexer.token_type(), Some(TokenType::StringLiteralEnd));
        lexer.advance();
        assert_eq!(lexer.token_type(), None);
    }

    #[test]
    fn exponent_followed_by_a_name_backtracks() {
        assert_eq!(kinds("1else"), [TokenType::IntegerLiteral, TokenType::Keyword(Keyword::Else)]);
    }
}
