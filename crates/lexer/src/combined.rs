use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::lexer::Lexer;
use crate::token::TokenType;
use crate::xpath::XPathLexer;
use crate::xqdoc::XQDocLexer;

/// Bits of a combined state that belong to the active lexer.
pub const STATE_MASK: u32 = 0x0FFF_FFFF;
/// Bits of a combined state that identify the active sub-lexer (`0` = language lexer).
pub const LEXER_MASK: u32 = 0xF000_0000;

/// Combined-state id of the xqDoc sub-lexer installed by [`XPathLexer::with_xqdoc`].
pub const XQDOC_LEXER: u32 = 0x1000_0000;

struct Transition {
    lexer: Box<dyn Lexer>,
    state: u32,
    parent_state: u32,
    child_state: u32,
    token: TokenType,
}

/// Lexer that hands regions of the input over to sub-lexers.
///
/// The language lexer runs until it produces one of the registered transition tokens. The
/// following tokens are then produced by the matching sub-lexer, starting right after the
/// transition token. Once the sub-lexer reports no token the language lexer resumes at that
/// position in the registered parent state.
///
/// [`state`](Lexer::state) packs the active sub-lexer id ([`LEXER_MASK`]) and that lexer's own
/// state ([`STATE_MASK`]) into one integer, so lexing can be resumed from any token.
pub struct CombinedLexer {
    language: Box<dyn Lexer>,
    transitions: Vec<Transition>,
    by_token: HashMap<TokenType, usize>,
    active: Option<usize>,
    buffer: Arc<[u16]>,
    end: usize,
}

impl CombinedLexer {
    pub fn new(language: Box<dyn Lexer>) -> Self {
        Self {
            language,
            transitions: Vec::new(),
            by_token: HashMap::new(),
            active: None,
            buffer: Arc::from(Vec::<u16>::new()),
            end: 0,
        }
    }

    /// Register `lexer` to take over after the language lexer emits `transition`.
    ///
    /// * `state` - the sub-lexer id stored in the [`LEXER_MASK`] bits; must be non-zero and
    ///   unique.
    /// * `parent_state` - language lexer state to resume in once the sub-lexer is exhausted.
    /// * `child_state` - initial state of the sub-lexer.
    ///
    /// # Panics
    ///
    /// If `state` is zero, has bits outside [`LEXER_MASK`], or is already registered.
    pub fn add_state(
        &mut self,
        lexer: Box<dyn Lexer>,
        state: u32,
        parent_state: u32,
        child_state: u32,
        transition: TokenType,
    ) {
        assert!(
            state != 0 && state & !LEXER_MASK == 0,
            "sub-lexer id {state:#x} outside LEXER_MASK"
        );
        assert!(
            self.transitions.iter().all(|t| t.state != state),
            "sub-lexer id {state:#x} registered twice"
        );
        self.by_token.insert(transition, self.transitions.len());
        self.transitions.push(Transition {
            lexer,
            state,
            parent_state: parent_state & STATE_MASK,
            child_state: child_state & STATE_MASK,
            token: transition,
        });
    }

    fn active_lexer(&self) -> &dyn Lexer {
        match self.active {
            Some(index) => self.transitions[index].lexer.as_ref(),
            None => self.language.as_ref(),
        }
    }

    fn enter(&mut self, index: usize, offset: usize, state: u32) {
        let transition = &mut self.transitions[index];
        trace!(state = transition.state, offset, "entering sub-lexer");
        transition.lexer.start(self.buffer.clone(), offset, self.end, state);
        self.active = Some(index);
        self.leave_if_exhausted();
    }

    fn leave_if_exhausted(&mut self) {
        let Some(index) = self.active else {
            return;
        };
        let transition = &self.transitions[index];
        if transition.lexer.token_type().is_some() {
            return;
        }
        let offset = transition.lexer.token_start();
        let parent_state = transition.parent_state;
        trace!(token = %transition.token, offset, "sub-lexer exhausted, resuming language lexer");
        self.active = None;
        self.language.start(self.buffer.clone(), offset, self.end, parent_state);
    }
}

impl Lexer for CombinedLexer {
    fn start(&mut self, buffer: Arc<[u16]>, start: usize, end: usize, initial_state: u32) {
        self.end = end.min(buffer.len());
        self.buffer = buffer;
        self.active = None;
        let mask = initial_state & LEXER_MASK;
        let inner = initial_state & STATE_MASK;
        if mask != 0
            && let Some(index) = self.transitions.iter().position(|t| t.state == mask)
        {
            self.enter(index, start, inner);
            return;
        }
        self.language.start(self.buffer.clone(), start, self.end, inner);
    }

    fn advance(&mut self) {
        if self.active.is_none()
            && let Some(kind) = self.language.token_type()
            && let Some(&index) = self.by_token.get(&kind)
        {
            let offset = self.language.token_end();
            let child_state = self.transitions[index].child_state;
            self.enter(index, offset, child_state);
            return;
        }
        match self.active {
            Some(index) => self.transitions[index].lexer.advance(),
            None => self.language.advance(),
        }
        self.leave_if_exhausted();
    }

    fn token_type(&self) -> Option<TokenType> {
        self.active_lexer().token_type()
    }

    fn token_start(&self) -> usize {
        self.active_lexer().token_start()
    }

    fn token_end(&self) -> usize {
        self.active_lexer().token_end()
    }

    fn state(&self) -> u32 {
        match self.active {
            Some(index) => {
                let transition = &self.transitions[index];
                transition.state | (transition.lexer.state() & STATE_MASK)
            }
            None => self.language.state() & STATE_MASK,
        }
    }

    fn buffer_end(&self) -> usize {
        self.end
    }
}

impl XPathLexer {
    /// XPath/XQuery lexer with xqDoc comment bodies handled by [`XQDocLexer`].
    pub fn with_xqdoc() -> CombinedLexer {
        let mut lexer = CombinedLexer::new(Box::new(XPathLexer::new()));
        lexer.add_state(
            Box::new(XQDocLexer::new()),
            XQDOC_LEXER,
            XPathLexer::STATE_COMMENT,
            XQDocLexer::STATE_LINE_START,
            TokenType::XQDocCommentMarker,
        );
        lexer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_point_range::utf16;

    #[test]
    #[should_panic(expected = "outside LEXER_MASK")]
    fn rejects_sub_lexer_ids_in_the_state_bits() {
        let mut lexer = CombinedLexer::new(Box::new(XPathLexer::new()));
        lexer.add_state(Box::new(XQDocLexer::new()), 0x10, 0, 0, TokenType::XQDocCommentMarker);
    }

    #[test]
    fn language_lexer_alone_behaves_like_the_plain_lexer() {
        let buffer = utf16("1 + 2");
        let mut combined = CombinedLexer::new(Box::new(XPathLexer::new()));
        combined.start(buffer.clone(), 0, 5, 0);
        let mut plain = XPathLexer::new();
        plain.start(buffer, 0, 5, 0);
        assert_eq!(combined.tokens(), plain.tokens());
    }
}
