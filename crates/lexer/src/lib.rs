pub mod character_class;
pub mod code_point_range;
pub mod combined;
pub mod lexer;
pub mod token;
pub mod xpath;
pub mod xqdoc;

pub use character_class::{CharacterClass, is_name_char, is_name_start_char};
pub use code_point_range::{CodePointRange, END_OF_BUFFER, utf16};
pub use combined::{CombinedLexer, LEXER_MASK, STATE_MASK, XQDOC_LEXER};
pub use lexer::{Lexer, LexerState};
pub use token::{Keyword, Token, TokenType};
pub use xpath::XPathLexer;
pub use xqdoc::XQDocLexer;
