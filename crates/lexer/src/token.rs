use core::fmt;

/// Reserved words recognised by [`XPathLexer`](crate::XPathLexer).
///
/// The lexer does not know the grammar, so every name matching one of these words is reported
/// as a keyword; the parser decides whether it is used as one or as an `NCName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    And,
    Array,
    As,
    Ascending,
    By,
    Case,
    Cast,
    Castable,
    Catch,
    Declare,
    Default,
    Descending,
    Div,
    Else,
    Eq,
    Every,
    Except,
    External,
    For,
    Function,
    Ge,
    Gt,
    Idiv,
    If,
    Import,
    In,
    Instance,
    Intersect,
    Is,
    Le,
    Let,
    Lt,
    Map,
    Mod,
    Module,
    Namespace,
    Ne,
    Of,
    Or,
    Order,
    Return,
    Satisfies,
    Some,
    Switch,
    Then,
    To,
    Treat,
    Try,
    Typeswitch,
    Union,
    Variable,
    Where,
}

impl Keyword {
    const ALL: &'static [(&'static str, Keyword)] = &[
        ("and", Keyword::And),
        ("array", Keyword::Array),
        ("as", Keyword::As),
        ("ascending", Keyword::Ascending),
        ("by", Keyword::By),
        ("case", Keyword::Case),
        ("cast", Keyword::Cast),
        ("castable", Keyword::Castable),
        ("catch", Keyword::Catch),
        ("declare", Keyword::Declare),
        ("default", Keyword::Default),
        ("descending", Keyword::Descending),
        ("div", Keyword::Div),
        ("else", Keyword::Else),
        ("eq", Keyword::Eq),
        ("every", Keyword::Every),
        ("except", Keyword::Except),
        ("external", Keyword::External),
        ("for", Keyword::For),
        ("function", Keyword::Function),
        ("ge", Keyword::Ge),
        ("gt", Keyword::Gt),
        ("idiv", Keyword::Idiv),
        ("if", Keyword::If),
        ("import", Keyword::Import),
        ("in", Keyword::In),
        ("instance", Keyword::Instance),
        ("intersect", Keyword::Intersect),
        ("is", Keyword::Is),
        ("le", Keyword::Le),
        ("let", Keyword::Let),
        ("lt", Keyword::Lt),
        ("map", Keyword::Map),
        ("mod", Keyword::Mod),
        ("module", Keyword::Module),
        ("namespace", Keyword::Namespace),
        ("ne", Keyword::Ne),
        ("of", Keyword::Of),
        ("or", Keyword::Or),
        ("order", Keyword::Order),
        ("return", Keyword::Return),
        ("satisfies", Keyword::Satisfies),
        ("some", Keyword::Some),
        ("switch", Keyword::Switch),
        ("then", Keyword::Then),
        ("to", Keyword::To),
        ("treat", Keyword::Treat),
        ("try", Keyword::Try),
        ("typeswitch", Keyword::Typeswitch),
        ("union", Keyword::Union),
        ("variable", Keyword::Variable),
        ("where", Keyword::Where),
    ];

    /// Look up a keyword by its (case-sensitive) spelling.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.binary_search_by(|(k, _)| (*k).cmp(name)).ok().map(|i| Self::ALL[i].1)
    }

    pub fn as_str(self) -> &'static str {
        Self::ALL.iter().find(|(_, k)| *k == self).map_or("", |(s, _)| s)
    }
}

/// Every token kind produced by the lexers in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    WhiteSpace,
    BadCharacter,

    CommentStartTag,
    Comment,
    CommentEndTag,
    PartialComment,

    XQDocCommentMarker,
    XQDocContents,
    XQDocTrim,
    XQDocTagMarker,
    XQDocTag,
    XQDocTaggedKeyword,
    XQDocWhiteSpace,
    XQDocVariableIndicator,
    XQDocNCName,

    StringLiteralStart,
    StringLiteralContents,
    StringLiteralEnd,
    EscapedCharacter,
    PredefinedEntityReference,
    CharacterReference,
    PartialEntityReference,
    EmptyEntityReference,

    BracedUriLiteralStart,
    BracedUriLiteralEnd,

    IntegerLiteral,
    DecimalLiteral,
    DoubleLiteral,
    PartialDoubleLiteralExponent,

    NCName,
    Keyword(Keyword),

    PragmaBegin,
    PragmaContents,
    PragmaEnd,

    VariableIndicator,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    NodeBefore,
    GreaterThan,
    GreaterThanOrEqual,
    NodeAfter,
    Concatenation,
    Union,
    MapOperator,
    DirectDescendants,
    AllDescendants,
    AxisSeparator,
    Assign,
    QNameSeparator,
    ParentSelector,
    ContextItem,
    AttributeSelector,
    Comma,
    ParenthesisOpen,
    ParenthesisClose,
    SquareOpen,
    SquareClose,
    BlockOpen,
    BlockClose,
    Plus,
    Minus,
    Star,
    Optional,
    ArrowOperator,
    FunctionRefOperator,
    Separator,
}

impl TokenType {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenType::WhiteSpace
                | TokenType::CommentStartTag
                | TokenType::Comment
                | TokenType::CommentEndTag
                | TokenType::PartialComment
                | TokenType::XQDocCommentMarker
                | TokenType::XQDocContents
                | TokenType::XQDocTrim
                | TokenType::XQDocTagMarker
                | TokenType::XQDocTag
                | TokenType::XQDocTaggedKeyword
                | TokenType::XQDocWhiteSpace
                | TokenType::XQDocVariableIndicator
                | TokenType::XQDocNCName
        )
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, TokenType::Keyword(_))
    }

    /// Tokens that belong to an xqDoc comment body.
    pub fn is_xqdoc(self) -> bool {
        matches!(
            self,
            TokenType::XQDocCommentMarker
                | TokenType::XQDocContents
                | TokenType::XQDocTrim
                | TokenType::XQDocTagMarker
                | TokenType::XQDocTag
                | TokenType::XQDocTaggedKeyword
                | TokenType::XQDocWhiteSpace
                | TokenType::XQDocVariableIndicator
                | TokenType::XQDocNCName
        )
    }

    /// Stable upper-case name used in diagnostics and tool output. Keywords report `KEYWORD`;
    /// their spelling is available through the [`Display`](fmt::Display) implementation.
    pub fn name(self) -> &'static str {
        match self {
            TokenType::WhiteSpace => "WHITE_SPACE",
            TokenType::BadCharacter => "BAD_CHARACTER",
            TokenType::CommentStartTag => "COMMENT_START_TAG",
            TokenType::Comment => "COMMENT",
            TokenType::CommentEndTag => "COMMENT_END_TAG",
            TokenType::PartialComment => "PARTIAL_COMMENT",
            TokenType::XQDocCommentMarker => "XQDOC_COMMENT_MARKER",
            TokenType::XQDocContents => "XQDOC_CONTENTS",
            TokenType::XQDocTrim => "XQDOC_TRIM",
            TokenType::XQDocTagMarker => "XQDOC_TAG_MARKER",
            TokenType::XQDocTag => "XQDOC_TAG",
            TokenType::XQDocTaggedKeyword => "XQDOC_TAGGED_KEYWORD",
            TokenType::XQDocWhiteSpace => "XQDOC_WHITE_SPACE",
            TokenType::XQDocVariableIndicator => "XQDOC_VARIABLE_INDICATOR",
            TokenType::XQDocNCName => "XQDOC_NCNAME",
            TokenType::StringLiteralStart => "STRING_LITERAL_START",
            TokenType::StringLiteralContents => "STRING_LITERAL_CONTENTS",
            TokenType::StringLiteralEnd => "STRING_LITERAL_END",
            TokenType::EscapedCharacter => "ESCAPED_CHARACTER",
            TokenType::PredefinedEntityReference => "PREDEFINED_ENTITY_REFERENCE",
            TokenType::CharacterReference => "CHARACTER_REFERENCE",
            TokenType::PartialEntityReference => "PARTIAL_ENTITY_REFERENCE",
            TokenType::EmptyEntityReference => "EMPTY_ENTITY_REFERENCE",
            TokenType::BracedUriLiteralStart => "BRACED_URI_LITERAL_START",
            TokenType::BracedUriLiteralEnd => "BRACED_URI_LITERAL_END",
            TokenType::IntegerLiteral => "INTEGER_LITERAL",
            TokenType::DecimalLiteral => "DECIMAL_LITERAL",
            TokenType::DoubleLiteral => "DOUBLE_LITERAL",
            TokenType::PartialDoubleLiteralExponent => "PARTIAL_DOUBLE_LITERAL_EXPONENT",
            TokenType::NCName => "NCNAME",
            TokenType::Keyword(_) => "KEYWORD",
            TokenType::PragmaBegin => "PRAGMA_BEGIN",
            TokenType::PragmaContents => "PRAGMA_CONTENTS",
            TokenType::PragmaEnd => "PRAGMA_END",
            TokenType::VariableIndicator => "VARIABLE_INDICATOR",
            TokenType::Equal => "EQUAL",
            TokenType::NotEqual => "NOT_EQUAL",
            TokenType::LessThan => "LESS_THAN",
            TokenType::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            TokenType::NodeBefore => "NODE_BEFORE",
            TokenType::GreaterThan => "GREATER_THAN",
            TokenType::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            TokenType::NodeAfter => "NODE_AFTER",
            TokenType::Concatenation => "CONCATENATION",
            TokenType::Union => "UNION",
            TokenType::MapOperator => "MAP_OPERATOR",
            TokenType::DirectDescendants => "DIRECT_DESCENDANTS",
            TokenType::AllDescendants => "ALL_DESCENDANTS",
            TokenType::AxisSeparator => "AXIS_SEPARATOR",
            TokenType::Assign => "ASSIGN",
            TokenType::QNameSeparator => "QNAME_SEPARATOR",
            TokenType::ParentSelector => "PARENT_SELECTOR",
            TokenType::ContextItem => "CONTEXT_ITEM",
            TokenType::AttributeSelector => "ATTRIBUTE_SELECTOR",
            TokenType::Comma => "COMMA",
            TokenType::ParenthesisOpen => "PARENTHESIS_OPEN",
            TokenType::ParenthesisClose => "PARENTHESIS_CLOSE",
            TokenType::SquareOpen => "SQUARE_OPEN",
            TokenType::SquareClose => "SQUARE_CLOSE",
            TokenType::BlockOpen => "BLOCK_OPEN",
            TokenType::BlockClose => "BLOCK_CLOSE",
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Star => "STAR",
            TokenType::Optional => "OPTIONAL",
            TokenType::ArrowOperator => "ARROW",
            TokenType::FunctionRefOperator => "FUNCTION_REF_OPERATOR",
            TokenType::Separator => "SEPARATOR",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Keyword(k) => write!(f, "K_{}", k.as_str().to_ascii_uppercase()),
            other => f.write_str(other.name()),
        }
    }
}

/// A token produced by [`Lexer::tokens`](crate::Lexer::tokens). Offsets are UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenType,
    pub start: usize,
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_is_sorted_for_binary_search() {
        assert!(Keyword::ALL.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn keyword_lookup_round_trips_spelling() {
        for (s, k) in Keyword::ALL {
            assert_eq!(Keyword::lookup(s), Some(*k));
            assert_eq!(k.as_str(), *s);
        }
        assert_eq!(Keyword::lookup("AND"), None);
        assert_eq!(Keyword::lookup("andx"), None);
    }

    #[test]
    fn display_spells_keywords() {
        assert_eq!(TokenType::Keyword(Keyword::Return).to_string(), "K_RETURN");
        assert_eq!(TokenType::NCName.to_string(), "NCNAME");
    }
}
