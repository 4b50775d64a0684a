//! Codepoint classification driving the lexer dispatch loops.
//!
//! ASCII is classified with a lookup table; everything above uses the XML 1.0 (fifth edition)
//! `NameStartChar` / `NameChar` ranges.

use crate::code_point_range::END_OF_BUFFER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CharacterClass {
    Invalid = 0,
    Whitespace,
    Digit,
    NameStartChar,
    /// Characters that may continue but not start a name (excluding `-` and `.`).
    NameChar,
    Dot,
    HyphenMinus,
    Colon,
    Quote,
    Apostrophe,
    Semicolon,
    Hash,
    ParenthesisOpen,
    ParenthesisClose,
    CurlyBraceOpen,
    CurlyBraceClose,
    SquareBracketOpen,
    SquareBracketClose,
    Plus,
    Star,
    Comma,
    QuestionMark,
    AtSign,
    Dollar,
    ForwardSlash,
    VerticalBar,
    ExclamationMark,
    Ampersand,
    Percent,
    LessThan,
    GreaterThan,
    Equal,
    BackSlash,
    CircumflexAccent,
    Tilde,
    BackTick,
    EndOfBuffer,
}

use CharacterClass as C;

#[rustfmt::skip]
static ASCII: [CharacterClass; 128] = [
    // 0x00 - 0x0F
    C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid,
    C::Invalid, C::Whitespace, C::Whitespace, C::Invalid, C::Invalid, C::Whitespace, C::Invalid, C::Invalid,
    // 0x10 - 0x1F
    C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid,
    C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid, C::Invalid,
    // 0x20 - 0x2F:   ! " # $ % & ' ( ) * + , - . /
    C::Whitespace, C::ExclamationMark, C::Quote, C::Hash, C::Dollar, C::Percent, C::Ampersand, C::Apostrophe,
    C::ParenthesisOpen, C::ParenthesisClose, C::Star, C::Plus, C::Comma, C::HyphenMinus, C::Dot, C::ForwardSlash,
    // 0x30 - 0x3F: 0-9 : ; < = > ?
    C::Digit, C::Digit, C::Digit, C::Digit, C::Digit, C::Digit, C::Digit, C::Digit,
    C::Digit, C::Digit, C::Colon, C::Semicolon, C::LessThan, C::Equal, C::GreaterThan, C::QuestionMark,
    // 0x40 - 0x4F: @ A-O
    C::AtSign, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar,
    C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar,
    // 0x50 - 0x5F: P-Z [ \ ] ^ _
    C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar,
    C::NameStartChar, C::NameStartChar, C::NameStartChar, C::SquareBracketOpen, C::BackSlash, C::SquareBracketClose, C::CircumflexAccent, C::NameStartChar,
    // 0x60 - 0x6F: ` a-o
    C::BackTick, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar,
    C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar,
    // 0x70 - 0x7F: p-z { | } ~ DEL
    C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar, C::NameStartChar,
    C::NameStartChar, C::NameStartChar, C::NameStartChar, C::CurlyBraceOpen, C::VerticalBar, C::CurlyBraceClose, C::Tilde, C::Invalid,
];

impl CharacterClass {
    /// Classify a codepoint as returned by
    /// [`CodePointRange::code_point`](crate::CodePointRange::code_point).
    pub fn of(cp: i32) -> Self {
        match cp {
            END_OF_BUFFER => C::EndOfBuffer,
            0x00..=0x7F => ASCII[cp as usize],
            0xC0..=0xD6
            | 0xD8..=0xF6
            | 0xF8..=0x2FF
            | 0x370..=0x37D
            | 0x37F..=0x1FFF
            | 0x200C..=0x200D
            | 0x2070..=0x218F
            | 0x2C00..=0x2FEF
            | 0x3001..=0xD7FF
            | 0xF900..=0xFDCF
            | 0xFDF0..=0xFFFD
            | 0x10000..=0xEFFFF => C::NameStartChar,
            0xB7 | 0x300..=0x36F | 0x203F..=0x2040 => C::NameChar,
            _ => C::Invalid,
        }
    }

    /// Whether the class may start an `NCName`.
    pub fn is_name_start(self) -> bool {
        self == C::NameStartChar
    }

    /// Whether the class may continue an `NCName`.
    pub fn is_name(self) -> bool {
        matches!(self, C::NameStartChar | C::NameChar | C::Digit | C::Dot | C::HyphenMinus)
    }
}

/// XML `NameStartChar` without the colon, i.e. the first character of an `NCName`.
pub fn is_name_start_char(cp: i32) -> bool {
    CharacterClass::of(cp).is_name_start()
}

/// XML `NameChar` without the colon.
pub fn is_name_char(cp: i32) -> bool {
    CharacterClass::of(cp).is_name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(' ', CharacterClass::Whitespace)]
    #[case('\t', CharacterClass::Whitespace)]
    #[case('\n', CharacterClass::Whitespace)]
    #[case('\r', CharacterClass::Whitespace)]
    #[case('7', CharacterClass::Digit)]
    #[case('a', CharacterClass::NameStartChar)]
    #[case('Z', CharacterClass::NameStartChar)]
    #[case('_', CharacterClass::NameStartChar)]
    #[case(':', CharacterClass::Colon)]
    #[case('-', CharacterClass::HyphenMinus)]
    #[case('.', CharacterClass::Dot)]
    #[case('(', CharacterClass::ParenthesisOpen)]
    #[case('}', CharacterClass::CurlyBraceClose)]
    #[case('~', CharacterClass::Tilde)]
    #[case('`', CharacterClass::BackTick)]
    #[case('\u{0}', CharacterClass::Invalid)]
    #[case('\u{7F}', CharacterClass::Invalid)]
    fn ascii_table(#[case] c: char, #[case] expected: CharacterClass) {
        assert_eq!(CharacterClass::of(c as i32), expected);
    }

    #[rstest]
    #[case(0xC0, CharacterClass::NameStartChar)]
    #[case(0xD7, CharacterClass::Invalid)]
    #[case(0xB7, CharacterClass::NameChar)]
    #[case(0x0301, CharacterClass::NameChar)]
    #[case(0x203F, CharacterClass::NameChar)]
    #[case(0x3042, CharacterClass::NameStartChar)]
    #[case(0x1F600, CharacterClass::NameStartChar)]
    #[case(0xD800, CharacterClass::Invalid)]
    #[case(0xDFFF, CharacterClass::Invalid)]
    #[case(0xFFFE, CharacterClass::Invalid)]
    #[case(0xFFFF, CharacterClass::Invalid)]
    #[case(0xF0000, CharacterClass::Invalid)]
    #[case(0x11_0000, CharacterClass::Invalid)]
    #[case(END_OF_BUFFER, CharacterClass::EndOfBuffer)]
    fn non_ascii_ranges(#[case] cp: i32, #[case] expected: CharacterClass) {
        assert_eq!(CharacterClass::of(cp), expected);
    }

    #[test]
    fn name_helpers_follow_xml_productions() {
        assert!(is_name_start_char('x' as i32));
        assert!(!is_name_start_char('1' as i32));
        assert!(!is_name_start_char(':' as i32));
        assert!(is_name_char('1' as i32));
        assert!(is_name_char('-' as i32));
        assert!(is_name_char('.' as i32));
        assert!(is_name_char(0xB7));
        assert!(!is_name_char(':' as i32));
        assert!(!is_name_char(END_OF_BUFFER));
    }
}
