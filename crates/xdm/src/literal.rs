//! Conversion of literal tokens into atomic values.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use xqkit_lexer::{Lexer, TokenType, XPathLexer, utf16};

use crate::error::{Error, ErrorCode};
use crate::values::{XsDecimal, XsDouble, XsInteger, XsString};

/// Which language's string literal rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringSyntax {
    /// Only doubled delimiters are escapes.
    XPath,
    /// Doubled delimiters plus predefined entity and character references.
    XQuery,
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn out_of_range(
    kind: &str,
    text: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::from_code(ErrorCode::FOAR0002, format!("{kind} literal '{text}' out of range"))
        .with_source(Some(Arc::new(source) as Arc<dyn std::error::Error + Send + Sync>))
}

/// `digits? ('.' digits?)?` with at least one digit, rewritten as `digits.digits`.
fn normalize_decimal(text: &str) -> Option<String> {
    let (int, frac) = text.split_once('.').unwrap_or((text, ""));
    let valid = |part: &str| part.is_empty() || is_digits(part);
    if !valid(int) || !valid(frac) || (int.is_empty() && frac.is_empty()) {
        return None;
    }
    let or_zero = |part: &str| if part.is_empty() { "0".to_string() } else { part.to_string() };
    Some(format!("{}.{}", or_zero(int), or_zero(frac)))
}

pub fn integer_literal(text: &str) -> Result<XsInteger, Error> {
    if !is_digits(text) {
        return Err(Error::from_code(
            ErrorCode::FORG0001,
            format!("invalid integer literal '{text}'"),
        ));
    }
    let value = text.parse::<i128>().map_err(|e| out_of_range("integer", text, e))?;
    Ok(XsInteger::new(value))
}

pub fn decimal_literal(text: &str) -> Result<XsDecimal, Error> {
    let normalized = normalize_decimal(text).ok_or_else(|| {
        Error::from_code(ErrorCode::FORG0001, format!("invalid decimal literal '{text}'"))
    })?;
    let value = Decimal::from_str(&normalized).map_err(|e| out_of_range("decimal", text, e))?;
    Ok(XsDecimal::new(value))
}

pub fn double_literal(text: &str) -> Result<XsDouble, Error> {
    let invalid =
        || Error::from_code(ErrorCode::FORG0001, format!("invalid double literal '{text}'"));
    let (mantissa, exponent) = text.split_once(['e', 'E']).ok_or_else(invalid)?;
    let exponent_digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    if !is_digits(exponent_digits) {
        return Err(invalid());
    }
    let mantissa = normalize_decimal(mantissa).ok_or_else(invalid)?;
    let value = format!("{mantissa}e{exponent}").parse::<f64>().map_err(|_| invalid())?;
    if value.is_infinite() {
        return Err(Error::from_code(
            ErrorCode::FOAR0002,
            format!("double literal '{text}' out of range"),
        ));
    }
    Ok(XsDouble::new(value))
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn predefined_entity(reference: &str) -> Result<char, Error> {
    match reference {
        "&lt;" => Ok('<'),
        "&gt;" => Ok('>'),
        "&amp;" => Ok('&'),
        "&quot;" => Ok('"'),
        "&apos;" => Ok('\''),
        _ => Err(Error::from_code(
            ErrorCode::XPST0003,
            format!("unknown entity reference '{reference}'"),
        )),
    }
}

fn character_reference(reference: &str) -> Result<char, Error> {
    let body = reference
        .strip_prefix("&#")
        .and_then(|r| r.strip_suffix(';'))
        .filter(|b| !b.is_empty() && *b != "x")
        .ok_or_else(|| {
            Error::from_code(
                ErrorCode::XPST0003,
                format!("malformed character reference '{reference}'"),
            )
        })?;
    let code = match body.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => body.parse::<u32>(),
    };
    code.ok()
        .and_then(char::from_u32)
        .filter(|c| is_xml_char(*c))
        .ok_or_else(|| {
            Error::from_code(
                ErrorCode::XQST0090,
                format!("character reference '{reference}' does not denote an XML character"),
            )
        })
}

/// Decode a complete string literal (delimiters included).
///
/// Doubled delimiters become a single delimiter. With [`StringSyntax::XQuery`] entity and
/// character references are replaced; with [`StringSyntax::XPath`] they are kept verbatim.
pub fn unescape_string_literal(raw: &str, syntax: StringSyntax) -> Result<XsString, Error> {
    let buffer = utf16(raw);
    let mut lexer = XPathLexer::new();
    lexer.start(buffer.clone(), 0, buffer.len(), XPathLexer::STATE_DEFAULT);
    let tokens = lexer.tokens();
    let not_a_literal = || {
        Error::from_code(ErrorCode::XPST0003, format!("not a complete string literal: {raw}"))
    };
    let [first, inner @ .., last] = tokens.as_slice() else {
        return Err(not_a_literal());
    };
    if first.kind != TokenType::StringLiteralStart || last.kind != TokenType::StringLiteralEnd {
        return Err(not_a_literal());
    }
    let mut out = String::with_capacity(raw.len());
    for token in inner {
        let text = String::from_utf16_lossy(&buffer[token.start..token.end]);
        match (token.kind, syntax) {
            (TokenType::StringLiteralContents, _) => out.push_str(&text),
            (TokenType::EscapedCharacter, _) => out.push_str(&text[..1]),
            (
                TokenType::PredefinedEntityReference
                | TokenType::CharacterReference
                | TokenType::PartialEntityReference
                | TokenType::EmptyEntityReference,
                StringSyntax::XPath,
            ) => out.push_str(&text),
            (TokenType::PredefinedEntityReference, StringSyntax::XQuery) => {
                out.push(predefined_entity(&text)?);
            }
            (TokenType::CharacterReference, StringSyntax::XQuery) => {
                out.push(character_reference(&text)?);
            }
            (TokenType::PartialEntityReference | TokenType::EmptyEntityReference, _) => {
                return Err(Error::from_code(
                    ErrorCode::XPST0003,
                    format!("incomplete entity reference '{text}'"),
                ));
            }
            _ => return Err(not_a_literal()),
        }
    }
    Ok(XsString::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("007", 7)]
    #[case("170141183460469231731687303715884105727", i128::MAX)]
    fn integers(#[case] text: &str, #[case] expected: i128) {
        assert_eq!(integer_literal(text).unwrap().data, expected);
    }

    #[rstest]
    #[case("170141183460469231731687303715884105728", ErrorCode::FOAR0002)]
    #[case("", ErrorCode::FORG0001)]
    #[case("1.0", ErrorCode::FORG0001)]
    #[case("-1", ErrorCode::FORG0001)]
    fn invalid_integers(#[case] text: &str, #[case] code: ErrorCode) {
        assert_eq!(integer_literal(text).unwrap_err().code_enum(), code);
    }

    #[rstest]
    #[case("1.5", "1.5")]
    #[case(".5", "0.5")]
    #[case("1.", "1")]
    #[case("12", "12")]
    fn decimals(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(decimal_literal(text).unwrap().data, Decimal::from_str(expected).unwrap());
    }

    #[rstest]
    #[case(".")]
    #[case("1.2.3")]
    #[case("a")]
    fn invalid_decimals(#[case] text: &str) {
        assert_eq!(decimal_literal(text).unwrap_err().code_enum(), ErrorCode::FORG0001);
    }

    #[rstest]
    #[case("1e5", 1e5)]
    #[case("1.5E-3", 1.5e-3)]
    #[case(".5e+2", 50.0)]
    #[case("2.e1", 20.0)]
    fn doubles(#[case] text: &str, #[case] expected: f64) {
        assert!((double_literal(text).unwrap().data - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case("1e", ErrorCode::FORG0001)]
    #[case("1e+", ErrorCode::FORG0001)]
    #[case("15", ErrorCode::FORG0001)]
    #[case("1e400", ErrorCode::FOAR0002)]
    fn invalid_doubles(#[case] text: &str, #[case] code: ErrorCode) {
        assert_eq!(double_literal(text).unwrap_err().code_enum(), code);
    }

    #[rstest]
    #[case("'it''s'", StringSyntax::XPath, "it's")]
    #[case("\"say \"\"hi\"\"\"", StringSyntax::XPath, "say \"hi\"")]
    #[case("'a &amp; b'", StringSyntax::XPath, "a &amp; b")]
    #[case("'a &amp; b'", StringSyntax::XQuery, "a & b")]
    #[case("'&lt;&gt;&quot;&apos;'", StringSyntax::XQuery, "<>\"'")]
    #[case("'&#65;&#x42;'", StringSyntax::XQuery, "AB")]
    #[case("'&#x1F600;'", StringSyntax::XQuery, "\u{1F600}")]
    #[case("''", StringSyntax::XQuery, "")]
    fn string_literals(#[case] raw: &str, #[case] syntax: StringSyntax, #[case] expected: &str) {
        assert_eq!(unescape_string_literal(raw, syntax).unwrap().data, expected);
    }

    #[rstest]
    #[case("'abc", ErrorCode::XPST0003)]
    #[case("abc", ErrorCode::XPST0003)]
    #[case("'a' 'b'", ErrorCode::XPST0003)]
    #[case("'&nbsp;'", ErrorCode::XPST0003)]
    #[case("'&amp'", ErrorCode::XPST0003)]
    #[case("'&;'", ErrorCode::XPST0003)]
    #[case("'&#0;'", ErrorCode::XQST0090)]
    #[case("'&#xD800;'", ErrorCode::XQST0090)]
    #[case("'&#x;'", ErrorCode::XPST0003)]
    fn invalid_string_literals(#[case] raw: &str, #[case] code: ErrorCode) {
        let err = unescape_string_literal(raw, StringSyntax::XQuery).unwrap_err();
        assert_eq!(err.code_enum(), code);
    }
}
