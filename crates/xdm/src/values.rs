//! XDM atomic values.
//!
//! Every value pairs its payload with an [`Origin`]: a weak reference to the syntax node the
//! value was produced from. The origin is for diagnostics and navigation only; it never keeps
//! the node alive and never takes part in value comparison.

use core::fmt;
use std::ops::Range;
use std::sync::{Arc, Weak};

use rust_decimal::Decimal;
use xqkit_lexer::Token;

use crate::duration::XsDuration;
use crate::error::{Error, ErrorCode};
use crate::qname::{XsQName, is_ncname};

/// A syntax node values can point back to.
pub trait SyntaxOrigin: Send + Sync {
    /// UTF-16 offsets of the node in its source buffer.
    fn span(&self) -> Range<usize>;
}

impl SyntaxOrigin for Token {
    fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Non-owning back-reference to the syntax node a value came from.
#[derive(Clone, Default)]
pub struct Origin(Option<Weak<dyn SyntaxOrigin>>);

impl Origin {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn from_node(node: &Arc<dyn SyntaxOrigin>) -> Self {
        Self(Some(Arc::downgrade(node)))
    }

    /// The originating node, if one was recorded and it is still alive.
    pub fn upgrade(&self) -> Option<Arc<dyn SyntaxOrigin>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0, self.upgrade()) {
            (None, _) => f.write_str("Origin(none)"),
            (Some(_), Some(node)) => write!(f, "Origin({:?})", node.span()),
            (Some(_), None) => f.write_str("Origin(dropped)"),
        }
    }
}

// Origins are not part of a value's identity.
impl PartialEq for Origin {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

macro_rules! atomic_value {
    ($(#[$meta:meta])* $name:ident($payload:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub data: $payload,
            pub origin: Origin,
        }

        impl $name {
            pub fn with_origin(mut self, origin: Origin) -> Self {
                self.origin = origin;
                self
            }
        }
    };
}

atomic_value!(
    /// `xs:string`
    XsString(String)
);
atomic_value!(
    /// `xs:untypedAtomic`
    XsUntypedAtomic(String)
);
atomic_value!(
    /// `xs:decimal`
    XsDecimal(Decimal)
);
atomic_value!(
    /// `xs:integer`
    XsInteger(i128)
);
atomic_value!(
    /// `xs:double`
    XsDouble(f64)
);
atomic_value!(
    /// `xs:NCName`; the payload is always a valid NCName.
    XsNCName(String)
);

impl XsString {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into(), origin: Origin::none() }
    }
}

impl XsUntypedAtomic {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into(), origin: Origin::none() }
    }
}

impl XsDecimal {
    pub fn new(data: Decimal) -> Self {
        Self { data, origin: Origin::none() }
    }
}

impl XsInteger {
    pub fn new(data: i128) -> Self {
        Self { data, origin: Origin::none() }
    }
}

impl XsDouble {
    pub fn new(data: f64) -> Self {
        Self { data, origin: Origin::none() }
    }
}

impl XsNCName {
    pub fn new(data: impl Into<String>) -> Result<Self, Error> {
        let data = data.into();
        if !is_ncname(&data) {
            return Err(Error::from_code(ErrorCode::FORG0001, format!("invalid NCName '{data}'")));
        }
        Ok(Self { data, origin: Origin::none() })
    }
}

/// Role an `xs:anyURI` plays where it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriContext {
    NamespaceDeclaration,
    Location,
    Collation,
    BaseUri,
    Resource,
}

/// `xs:anyURI` together with the role it was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct XsAnyUri {
    pub data: String,
    pub context: UriContext,
    pub origin: Origin,
}

impl XsAnyUri {
    pub fn new(data: impl Into<String>, context: UriContext) -> Self {
        Self { data: data.into(), context, origin: Origin::none() }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Atomic types of the XSD hierarchy represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicType {
    AnyAtomicType,
    UntypedAtomic,
    String,
    NormalizedString,
    Token,
    Name,
    NCName,
    Decimal,
    Integer,
    Double,
    AnyUri,
    QName,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
}

impl AtomicType {
    const ALL: [AtomicType; 15] = [
        AtomicType::AnyAtomicType,
        AtomicType::UntypedAtomic,
        AtomicType::String,
        AtomicType::NormalizedString,
        AtomicType::Token,
        AtomicType::Name,
        AtomicType::NCName,
        AtomicType::Decimal,
        AtomicType::Integer,
        AtomicType::Double,
        AtomicType::AnyUri,
        AtomicType::QName,
        AtomicType::Duration,
        AtomicType::YearMonthDuration,
        AtomicType::DayTimeDuration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AtomicType::AnyAtomicType => "xs:anyAtomicType",
            AtomicType::UntypedAtomic => "xs:untypedAtomic",
            AtomicType::String => "xs:string",
            AtomicType::NormalizedString => "xs:normalizedString",
            AtomicType::Token => "xs:token",
            AtomicType::Name => "xs:Name",
            AtomicType::NCName => "xs:NCName",
            AtomicType::Decimal => "xs:decimal",
            AtomicType::Integer => "xs:integer",
            AtomicType::Double => "xs:double",
            AtomicType::AnyUri => "xs:anyURI",
            AtomicType::QName => "xs:QName",
            AtomicType::Duration => "xs:duration",
            AtomicType::YearMonthDuration => "xs:yearMonthDuration",
            AtomicType::DayTimeDuration => "xs:dayTimeDuration",
        }
    }

    /// Looks a type up by its `xs:` prefixed name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The base type this type is derived from by restriction.
    pub fn parent(self) -> Option<Self> {
        match self {
            AtomicType::AnyAtomicType => None,
            AtomicType::NormalizedString => Some(AtomicType::String),
            AtomicType::Token => Some(AtomicType::NormalizedString),
            AtomicType::Name => Some(AtomicType::Token),
            AtomicType::NCName => Some(AtomicType::Name),
            AtomicType::Integer => Some(AtomicType::Decimal),
            AtomicType::YearMonthDuration | AtomicType::DayTimeDuration => {
                Some(AtomicType::Duration)
            }
            AtomicType::UntypedAtomic
            | AtomicType::String
            | AtomicType::Decimal
            | AtomicType::Double
            | AtomicType::AnyUri
            | AtomicType::QName
            | AtomicType::Duration => Some(AtomicType::AnyAtomicType),
        }
    }

    /// `true` if `self` is `other` or derived from it.
    pub fn derives_from(self, other: AtomicType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == other {
                return true;
            }
            current = ty.parent();
        }
        false
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed set of atomic values.
#[derive(Debug, Clone, PartialEq)]
pub enum XsAnyAtomicType {
    String(XsString),
    UntypedAtomic(XsUntypedAtomic),
    Decimal(XsDecimal),
    Integer(XsInteger),
    Double(XsDouble),
    AnyUri(XsAnyUri),
    QName(XsQName),
    Duration(XsDuration),
    NCName(XsNCName),
}

impl XsAnyAtomicType {
    pub fn type_annotation(&self) -> AtomicType {
        match self {
            XsAnyAtomicType::String(_) => AtomicType::String,
            XsAnyAtomicType::UntypedAtomic(_) => AtomicType::UntypedAtomic,
            XsAnyAtomicType::Decimal(_) => AtomicType::Decimal,
            XsAnyAtomicType::Integer(_) => AtomicType::Integer,
            XsAnyAtomicType::Double(_) => AtomicType::Double,
            XsAnyAtomicType::AnyUri(_) => AtomicType::AnyUri,
            XsAnyAtomicType::QName(_) => AtomicType::QName,
            XsAnyAtomicType::Duration(d) => d.kind.atomic_type(),
            XsAnyAtomicType::NCName(_) => AtomicType::NCName,
        }
    }

    pub fn origin(&self) -> &Origin {
        match self {
            XsAnyAtomicType::String(v) => &v.origin,
            XsAnyAtomicType::UntypedAtomic(v) => &v.origin,
            XsAnyAtomicType::Decimal(v) => &v.origin,
            XsAnyAtomicType::Integer(v) => &v.origin,
            XsAnyAtomicType::Double(v) => &v.origin,
            XsAnyAtomicType::AnyUri(v) => &v.origin,
            XsAnyAtomicType::QName(v) => &v.origin,
            XsAnyAtomicType::Duration(v) => &v.origin,
            XsAnyAtomicType::NCName(v) => &v.origin,
        }
    }

    pub fn instance_of(&self, ty: AtomicType) -> bool {
        self.type_annotation().derives_from(ty)
    }
}

/// Canonical `xs:double` lexical form.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e6).contains(&magnitude) {
        return value.to_string();
    }
    let formatted = format!("{value:E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => formatted,
    }
}

impl fmt::Display for XsAnyAtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XsAnyAtomicType::String(v) => f.write_str(&v.data),
            XsAnyAtomicType::UntypedAtomic(v) => f.write_str(&v.data),
            XsAnyAtomicType::Decimal(v) => write!(f, "{}", v.data.normalize()),
            XsAnyAtomicType::Integer(v) => write!(f, "{}", v.data),
            XsAnyAtomicType::Double(v) => f.write_str(&format_double(v.data)),
            XsAnyAtomicType::AnyUri(v) => f.write_str(&v.data),
            XsAnyAtomicType::QName(v) => write!(f, "{v}"),
            XsAnyAtomicType::Duration(v) => write!(f, "{v}"),
            XsAnyAtomicType::NCName(v) => f.write_str(&v.data),
        }
    }
}

macro_rules! impl_from_value {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for XsAnyAtomicType {
                fn from(value: $ty) -> Self {
                    XsAnyAtomicType::$variant(value)
                }
            }
        )+
    };
}

impl_from_value!(
    String(XsString),
    UntypedAtomic(XsUntypedAtomic),
    Decimal(XsDecimal),
    Integer(XsInteger),
    Double(XsDouble),
    AnyUri(XsAnyUri),
    QName(XsQName),
    Duration(XsDuration),
    NCName(XsNCName),
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AtomicType::Integer, AtomicType::Decimal, true)]
    #[case(AtomicType::Integer, AtomicType::AnyAtomicType, true)]
    #[case(AtomicType::NCName, AtomicType::String, true)]
    #[case(AtomicType::DayTimeDuration, AtomicType::Duration, true)]
    #[case(AtomicType::Decimal, AtomicType::Integer, false)]
    #[case(AtomicType::Double, AtomicType::Decimal, false)]
    #[case(AtomicType::UntypedAtomic, AtomicType::String, false)]
    fn derivation(#[case] ty: AtomicType, #[case] base: AtomicType, #[case] expected: bool) {
        assert_eq!(ty.derives_from(base), expected);
    }

    #[rstest]
    fn type_names_round_trip() {
        for ty in AtomicType::ALL {
            assert_eq!(AtomicType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(AtomicType::from_name("xs:float"), None);
    }

    #[rstest]
    #[case(1.0, "1")]
    #[case(0.5, "0.5")]
    #[case(1e7, "1.0E7")]
    #[case(1.5e-7, "1.5E-7")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::NEG_INFINITY, "-INF")]
    #[case(-0.0, "-0")]
    fn double_formatting(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_double(value), expected);
    }

    #[rstest]
    fn origin_does_not_keep_the_node_alive() {
        let node: Arc<dyn SyntaxOrigin> = Arc::new(Token {
            kind: xqkit_lexer::TokenType::IntegerLiteral,
            start: 3,
            end: 5,
        });
        let value = XsInteger::new(12).with_origin(Origin::from_node(&node));
        assert_eq!(value.origin.upgrade().map(|n| n.span()), Some(3..5));
        drop(node);
        assert!(value.origin.is_set());
        assert!(value.origin.upgrade().is_none());
    }

    #[rstest]
    fn equality_ignores_origin() {
        let node: Arc<dyn SyntaxOrigin> =
            Arc::new(Token { kind: xqkit_lexer::TokenType::NCName, start: 0, end: 1 });
        let a = XsString::new("a").with_origin(Origin::from_node(&node));
        let b = XsString::new("a");
        assert_eq!(a, b);
        assert_ne!(XsAnyAtomicType::from(a), XsAnyAtomicType::from(XsUntypedAtomic::new("a")));
    }

    #[rstest]
    #[case(UriContext::NamespaceDeclaration, "urn:example")]
    #[case(UriContext::Location, "lib/module.xq")]
    #[case(UriContext::Collation, "http://www.w3.org/2005/xpath-functions/collation/codepoint")]
    #[case(UriContext::BaseUri, "http://example.com/base/")]
    #[case(UriContext::Resource, "data.xml")]
    fn any_uri_keeps_its_context(#[case] context: UriContext, #[case] uri: &str) {
        let kind = xqkit_lexer::TokenType::StringLiteralContents;
        let node: Arc<dyn SyntaxOrigin> = Arc::new(Token { kind, start: 1, end: 4 });
        let located = XsAnyUri::new(uri, context).with_origin(Origin::from_node(&node));
        assert_eq!(located.context, context);
        assert_eq!(located, XsAnyUri::new(uri, context));

        let value = XsAnyAtomicType::from(located);
        assert_eq!(value.type_annotation(), AtomicType::AnyUri);
        assert_eq!(value.type_annotation().to_string(), "xs:anyURI");
        assert!(value.instance_of(AtomicType::AnyAtomicType));
        assert!(!value.instance_of(AtomicType::String));
        assert_eq!(value.to_string(), uri);
        assert_eq!(value.origin().upgrade().map(|n| n.span()), Some(1..4));
    }

    #[rstest]
    fn any_uri_equality_depends_on_the_context() {
        let declared = XsAnyUri::new("urn:a", UriContext::NamespaceDeclaration);
        assert_ne!(declared, XsAnyUri::new("urn:a", UriContext::Location));
        assert_ne!(declared, XsAnyUri::new("urn:b", UriContext::NamespaceDeclaration));
    }

    #[rstest]
    fn ncname_validation() {
        assert!(XsNCName::new("item-1").is_ok());
        let err = XsNCName::new("a:b").unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::FORG0001);
        assert!(XsNCName::new("1a").is_err());
    }
}
