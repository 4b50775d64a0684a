use core::fmt;

use tracing::debug;
use xqkit_lexer::{is_name_char, is_name_start_char};

use crate::context::StaticContext;
use crate::error::{Error, ErrorCode};
use crate::values::Origin;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self { ns_uri, local: local.into() }
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// `true` if `s` matches the XML `NCName` production.
pub fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars().map(|c| c as i32);
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

/// How an unprefixed name picks up its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// Element names and type names take the default element/type namespace.
    Element,
    Type,
    /// Function names take the default function namespace.
    Function,
    /// Attribute and variable names stay in no namespace.
    Attribute,
    Variable,
}

/// `xs:QName`, either as written (lexical) or with its namespace resolved (expanded).
#[derive(Debug, Clone)]
pub struct XsQName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    /// `true` while the namespace has not been resolved from the prefix.
    pub is_lexical: bool,
    pub origin: Origin,
}

impl XsQName {
    pub fn lexical(prefix: Option<&str>, local_name: &str) -> Self {
        Self {
            namespace: None,
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            is_lexical: true,
            origin: Origin::none(),
        }
    }

    pub fn expanded(namespace: Option<&str>, prefix: Option<&str>, local_name: &str) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            is_lexical: false,
            origin: Origin::none(),
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// The expanded name, available once the namespace is resolved.
    pub fn expanded_name(&self) -> Option<ExpandedName> {
        (!self.is_lexical).then(|| ExpandedName::new(self.namespace.clone(), &self.local_name))
    }

    /// `Q{ns}local` for expanded names, the lexical form otherwise.
    pub fn eqname(&self) -> String {
        match self.expanded_name() {
            Some(name) => format!("Q{{{}}}{}", name.ns_uri.unwrap_or_default(), name.local),
            None => self.to_string(),
        }
    }

    /// Resolve the namespace of a lexical name against `ctx`.
    ///
    /// Prefixed names look the prefix up in the in-scope namespaces (`XPST0081` if it is not
    /// bound). Unprefixed names take the default namespace that applies to `kind`. Names that
    /// are already expanded are returned unchanged.
    pub fn expand(&self, ctx: &StaticContext, kind: NameKind) -> Result<XsQName, Error> {
        if !self.is_lexical {
            return Ok(self.clone());
        }
        let namespace = match &self.prefix {
            Some(prefix) => match ctx.resolve_prefix(prefix) {
                Some(ns) => Some(ns.to_string()),
                None => {
                    debug!(prefix, local = %self.local_name, "undeclared namespace prefix");
                    return Err(Error::from_code(
                        ErrorCode::XPST0081,
                        format!("namespace prefix '{prefix}' is not declared"),
                    ));
                }
            },
            None => match kind {
                NameKind::Element | NameKind::Type => ctx.default_element_namespace.clone(),
                NameKind::Function => ctx.default_function_namespace.clone(),
                NameKind::Attribute | NameKind::Variable => None,
            },
        };
        Ok(XsQName::expanded(namespace.as_deref(), self.prefix.as_deref(), &self.local_name)
            .with_origin(self.origin.clone()))
    }
}

/// QName equality.
///
/// Local names must match. Two lexical names compare by prefix; as soon as either side is
/// expanded the namespaces are compared by value and prefixes are ignored.
pub fn qname_equal(a: &XsQName, b: &XsQName) -> bool {
    if a.local_name != b.local_name {
        return false;
    }
    if a.is_lexical && b.is_lexical {
        a.prefix == b.prefix
    } else {
        a.namespace == b.namespace
    }
}

impl PartialEq for XsQName {
    fn eq(&self, other: &Self) -> bool {
        qname_equal(self, other)
    }
}

impl fmt::Display for XsQName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.prefix, &self.namespace) {
            (Some(prefix), _) => write!(f, "{prefix}:{}", self.local_name),
            (None, Some(ns)) if !self.is_lexical => write!(f, "Q{{{ns}}}{}", self.local_name),
            _ => f.write_str(&self.local_name),
        }
    }
}

fn invalid_qname(lexical: &str) -> Error {
    Error::from_code(ErrorCode::FOCA0002, format!("invalid QName '{lexical}'"))
}

/// Parse `NCName`, `prefix:NCName` or `Q{uri}NCName`.
///
/// The first two forms produce lexical names, the URI-qualified form an expanded one.
pub fn parse_qname(lexical: &str) -> Result<XsQName, Error> {
    if let Some(rest) = lexical.strip_prefix("Q{") {
        let (uri, local) = rest.split_once('}').ok_or_else(|| invalid_qname(lexical))?;
        if uri.contains('{') || !is_ncname(local) {
            return Err(invalid_qname(lexical));
        }
        return Ok(XsQName::expanded(Some(uri), None, local));
    }
    match lexical.split_once(':') {
        Some((prefix, local)) if is_ncname(prefix) && is_ncname(local) => {
            Ok(XsQName::lexical(Some(prefix), local))
        }
        None if is_ncname(lexical) => Ok(XsQName::lexical(None, lexical)),
        _ => Err(invalid_qname(lexical)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticContextBuilder;
    use rstest::rstest;

    fn lexical(prefix: Option<&str>, local: &str) -> XsQName {
        XsQName::lexical(prefix, local)
    }

    fn expanded(ns: Option<&str>, prefix: Option<&str>, local: &str) -> XsQName {
        XsQName::expanded(ns, prefix, local)
    }

    #[rstest]
    #[case(lexical(None, "a"), lexical(None, "a"), true)]
    #[case(lexical(None, "a"), lexical(None, "b"), false)]
    #[case(lexical(Some("p"), "a"), lexical(Some("p"), "a"), true)]
    #[case(lexical(Some("p"), "a"), lexical(Some("q"), "a"), false)]
    #[case(lexical(Some("p"), "a"), lexical(None, "a"), false)]
    #[case(expanded(Some("urn:x"), Some("p"), "a"), expanded(Some("urn:x"), Some("q"), "a"), true)]
    #[case(expanded(Some("urn:x"), None, "a"), expanded(Some("urn:y"), None, "a"), false)]
    #[case(expanded(None, None, "a"), expanded(None, Some("p"), "a"), true)]
    #[case(expanded(Some("urn:x"), None, "a"), expanded(None, None, "a"), false)]
    #[case(expanded(Some("urn:x"), None, "a"), expanded(Some("urn:x"), None, "b"), false)]
    #[case(lexical(Some("p"), "a"), expanded(None, Some("p"), "a"), true)]
    #[case(lexical(Some("p"), "a"), expanded(Some("urn:x"), Some("p"), "a"), false)]
    fn equality(#[case] a: XsQName, #[case] b: XsQName, #[case] expected: bool) {
        assert_eq!(qname_equal(&a, &b), expected);
        assert_eq!(qname_equal(&b, &a), expected);
    }

    #[rstest]
    #[case("a", None, "a", true)]
    #[case("p:a", Some("p"), "a", true)]
    #[case("Q{urn:x}a", None, "a", false)]
    #[case("Q{}a", None, "a", false)]
    fn parses(
        #[case] text: &str,
        #[case] prefix: Option<&str>,
        #[case] local: &str,
        #[case] is_lexical: bool,
    ) {
        let name = parse_qname(text).unwrap();
        assert_eq!(name.prefix.as_deref(), prefix);
        assert_eq!(name.local_name, local);
        assert_eq!(name.is_lexical, is_lexical);
    }

    #[rstest]
    #[case("")]
    #[case(":a")]
    #[case("a:")]
    #[case("a:b:c")]
    #[case("1a")]
    #[case("Q{urn:x")]
    #[case("Q{urn:x}p:a")]
    #[case("a b")]
    fn rejects(#[case] text: &str) {
        assert_eq!(parse_qname(text).unwrap_err().code_enum(), ErrorCode::FOCA0002);
    }

    #[rstest]
    fn empty_braced_uri_means_no_namespace() {
        let name = parse_qname("Q{}a").unwrap();
        assert_eq!(name.namespace, None);
        assert_eq!(name.to_string(), "a");
        assert_eq!(name.eqname(), "Q{}a");
    }

    #[rstest]
    #[case(NameKind::Element, Some("urn:elements"))]
    #[case(NameKind::Type, Some("urn:elements"))]
    #[case(NameKind::Function, Some(crate::consts::FNS))]
    #[case(NameKind::Attribute, None)]
    #[case(NameKind::Variable, None)]
    fn unprefixed_names_take_the_default_namespace(
        #[case] kind: NameKind,
        #[case] expected: Option<&str>,
    ) {
        let ctx =
            StaticContextBuilder::new().with_default_element_namespace("urn:elements").build();
        let name = lexical(None, "a").expand(&ctx, kind).unwrap();
        assert!(!name.is_lexical);
        assert_eq!(name.namespace.as_deref(), expected);
    }

    #[rstest]
    fn prefixed_names_use_the_namespace_bindings() {
        let ctx = StaticContextBuilder::new().with_namespace("p", "urn:p").build();
        let name = lexical(Some("p"), "a").expand(&ctx, NameKind::Element).unwrap();
        assert_eq!(name.namespace.as_deref(), Some("urn:p"));
        assert_eq!(name.to_string(), "p:a");
        assert_eq!(name.eqname(), "Q{urn:p}a");

        let err = lexical(Some("q"), "a").expand(&ctx, NameKind::Element).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPST0081);
    }

    #[rstest]
    fn expansion_changes_equality() {
        let ctx = StaticContextBuilder::new()
            .with_namespace("p", "urn:same")
            .with_namespace("q", "urn:same")
            .build();
        let a = lexical(Some("p"), "a");
        let b = lexical(Some("q"), "a");
        assert_ne!(a, b);
        let a = a.expand(&ctx, NameKind::Element).unwrap();
        let b = b.expand(&ctx, NameKind::Element).unwrap();
        assert_eq!(a, b);
    }
}
