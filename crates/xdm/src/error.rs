use core::fmt;
use std::sync::Arc;

pub use crate::consts::ERR_NS;
use crate::qname::ExpandedName;

/// Error codes raised while converting lexical forms and resolving names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FOAR0002, // numeric overflow
    FOCA0002, // invalid lexical value (QName)
    FODT0002, // duration overflow
    FORG0001, // invalid lexical form / casting failure
    XPST0003, // syntax error
    XPST0008, // undeclared variable
    XPST0017, // unknown function or wrong arity
    XPST0081, // undeclared namespace prefix
    XQST0090, // character reference to a non-XML character
    // Fallback / unknown (kept last)
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FOAR0002 => "FOAR0002",
            ErrorCode::FOCA0002 => "FOCA0002",
            ErrorCode::FODT0002 => "FODT0002",
            ErrorCode::FORG0001 => "FORG0001",
            ErrorCode::XPST0003 => "XPST0003",
            ErrorCode::XPST0008 => "XPST0008",
            ErrorCode::XPST0017 => "XPST0017",
            ErrorCode::XPST0081 => "XPST0081",
            ErrorCode::XQST0090 => "XQST0090",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Returns the QName (ExpandedName) for this error code in [`ERR_NS`].
    pub fn qname(&self) -> ExpandedName {
        ExpandedName::new(Some(ERR_NS.to_string()), self.as_str())
    }

    /// Parses `err:LOCAL`; anything else is [`ErrorCode::Unknown`].
    pub fn from_code(s: &str) -> Self {
        match s.strip_prefix("err:") {
            Some("FOAR0002") => ErrorCode::FOAR0002,
            Some("FOCA0002") => ErrorCode::FOCA0002,
            Some("FODT0002") => ErrorCode::FODT0002,
            Some("FORG0001") => ErrorCode::FORG0001,
            Some("XPST0003") => ErrorCode::XPST0003,
            Some("XPST0008") => ErrorCode::XPST0008,
            Some("XPST0017") => ErrorCode::XPST0017,
            Some("XPST0081") => ErrorCode::XPST0081,
            Some("XQST0090") => ErrorCode::XQST0090,
            _ => ErrorCode::Unknown,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ExpandedName,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new_qname(code: ExpandedName, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), source: None }
    }

    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new_qname(code.qname(), msg)
    }

    pub fn code_enum(&self) -> ErrorCode {
        // Only ERR_NS codes map to the enum; others are Unknown.
        if self.code.ns_uri.as_deref() == Some(ERR_NS) {
            ErrorCode::from_code(&format!("err:{}", self.code.local))
        } else {
            ErrorCode::Unknown
        }
    }

    /// Format the code as `err:LOCAL`, `Q{ns}local` or a bare local name.
    pub fn format_code(&self) -> String {
        if self.code.ns_uri.as_deref() == Some(ERR_NS) {
            format!("err:{}", self.code.local)
        } else {
            self.code.to_string()
        }
    }

    /// Compose an error with a source cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    /// Parse an error code string (`err:XPST0003` or `Q{ns}local`) into an ExpandedName.
    pub fn parse_code(s: &str) -> ExpandedName {
        if let Some(rest) = s.strip_prefix("err:") {
            return ExpandedName::new(Some(ERR_NS.to_string()), rest);
        }
        if let Some((ns, local)) = s
            .strip_prefix('Q')
            .and_then(|t| t.strip_prefix('{'))
            .and_then(|t| t.split_once('}'))
        {
            return ExpandedName::new(Some(ns.to_string()), local);
        }
        ExpandedName::new(None, s)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.format_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::FOAR0002)]
    #[case(ErrorCode::FOCA0002)]
    #[case(ErrorCode::FODT0002)]
    #[case(ErrorCode::XPST0008)]
    #[case(ErrorCode::XPST0081)]
    #[case(ErrorCode::XQST0090)]
    fn code_enum_recovers_the_code(#[case] code: ErrorCode) {
        let err = Error::from_code(code, "boom");
        assert_eq!(err.code_enum(), code);
        assert_eq!(err.format_code(), format!("err:{}", code.as_str()));
    }

    #[rstest]
    fn foreign_codes_are_unknown() {
        let err = Error::new_qname(Error::parse_code("Q{urn:x}oops"), "custom");
        assert_eq!(err.code_enum(), ErrorCode::Unknown);
        assert_eq!(err.format_code(), "Q{urn:x}oops");
        assert_eq!(err.to_string(), "error: custom (Q{urn:x}oops)");
    }

    #[rstest]
    fn parse_code_handles_bare_names() {
        assert_eq!(Error::parse_code("plain"), ExpandedName::new(None, "plain"));
        assert_eq!(ErrorCode::from_code("err:DOESNOTEXIST"), ErrorCode::Unknown);
    }
}
