//! Well-known namespace URIs.

pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
pub const MATH: &str = "http://www.w3.org/2005/xpath-functions/math";
pub const MAP: &str = "http://www.w3.org/2005/xpath-functions/map";
pub const ARRAY: &str = "http://www.w3.org/2005/xpath-functions/array";
pub const LOCAL: &str = "http://www.w3.org/2005/xquery-local-functions";
/// Namespace URI used for W3C-defined XPath/XQuery error codes (xqt-errors).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";

/// Prefixes bound in every static context.
pub const PREDEFINED_NAMESPACES: &[(&str, &str)] = &[
    ("xml", XML_URI),
    ("xs", XS),
    ("xsi", XSI),
    ("fn", FNS),
    ("local", LOCAL),
    ("math", MATH),
    ("map", MAP),
    ("array", ARRAY),
    ("err", ERR_NS),
];
