//! XDM atomic value model for the XPath/XQuery language family: typed atomic values with
//! weak back-references to their syntax, `xs:duration` parsing, QName equality and
//! expansion, literal conversion and static-context name resolution.

pub mod consts;
pub mod context;
pub mod duration;
pub mod error;
pub mod literal;
pub mod qname;
pub mod values;

pub use context::{
    Arity, ArityRange, FunctionSignatures, NamespaceBindings, ResolveError, ResolvedFunction,
    StaticContext, StaticContextBuilder, VariableBinding, VariableScopes,
    default_function_signatures,
};
pub use duration::{
    DurationKind, XsDuration, to_xs_day_time_duration, to_xs_duration, to_xs_year_month_duration,
};
pub use error::{Error, ErrorCode};
pub use literal::{
    StringSyntax, decimal_literal, double_literal, integer_literal, unescape_string_literal,
};
pub use qname::{ExpandedName, NameKind, XsQName, is_ncname, parse_qname, qname_equal};
pub use values::{
    AtomicType, Origin, SyntaxOrigin, UriContext, XsAnyAtomicType, XsAnyUri, XsDecimal,
    XsDouble, XsInteger, XsNCName, XsString, XsUntypedAtomic, format_double,
};
