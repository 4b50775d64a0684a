//! Static context: in-scope namespaces, known function signatures and in-scope variables.

use core::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use tracing::debug;

use crate::consts::{FNS, MATH, PREDEFINED_NAMESPACES};
use crate::error::{Error, ErrorCode};
use crate::qname::ExpandedName;

pub type Arity = usize;

#[derive(Debug, Clone, Default)]
pub struct NamespaceBindings {
    pub by_prefix: HashMap<String, String>,
}

impl NamespaceBindings {
    /// Bindings every static context starts with (`xml`, `xs`, `fn`, ...).
    pub fn predefined() -> Self {
        let by_prefix = PREDEFINED_NAMESPACES
            .iter()
            .map(|(prefix, uri)| ((*prefix).to_string(), (*uri).to_string()))
            .collect();
        Self { by_prefix }
    }
}

/// Accepted arities of one function overload. `max == None` means variadic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArityRange {
    pub min: Arity,
    pub max: Option<Arity>,
}

impl ArityRange {
    pub fn contains(self, arity: Arity) -> bool {
        arity >= self.min && self.max.is_none_or(|max| arity <= max)
    }

    /// Higher minimum first, then the smaller maximum; variadic ranges last.
    fn specificity(a: &Self, b: &Self) -> Ordering {
        b.min.cmp(&a.min).then_with(|| match (a.max, b.max) {
            (Some(amax), Some(bmax)) => amax.cmp(&bmax),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    }
}

/// Error type returned by function resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No function with the (possibly default-namespace resolved) name exists.
    #[error("unknown function {0}")]
    Unknown(ExpandedName),
    /// Function exists, but not for the requested arity. `available` lists the bounded
    /// arities; `variadic_from` is the smallest minimum of the variadic overloads.
    #[error(
        "function {name} has no overload accepting the requested arity (known arities: {})",
        describe_arities(.available, .variadic_from.as_ref())
    )]
    WrongArity { name: ExpandedName, available: Vec<Arity>, variadic_from: Option<Arity> },
}

fn describe_arities(available: &[Arity], variadic_from: Option<&Arity>) -> String {
    let mut parts: Vec<String> = available.iter().map(ToString::to_string).collect();
    if let Some(min) = variadic_from {
        parts.push(format!("{min}.."));
    }
    parts.join(", ")
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        Error::from_code(ErrorCode::XPST0017, e.to_string())
    }
}

/// A successful function lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFunction {
    pub name: ExpandedName,
    pub arity: ArityRange,
}

/// Statically known function signatures keyed by expanded name.
///
/// A name may be registered with several arity ranges. Overlapping ranges are allowed; the
/// resolver picks the most specific one (highest minimum, then smallest maximum).
#[derive(Debug, Clone, Default)]
pub struct FunctionSignatures {
    by_name: HashMap<ExpandedName, Vec<ArityRange>>,
}

impl FunctionSignatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: ExpandedName, min: Arity, max: Option<Arity>) {
        let ranges = self.by_name.entry(name).or_default();
        let range = ArityRange { min, max };
        if !ranges.contains(&range) {
            ranges.push(range);
            ranges.sort_by(ArityRange::specificity);
        }
    }

    /// Convenience: register a function in a namespace using ns URI and local name.
    pub fn register_ns(&mut self, ns_uri: &str, local: &str, min: Arity, max: Option<Arity>) {
        self.register(ExpandedName::new(Some(ns_uri.to_string()), local), min, max);
    }

    pub fn supports(&self, name: &ExpandedName, arity: Arity) -> bool {
        self.by_name.get(name).is_some_and(|ranges| ranges.iter().any(|r| r.contains(arity)))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Resolve a function by name and arity.
    ///
    /// A name without namespace is first looked up as is (functions registered without a
    /// namespace) and otherwise in `default_ns`.
    pub fn resolve(
        &self,
        name: &ExpandedName,
        arity: Arity,
        default_ns: Option<&str>,
    ) -> Result<ResolvedFunction, ResolveError> {
        if name.ns_uri.is_none()
            && let Some(range) = self.find(name, arity)
        {
            return Ok(ResolvedFunction { name: name.clone(), arity: range });
        }
        let effective = match (&name.ns_uri, default_ns) {
            (None, Some(ns)) => ExpandedName::new(Some(ns.to_string()), &name.local),
            _ => name.clone(),
        };
        let Some(ranges) = self.by_name.get(&effective) else {
            debug!(%effective, arity, "unknown function");
            return Err(ResolveError::Unknown(effective));
        };
        if let Some(range) = self.find(&effective, arity) {
            return Ok(ResolvedFunction { name: effective, arity: range });
        }
        let variadic_from = ranges.iter().filter(|r| r.max.is_none()).map(|r| r.min).min();
        let mut available: Vec<Arity> = ranges
            .iter()
            .filter_map(|r| r.max.map(|max| r.min..=max))
            .flatten()
            .filter(|a| variadic_from.is_none_or(|min| *a < min))
            .collect();
        available.sort_unstable();
        available.dedup();
        debug!(%effective, arity, ?available, ?variadic_from, "function arity mismatch");
        Err(ResolveError::WrongArity { name: effective, available, variadic_from })
    }

    fn find(&self, name: &ExpandedName, arity: Arity) -> Option<ArityRange> {
        self.by_name.get(name)?.iter().copied().find(|r| r.contains(arity))
    }
}

/// Signatures of the built-in `fn:` and `math:` functions.
pub fn default_function_signatures() -> FunctionSignatures {
    static SIGS: OnceLock<FunctionSignatures> = OnceLock::new();
    SIGS.get_or_init(|| {
        const FN: &[(&str, Arity, Option<Arity>)] = &[
            ("abs", 1, Some(1)),
            ("avg", 1, Some(1)),
            ("boolean", 1, Some(1)),
            ("ceiling", 1, Some(1)),
            ("codepoints-to-string", 1, Some(1)),
            ("collection", 0, Some(1)),
            ("compare", 2, Some(3)),
            ("concat", 2, None),
            ("contains", 2, Some(3)),
            ("count", 1, Some(1)),
            ("current-dateTime", 0, Some(0)),
            ("data", 0, Some(1)),
            ("days-from-duration", 1, Some(1)),
            ("deep-equal", 2, Some(3)),
            ("distinct-values", 1, Some(2)),
            ("doc", 1, Some(1)),
            ("empty", 1, Some(1)),
            ("ends-with", 2, Some(3)),
            ("error", 0, Some(3)),
            ("exactly-one", 1, Some(1)),
            ("exists", 1, Some(1)),
            ("false", 0, Some(0)),
            ("floor", 1, Some(1)),
            ("hours-from-duration", 1, Some(1)),
            ("index-of", 2, Some(3)),
            ("last", 0, Some(0)),
            ("local-name", 0, Some(1)),
            ("lower-case", 1, Some(1)),
            ("matches", 2, Some(3)),
            ("max", 1, Some(2)),
            ("min", 1, Some(2)),
            ("minutes-from-duration", 1, Some(1)),
            ("months-from-duration", 1, Some(1)),
            ("name", 0, Some(1)),
            ("namespace-uri", 0, Some(1)),
            ("namespace-uri-for-prefix", 2, Some(2)),
            ("node-name", 0, Some(1)),
            ("normalize-space", 0, Some(1)),
            ("not", 1, Some(1)),
            ("number", 0, Some(1)),
            ("position", 0, Some(0)),
            ("QName", 2, Some(2)),
            ("replace", 3, Some(4)),
            ("resolve-QName", 2, Some(2)),
            ("reverse", 1, Some(1)),
            ("round", 1, Some(2)),
            ("seconds-from-duration", 1, Some(1)),
            ("starts-with", 2, Some(3)),
            ("string", 0, Some(1)),
            ("string-join", 1, Some(2)),
            ("string-length", 0, Some(1)),
            ("string-to-codepoints", 1, Some(1)),
            ("subsequence", 2, Some(3)),
            ("substring", 2, Some(3)),
            ("substring-after", 2, Some(3)),
            ("substring-before", 2, Some(3)),
            ("sum", 1, Some(2)),
            ("tokenize", 1, Some(3)),
            ("trace", 1, Some(2)),
            ("true", 0, Some(0)),
            ("upper-case", 1, Some(1)),
            ("years-from-duration", 1, Some(1)),
            ("zero-or-one", 1, Some(1)),
        ];
        const MATH_FNS: &[(&str, Arity, Option<Arity>)] = &[
            ("cos", 1, Some(1)),
            ("exp", 1, Some(1)),
            ("log", 1, Some(1)),
            ("pi", 0, Some(0)),
            ("pow", 2, Some(2)),
            ("sin", 1, Some(1)),
            ("sqrt", 1, Some(1)),
        ];
        let mut sigs = FunctionSignatures::new();
        for (local, min, max) in FN {
            sigs.register_ns(FNS, local, *min, *max);
        }
        for (local, min, max) in MATH_FNS {
            sigs.register_ns(MATH, local, *min, *max);
        }
        sigs
    })
    .clone()
}

#[derive(Debug, Clone)]
pub struct StaticContext {
    pub default_element_namespace: Option<String>,
    pub default_function_namespace: Option<String>,
    pub namespaces: NamespaceBindings,
    pub in_scope_variables: HashSet<ExpandedName>,
    pub function_signatures: FunctionSignatures,
}

impl Default for StaticContext {
    fn default() -> Self {
        Self {
            default_element_namespace: None,
            default_function_namespace: Some(FNS.to_string()),
            namespaces: NamespaceBindings::predefined(),
            in_scope_variables: HashSet::new(),
            function_signatures: default_function_signatures(),
        }
    }
}

impl StaticContext {
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.by_prefix.get(prefix).map(String::as_str)
    }

    /// Resolve a function call against the known signatures and the default function
    /// namespace, reporting `XPST0017` on failure.
    pub fn resolve_function(
        &self,
        name: &ExpandedName,
        arity: Arity,
    ) -> Result<ResolvedFunction, Error> {
        Ok(self.function_signatures.resolve(
            name,
            arity,
            self.default_function_namespace.as_deref(),
        )?)
    }
}

/// Builder for `StaticContext`: allows explicit namespace registrations
/// and default settings while preserving required implicit bindings.
pub struct StaticContextBuilder {
    ctx: StaticContext,
}

impl Default for StaticContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticContextBuilder {
    pub fn new() -> Self {
        Self { ctx: StaticContext::default() }
    }

    /// Default namespace for unprefixed element and type names. An empty URI resets it.
    #[must_use]
    pub fn with_default_element_namespace(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.ctx.default_element_namespace = (!uri.is_empty()).then_some(uri);
        self
    }

    #[must_use]
    pub fn with_default_function_namespace(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_function_namespace = Some(uri.into());
        self
    }

    /// Register a namespace prefix → URI mapping. Attempts to rebind the reserved `xml` and
    /// `xmlns` prefixes are ignored; an empty URI removes the binding.
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix == "xml" || prefix == "xmlns" {
            return self;
        }
        let uri = uri.into();
        if uri.is_empty() {
            self.ctx.namespaces.by_prefix.remove(&prefix);
        } else {
            self.ctx.namespaces.by_prefix.insert(prefix, uri);
        }
        self
    }

    /// Register an in-scope variable that may be referenced without being bound locally.
    #[must_use]
    pub fn with_variable(mut self, name: ExpandedName) -> Self {
        self.ctx.in_scope_variables.insert(name);
        self
    }

    #[must_use]
    pub fn with_function_signatures(mut self, signatures: FunctionSignatures) -> Self {
        self.ctx.function_signatures = signatures;
        self
    }

    pub fn build(self) -> StaticContext {
        self.ctx
    }
}

/// Where a variable reference was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableBinding {
    /// Bound by an enclosing expression; `depth` counts scopes outwards (0 = innermost).
    Local { depth: usize },
    /// Declared in the static context.
    InScope,
}

/// Lexical variable scopes layered over the static context's in-scope variables.
pub struct VariableScopes<'a> {
    ctx: &'a StaticContext,
    scopes: Vec<HashSet<ExpandedName>>,
}

impl<'a> VariableScopes<'a> {
    pub fn new(ctx: &'a StaticContext) -> Self {
        Self { ctx, scopes: Vec::new() }
    }

    pub fn enter(&mut self) {
        self.scopes.push(HashSet::new());
    }

    /// Leaves the innermost scope. Returns `false` if no scope was open.
    pub fn exit(&mut self) -> bool {
        self.scopes.pop().is_some()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope, opening one if none is open.
    pub fn bind(&mut self, name: ExpandedName) {
        if self.scopes.is_empty() {
            self.enter();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name);
        }
    }

    /// Innermost binding wins; unresolved names are `XPST0008`.
    pub fn resolve(&self, name: &ExpandedName) -> Result<VariableBinding, Error> {
        if let Some(depth) = self.scopes.iter().rev().position(|scope| scope.contains(name)) {
            return Ok(VariableBinding::Local { depth });
        }
        if self.ctx.in_scope_variables.contains(name) {
            return Ok(VariableBinding::InScope);
        }
        debug!(%name, "undeclared variable");
        Err(Error::from_code(ErrorCode::XPST0008, format!("variable ${name} is not declared")))
    }
}
