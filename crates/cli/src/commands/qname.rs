use crate::OutputFormat;
use crate::util::{CliResult, parse_namespace_bindings, yes_no};
use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use std::fmt::Write;
use xqkit_xdm::{NameKind, StaticContextBuilder, XsQName, parse_qname, qname_equal};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum NameKindArg {
    Element,
    Type,
    Function,
    Attribute,
    Variable,
}

impl From<NameKindArg> for NameKind {
    fn from(kind: NameKindArg) -> Self {
        match kind {
            NameKindArg::Element => NameKind::Element,
            NameKindArg::Type => NameKind::Type,
            NameKindArg::Function => NameKind::Function,
            NameKindArg::Attribute => NameKind::Attribute,
            NameKindArg::Variable => NameKind::Variable,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct QNameArgs {
    #[arg(value_name = "A")]
    pub left: String,
    #[arg(value_name = "B")]
    pub right: String,
    /// Expand both names against the static context before comparing.
    #[arg(long = "expand", value_enum)]
    pub expand: Option<NameKindArg>,
    /// Additional `prefix=uri` namespace bindings.
    #[arg(long = "namespace", value_name = "PREFIX=URI")]
    pub namespaces: Vec<String>,
    #[arg(long = "default-element-namespace", value_name = "URI")]
    pub default_element_namespace: Option<String>,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct NameSummary {
    lexical: String,
    prefix: Option<String>,
    namespace: Option<String>,
    local_name: String,
    eqname: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct ComparisonSummary {
    left: NameSummary,
    right: NameSummary,
    expanded: bool,
    equal: bool,
}

pub fn run(args: &QNameArgs) -> CliResult<String> {
    let mut left = parse_qname(&args.left)?;
    let mut right = parse_qname(&args.right)?;
    if let Some(kind) = args.expand {
        let mut builder = StaticContextBuilder::new();
        for (prefix, uri) in parse_namespace_bindings(&args.namespaces)? {
            builder = builder.with_namespace(prefix, uri);
        }
        if let Some(uri) = &args.default_element_namespace {
            builder = builder.with_default_element_namespace(uri.as_str());
        }
        let context = builder.build();
        left = left.expand(&context, kind.into())?;
        right = right.expand(&context, kind.into())?;
    }

    let summary = ComparisonSummary {
        equal: qname_equal(&left, &right),
        left: NameSummary::from_qname(&args.left, &left),
        right: NameSummary::from_qname(&args.right, &right),
        expanded: args.expand.is_some(),
    };
    let output = match args.format {
        OutputFormat::Text => render_comparison_text(&summary),
        OutputFormat::Json => render_comparison_json(&summary)?,
    };
    Ok(output)
}

impl NameSummary {
    fn from_qname(lexical: &str, name: &XsQName) -> Self {
        Self {
            lexical: lexical.to_owned(),
            prefix: name.prefix.clone(),
            namespace: name.namespace.clone(),
            local_name: name.local_name.clone(),
            eqname: name.eqname(),
        }
    }
}

fn render_comparison_text(summary: &ComparisonSummary) -> String {
    let mut output = String::new();
    for (label, name) in [("A", &summary.left), ("B", &summary.right)] {
        let eqname = name.eqname.if_supports_color(Stream::Stdout, |text| {
            text.bold().fg_rgb::<241, 149, 255>().to_string()
        });
        let _ = writeln!(&mut output, "{label}: {} -> {eqname}", name.lexical);
    }
    let mode = if summary.expanded { "expanded" } else { "lexical" };
    let _ = writeln!(&mut output, "Comparison: {mode}");
    let _ = writeln!(&mut output, "equal: {}", yes_no(summary.equal));
    output.trim_end().to_owned()
}

fn render_comparison_json(summary: &ComparisonSummary) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(left: &str, right: &str, expand: Option<NameKindArg>) -> QNameArgs {
        QNameArgs {
            left: left.to_owned(),
            right: right.to_owned(),
            expand,
            namespaces: vec!["a=urn:one".into(), "b=urn:one".into()],
            default_element_namespace: Some("urn:default".into()),
            format: OutputFormat::Text,
        }
    }

    fn equal(output: &str) -> bool {
        output.lines().last() == Some("equal: yes")
    }

    #[rstest]
    #[case("a:x", "b:x", None, false)]
    #[case("a:x", "b:x", Some(NameKindArg::Element), true)]
    #[case("x", "Q{urn:default}x", Some(NameKindArg::Element), true)]
    #[case("x", "Q{urn:default}x", Some(NameKindArg::Attribute), false)]
    #[case("Q{urn:one}x", "Q{urn:one}x", None, true)]
    fn equality_depends_on_expansion(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expand: Option<NameKindArg>,
        #[case] expected: bool,
    ) {
        let output = run(&args(left, right, expand)).unwrap();
        assert_eq!(equal(&output), expected, "{output}");
    }

    #[rstest]
    fn unbound_prefix_fails_expansion() {
        let err = run(&args("zz:x", "x", Some(NameKindArg::Element))).unwrap_err();
        assert!(err.to_string().contains("XPST0081"), "{err}");
    }

    #[rstest]
    fn invalid_name_fails_parsing() {
        let err = run(&args("1x", "x", None)).unwrap_err();
        assert!(err.to_string().contains("FOCA0002"), "{err}");
    }

    #[rstest]
    fn json_output_describes_both_names() {
        let mut request = args("a:x", "Q{urn:one}x", Some(NameKindArg::Element));
        request.format = OutputFormat::Json;
        let parsed: serde_json::Value =
            serde_json::from_str(&run(&request).unwrap()).expect("parse");
        assert_eq!(parsed["equal"], true);
        assert_eq!(parsed["left"]["namespace"], "urn:one");
        assert_eq!(parsed["left"]["eqname"], "Q{urn:one}x");
        assert_eq!(parsed["right"]["prefix"], serde_json::Value::Null);
    }
}
