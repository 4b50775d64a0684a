use crate::OutputFormat;
use crate::util::{CliResult, yes_no};
use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use std::fmt::Write;
use xqkit_xdm::{DurationKind, XsDuration};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DurationKindArg {
    Duration,
    YearMonth,
    DayTime,
}

impl From<DurationKindArg> for DurationKind {
    fn from(kind: DurationKindArg) -> Self {
        match kind {
            DurationKindArg::Duration => DurationKind::Duration,
            DurationKindArg::YearMonth => DurationKind::YearMonth,
            DurationKindArg::DayTime => DurationKind::DayTime,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DurationArgs {
    #[arg(value_name = "LEXICAL", allow_hyphen_values = true)]
    pub lexical: String,
    #[arg(long = "kind", value_enum, default_value_t = DurationKindArg::Duration)]
    pub kind: DurationKindArg,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct DurationSummary {
    lexical: String,
    #[serde(rename = "type")]
    type_name: String,
    canonical: String,
    months: i64,
    seconds: String,
    negative: bool,
}

pub fn run(args: &DurationArgs) -> CliResult<String> {
    let duration = XsDuration::parse(&args.lexical, args.kind.into())?;
    let summary = DurationSummary::from_duration(&args.lexical, &duration);
    let output = match args.format {
        OutputFormat::Text => render_duration_text(&summary),
        OutputFormat::Json => render_duration_json(&summary)?,
    };
    Ok(output)
}

impl DurationSummary {
    fn from_duration(lexical: &str, duration: &XsDuration) -> Self {
        Self {
            lexical: lexical.to_owned(),
            type_name: duration.kind.atomic_type().name().to_owned(),
            canonical: duration.to_string(),
            months: duration.months,
            seconds: duration.seconds.normalize().to_string(),
            negative: duration.is_negative(),
        }
    }
}

fn render_duration_text(summary: &DurationSummary) -> String {
    let mut output = String::new();
    let canonical = summary.canonical.if_supports_color(Stream::Stdout, |text| {
        text.bold().fg_rgb::<79, 166, 255>().to_string()
    });
    let _ = writeln!(&mut output, "{} ({canonical})", summary.type_name);
    let _ = writeln!(&mut output, "Months: {}", summary.months);
    let _ = writeln!(&mut output, "Seconds: {}", summary.seconds);
    let _ = writeln!(&mut output, "Negative: {}", yes_no(summary.negative));
    output.trim_end().to_owned()
}

fn render_duration_json(summary: &DurationSummary) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(lexical: &str, kind: DurationKindArg, format: OutputFormat) -> DurationArgs {
        DurationArgs { lexical: lexical.to_owned(), kind, format }
    }

    #[rstest]
    fn text_output_shows_the_canonical_form() {
        let output = run(&args("P1Y14M", DurationKindArg::Duration, OutputFormat::Text)).unwrap();
        assert_eq!(
            output.lines().collect::<Vec<_>>(),
            ["xs:duration (P2Y2M)", "Months: 26", "Seconds: 0", "Negative: no"]
        );
    }

    #[rstest]
    fn json_output_carries_the_totals() {
        let output =
            run(&args("-PT90M", DurationKindArg::DayTime, OutputFormat::Json)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("parse");
        assert_eq!(parsed["type"], "xs:dayTimeDuration");
        assert_eq!(parsed["canonical"], "-PT1H30M");
        assert_eq!(parsed["seconds"], "-5400");
        assert_eq!(parsed["negative"], true);
    }

    #[rstest]
    #[case("P1D", DurationKindArg::YearMonth)]
    #[case("P1Y", DurationKindArg::DayTime)]
    #[case("PT", DurationKindArg::Duration)]
    fn invalid_lexical_forms_fail(#[case] lexical: &str, #[case] kind: DurationKindArg) {
        let err = run(&args(lexical, kind, OutputFormat::Text)).unwrap_err();
        assert!(err.to_string().contains("FORG0001"), "{err}");
    }

    #[rstest]
    fn overflowing_durations_are_out_of_range() {
        let request = args("P99999999999999999999M", DurationKindArg::YearMonth, OutputFormat::Text);
        let err = run(&request).unwrap_err();
        assert!(err.to_string().contains("FODT0002"), "{err}");
    }
}
