mod commands;
mod util;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use util::CliResult;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "xqkit", version, about = "Inspect XPath/XQuery tokens, durations and QNames")]
pub struct Cli {
    /// Log filter (e.g. `debug`, `xqkit_xdm=trace`); overrides `RUST_LOG`.
    #[arg(long = "log-level", global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token stream of an XPath/XQuery source.
    Tokenize(commands::tokenize::TokenizeArgs),
    /// Parse an xs:duration lexical form and print its canonical value.
    Duration(commands::duration::DurationArgs),
    /// Compare two QNames, optionally after namespace expansion.
    #[command(name = "qname")]
    QName(commands::qname::QNameArgs),
}

pub fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;
    let output = execute(&cli.command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

pub fn execute(command: &Command) -> CliResult<String> {
    match command {
        Command::Tokenize(args) => commands::tokenize::run(args),
        Command::Duration(args) => commands::duration::run(args),
        Command::QName(args) => commands::qname::run(args),
    }
}

fn init_tracing(level: Option<&str>) -> CliResult<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to initialise logging: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[rstest]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn log_level_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["xqkit", "duration", "PT1H", "--log-level", "debug"])
            .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Duration(_)));
    }

    #[rstest]
    fn logging_reports_invalid_filters_and_double_initialisation() {
        assert!(init_tracing(Some("xqkit=verbose")).is_err());
        // Only one global subscriber can be installed per process.
        let _ = init_tracing(Some("warn"));
        let err = init_tracing(Some("warn")).unwrap_err();
        assert!(err.to_string().contains("failed to initialise logging"), "{err}");
    }

    #[rstest]
    fn negative_year_month_duration_runs_end_to_end() {
        let args = ["xqkit", "duration", "-P1Y2M", "--kind", "year-month"];
        let cli = Cli::try_parse_from(args).unwrap();
        let output = execute(&cli.command).unwrap();
        assert!(output.starts_with("xs:yearMonthDuration (-P1Y2M)"), "{output}");
        assert!(output.contains("Months: -14"));
    }

    #[rstest]
    fn execute_dispatches_to_the_subcommand() {
        let cli = Cli::try_parse_from(["xqkit", "qname", "a:x", "a:x"]).unwrap();
        let output = execute(&cli.command).unwrap();
        assert!(output.contains("equal: yes"));
    }
}
