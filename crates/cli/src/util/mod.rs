use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

pub type CliResult<T> = Result<T, Box<dyn Error>>;

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Reads the whole input, where `-` stands for stdin.
pub fn read_source(path: &Path) -> CliResult<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    fs::read_to_string(path).map_err(|err| format!("cannot read {}: {err}", path.display()).into())
}

/// Parses `prefix=uri` bindings given on the command line.
pub fn parse_namespace_bindings(values: &[String]) -> CliResult<Vec<(String, String)>> {
    let mut bindings = Vec::with_capacity(values.len());
    for value in values {
        let (prefix, uri) = value
            .split_once('=')
            .ok_or_else(|| format!("namespace binding must be prefix=uri: {value}"))?;
        if !xqkit_xdm::is_ncname(prefix) {
            return Err(format!("invalid namespace prefix: {prefix}").into());
        }
        bindings.push((prefix.to_owned(), uri.to_owned()));
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn bindings_split_at_the_first_equals_sign() {
        let bindings =
            parse_namespace_bindings(&["a=urn:x".into(), "b=http://e.org/?q=1".into()]).unwrap();
        assert_eq!(
            bindings,
            [("a".to_owned(), "urn:x".to_owned()), ("b".to_owned(), "http://e.org/?q=1".to_owned())]
        );
    }

    #[rstest]
    #[case("noequals")]
    #[case("1a=urn:x")]
    #[case("=urn:x")]
    fn malformed_bindings_are_rejected(#[case] value: &str) {
        assert!(parse_namespace_bindings(&[value.to_owned()]).is_err());
    }

    #[rstest]
    fn source_is_read_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1 + 2").unwrap();
        assert_eq!(read_source(file.path()).unwrap(), "1 + 2");
    }

    #[rstest]
    fn missing_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xq");
        let err = read_source(&path).unwrap_err();
        assert!(err.to_string().contains("absent.xq"));
    }
}
