use crate::OutputFormat;
use crate::util::{CliResult, read_source};
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use xqkit_lexer::{Lexer, TokenType, XPathLexer, XQDOC_LEXER, utf16};

#[derive(Args, Debug, Clone)]
pub struct TokenizeArgs {
    /// Source file, or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
    /// Lex `(:~ ... :)` as a plain comment.
    #[arg(long = "no-xqdoc")]
    pub no_xqdoc: bool,
    /// Omit whitespace and comment tokens.
    #[arg(long = "skip-trivia")]
    pub skip_trivia: bool,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct TokenSummary {
    kind: String,
    start: usize,
    end: usize,
    state: u32,
    xqdoc: bool,
    text: String,
    #[serde(skip)]
    token_type: TokenType,
}

pub fn run(args: &TokenizeArgs) -> CliResult<String> {
    let source = read_source(&args.input)?;
    let tokens = tokenize(&source, !args.no_xqdoc, args.skip_trivia);
    tracing::debug!(count = tokens.len(), input = %args.input.display(), "tokenized source");
    let output = match args.format {
        OutputFormat::Text => render_tokens_text(&tokens),
        OutputFormat::Json => render_tokens_json(&tokens)?,
    };
    Ok(output)
}

pub(crate) fn tokenize(source: &str, xqdoc: bool, skip_trivia: bool) -> Vec<TokenSummary> {
    let buffer = utf16(source);
    let mut lexer: Box<dyn Lexer> =
        if xqdoc { Box::new(XPathLexer::with_xqdoc()) } else { Box::new(XPathLexer::new()) };
    lexer.start(buffer.clone(), 0, buffer.len(), XPathLexer::STATE_DEFAULT);

    let mut tokens = Vec::new();
    while let Some(kind) = lexer.token_type() {
        if !(skip_trivia && kind.is_trivia()) {
            let (start, end) = (lexer.token_start(), lexer.token_end());
            tokens.push(TokenSummary {
                kind: kind.to_string(),
                start,
                end,
                state: lexer.state(),
                xqdoc: lexer.state() & XQDOC_LEXER != 0,
                text: String::from_utf16_lossy(&buffer[start..end]),
                token_type: kind,
            });
        }
        lexer.advance();
    }
    tokens
}

fn render_tokens_text(tokens: &[TokenSummary]) -> String {
    let mut output = String::new();
    for token in tokens {
        let _ = writeln!(
            &mut output,
            "{}..{} {} {:?}",
            token.start,
            token.end,
            colorize_kind(token),
            token.text
        );
    }
    output.trim_end().to_owned()
}

fn colorize_kind(token: &TokenSummary) -> String {
    let kind = token.kind.as_str();
    match token.token_type {
        t if t.is_keyword() => kind
            .if_supports_color(Stream::Stdout, |text| {
                text.bold().fg_rgb::<79, 166, 255>().to_string()
            })
            .to_string(),
        TokenType::BadCharacter
        | TokenType::PartialComment
        | TokenType::PartialEntityReference
        | TokenType::EmptyEntityReference
        | TokenType::PartialDoubleLiteralExponent => kind
            .if_supports_color(Stream::Stdout, |text| text.bold().red().to_string())
            .to_string(),
        t if t.is_xqdoc() => kind
            .if_supports_color(Stream::Stdout, |text| text.fg_rgb::<136, 192, 74>().to_string())
            .to_string(),
        t if t.is_trivia() => {
            kind.if_supports_color(Stream::Stdout, |text| text.dimmed().to_string()).to_string()
        }
        _ => kind.to_owned(),
    }
}

fn render_tokens_json(tokens: &[TokenSummary]) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(tokens)?)
}
