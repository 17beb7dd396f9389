use crate::{error::CompileError, utils::{parse_doc_comments, quote}};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDL_TOKEN_REGEX: Regex = Regex::new(concat!(
        r"(?P<ws>\s+)",
        r"|(?P<doc>/\*\*(?s:.*?)\*/)",
        r"|(?P<block>/\*(?s:.*?)\*/)",
        r"|(?P<line>(?://|#)[^\n]*)",
        r"|(?P<double>[+-]?(?:\d+\.\d*(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?|\d+[eE][+-]?\d+))",
        r"|(?P<int>[+-]?(?:0[xX][0-9A-Fa-f]+|\d+))",
        r#"|(?P<string>"(?:[^"\\\n]|\\.)*")"#,
        r"|(?P<char>'(?:[^'\\\n]|\\.)*')",
        r"|(?P<ident>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)",
        r"|(?P<punct>[{}()<>\[\],;:=*])",
    ))
    .unwrap();

    static ref GENSPEC_TOKEN_REGEX: Regex = Regex::new(concat!(
        r"(?P<ws>\s+)",
        r"|(?P<doc>/\*\*(?s:.*?)\*/)",
        r"|(?P<block>/\*(?s:.*?)\*/)",
        r"|(?P<line>(?://|#)[^\n]*)",
        r#"|(?P<string>"(?:[^"\\\n]|\\.)*")"#,
        r"|(?P<ident>[A-Za-z0-9_$./+\-]+)",
        r"|(?P<punct>[{}\[\],:])",
    ))
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Int,
    Double,
    Str,
    Char,
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   String,
    pub line:   usize,
    pub column: usize,
    /// Lines of the `/** */` comment immediately preceding this token.
    pub doc:    Option<Vec<String>>,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.kind != TokenKind::Str && self.kind != TokenKind::Char && self.text == text
    }
}

pub fn tokenize_idl(file: &str, text: &str) -> Result<Vec<Token>, CompileError> {
    tokenize(&IDL_TOKEN_REGEX, file, text)
}

pub fn tokenize_genspec(file: &str, text: &str) -> Result<Vec<Token>, CompileError> {
    tokenize(&GENSPEC_TOKEN_REGEX, file, text)
}

fn classify(caps: &regex::Captures<'_>) -> Option<TokenKind> {
    const KINDS: [(&str, TokenKind); 6] = [
        ("ident", TokenKind::Ident),
        ("int", TokenKind::Int),
        ("double", TokenKind::Double),
        ("string", TokenKind::Str),
        ("char", TokenKind::Char),
        ("punct", TokenKind::Punct),
    ];
    KINDS
        .iter()
        .find(|(group, _)| caps.name(group).is_some())
        .map(|(_, kind)| *kind)
}

fn tokenize(regex: &Regex, file: &str, text: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens   = Vec::new();
    let mut line     = 1;
    let mut column   = 1;
    let mut last_end = 0;
    let mut doc      = None;

    let syntax_error = |unexpected: &str, line, column| CompileError::ParseError {
        file: file.to_string(),
        msg: format!("Syntax error: {}", quote(unexpected)),
        line,
        column,
    };

    for caps in regex.captures_iter(text) {
        let Some(mat) = caps.get(0) else { continue };
        if mat.start() > last_end {
            return Err(syntax_error(&text[last_end..mat.start()], line, column));
        }
        let part = mat.as_str();

        if caps.name("doc").is_some() {
            doc = parse_doc_comments(part);
        } else if let Some(kind) = classify(&caps) {
            tokens.push(Token {
                kind,
                text: part.to_string(),
                line,
                column,
                doc: doc.take(),
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.chars().count() + 1;
            }
        } else {
            column += part.chars().count();
        }
        last_end = mat.end();
    }

    if last_end != text.len() {
        return Err(syntax_error(&text[last_end..], line, column));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        line,
        column,
        doc: None,
    });
    Ok(tokens)
}
