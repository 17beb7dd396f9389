use crate::{
    error::CompileError,
    tokenizer::{tokenize_genspec, Token, TokenKind},
    utils::{parse_string_literal, quote},
};
use serde_json::{Map, Value};

/// Parses genspec text into an ordered tree.
///
/// The top level is a list of `key: value` members, optionally wrapped in
/// braces. Values are strings, bare words, `true`, `false`, `null`, `{...}`
/// objects or `[...]` lists. Bare words are kept as strings, numbers
/// included. Commas between members and list items are optional and a
/// trailing one is ignored. A repeated key replaces the earlier value.
pub fn parse_genspec(file: &str, text: &str) -> Result<Map<String, Value>, CompileError> {
    let tokens = tokenize_genspec(file, text)?;
    let mut parser = GenspecParser { tokens: &tokens, index: 0, file };
    let root = if parser.eat("{") {
        parser.parse_members(Some("}"))?
    } else {
        parser.parse_members(None)?
    };
    let tok = parser.current();
    if tok.kind != TokenKind::Eof {
        return Err(parser.error(tok, format!("Unexpected token {}", quote(&tok.text))));
    }
    Ok(root)
}

struct GenspecParser<'a> {
    tokens: &'a [Token],
    index:  usize,
    file:   &'a str,
}

impl<'a> GenspecParser<'a> {
    fn current(&self) -> &'a Token {
        let tokens = self.tokens;
        &tokens[self.index.min(tokens.len() - 1)]
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.current().kind == TokenKind::Punct && self.current().text == text {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, tok: &Token, msg: String) -> CompileError {
        CompileError::ParseError {
            file:   self.file.to_string(),
            msg,
            line:   tok.line,
            column: tok.column,
        }
    }

    /// Members up to `close`, or to end of input when `close` is `None`.
    fn parse_members(&mut self, close: Option<&str>) -> Result<Map<String, Value>, CompileError> {
        let mut members = Map::new();
        loop {
            let tok = self.current();
            match close {
                Some(close) if self.eat(close) => break,
                None if tok.kind == TokenKind::Eof => break,
                _ => {}
            }
            let key = match tok.kind {
                TokenKind::Ident => tok.text.clone(),
                TokenKind::Str => parse_string_literal(&tok.text).map_err(|e| self.error(tok, e.to_string()))?,
                TokenKind::Eof => return Err(self.error(tok, "Unexpected end of file".into())),
                _ => return Err(self.error(tok, format!("Expected key but found {}", quote(&tok.text)))),
            };
            self.index += 1;
            if !self.eat(":") {
                let tok = self.current();
                return Err(self.error(tok, format!("Expected \":\" but found {}", quote(&tok.text))));
            }
            let value = self.parse_value()?;
            members.insert(key, value);
            self.eat(",");
        }
        Ok(members)
    }

    fn parse_value(&mut self) -> Result<Value, CompileError> {
        let tok = self.current();
        self.index += 1;
        match tok.kind {
            TokenKind::Str => parse_string_literal(&tok.text)
                .map(Value::String)
                .map_err(|e| self.error(tok, e.to_string())),
            TokenKind::Ident => Ok(match tok.text.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                "null" => Value::Null,
                word => Value::String(word.to_string()),
            }),
            TokenKind::Punct if tok.text == "{" => Ok(Value::Object(self.parse_members(Some("}"))?)),
            TokenKind::Punct if tok.text == "[" => {
                let mut items = Vec::new();
                while !self.eat("]") {
                    if self.current().kind == TokenKind::Eof {
                        return Err(self.error(self.current(), "Unexpected end of file".into()));
                    }
                    items.push(self.parse_value()?);
                    self.eat(",");
                }
                Ok(Value::Array(items))
            }
            TokenKind::Eof => Err(self.error(tok, "Unexpected end of file".into())),
            _ => Err(self.error(tok, format!("Unexpected token {}", quote(&tok.text)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested() {
        let text = r#"
            // global section
            global: {
                options: { base_output_dir: gen, output_charset: "UTF-8" }
            }
            /** Targets. */
            targets: {
                rust: {
                    generators: [
                        { template: struct.jinja, options: { iterate: struct, verbose: true } },
                        { template: "enum.jinja", params: { prefix: null }, },
                    ],
                },
            }
        "#;
        let got = parse_genspec("test.gen", text).unwrap();
        assert_eq!(
            Value::Object(got.clone()),
            json!({
                "global": { "options": { "base_output_dir": "gen", "output_charset": "UTF-8" } },
                "targets": { "rust": { "generators": [
                    { "template": "struct.jinja", "options": { "iterate": "struct", "verbose": true } },
                    { "template": "enum.jinja", "params": { "prefix": null } }
                ] } }
            })
        );
        let keys: Vec<&String> = got.keys().collect();
        assert_eq!(keys, vec!["global", "targets"]);
    }

    #[test]
    fn test_declaration_order_kept() {
        let got = parse_genspec("g", "targets: { zeta: {}, alpha: {}, mid: {} }").unwrap();
        let targets = got["targets"].as_object().unwrap();
        let names: Vec<&String> = targets.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_braced_root_and_numbers_as_strings() {
        let got = parse_genspec("g", "{ level: 3, list: [a b c] }").unwrap();
        assert_eq!(got["level"], json!("3"));
        assert_eq!(got["list"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_errors_carry_location() {
        match parse_genspec("bad.gen", "a: {\n  b c\n}").unwrap_err() {
            CompileError::ParseError { file, line, .. } => {
                assert_eq!(file, "bad.gen");
                assert_eq!(line, 2);
            }
            other => panic!("expected a ParseError but got {:?}", other),
        }
        assert!(parse_genspec("g", "a: [x, y").is_err());
        assert!(parse_genspec("g", "a: b }").is_err());
    }
}
