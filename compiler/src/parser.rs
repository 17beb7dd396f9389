use crate::{
    compiler::load_model,
    error::{CompileError, LiteralError},
    source::FileRef,
    tokenizer::{Token, TokenKind},
    utils::{parse_char_literal, parse_int_literal, parse_long_literal, parse_short_literal, parse_string_literal, quote},
};
use brine_thrift_schema::{
    Annotations, ConstDef, EnumBuilder, FieldDef, FieldSet, FunctionDef, Literal, Model, ModelError,
    ModelSet, NamespaceDef, ServiceDef, StructType, Symbol, TypeRef, BYTE, VOID,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StructKind {
    Struct,
    Union,
    Exception,
}

/// Parses `tokens` into `model`, loading included files into `set` on the
/// way. Parsing stops at the first error.
pub fn parse_idl(set: &mut ModelSet, model: Model, tokens: &[Token], origin: &FileRef) -> Result<Model, CompileError> {
    let file = match origin {
        FileRef::Empty => model.name().unwrap_or("<anonymous>").to_string(),
        other => other.to_string(),
    };
    if tokens.is_empty() {
        return Err(CompileError::ParseError {
            file,
            msg: "No tokens".into(),
            line: 0,
            column: 0,
        });
    }
    IdlParser { tokens, index: 0, file, origin, set, model, declaring: None }.parse_document()
}

struct IdlParser<'a> {
    tokens: &'a [Token],
    index:  usize,
    file:   String,
    origin: &'a FileRef,
    set:    &'a mut ModelSet,
    model:  Model,
    // keyword and name tokens of the struct whose fields are being parsed
    declaring: Option<(&'a Token, &'a Token)>,
}

impl<'a> IdlParser<'a> {
    fn current(&self) -> &'a Token {
        let tokens = self.tokens;
        &tokens[self.index.min(tokens.len() - 1)]
    }

    fn advance(&mut self) -> &'a Token {
        let tok = self.current();
        self.index += 1;
        tok
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.current().is(text) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self) {
        let _ = self.eat(",") || self.eat(";");
    }

    fn expect(&mut self, text: &str) -> Result<&'a Token, CompileError> {
        let tok = self.current();
        if !self.eat(text) {
            return Err(self.error(tok, format!("Expected {} but found {}", quote(text), quote(&tok.text))));
        }
        Ok(tok)
    }

    /// A plain identifier such as a declaration name.
    fn expect_identifier(&mut self) -> Result<&'a Token, CompileError> {
        let tok = self.current();
        if tok.kind != TokenKind::Ident || !IDENTIFIER.is_match(&tok.text) {
            return Err(self.error(tok, format!("Expected identifier but found {}", quote(&tok.text))));
        }
        self.index += 1;
        Ok(tok)
    }

    /// An identifier that may be qualified with dots.
    fn expect_name(&mut self) -> Result<&'a Token, CompileError> {
        let tok = self.current();
        if tok.kind != TokenKind::Ident {
            return Err(self.error(tok, format!("Expected name but found {}", quote(&tok.text))));
        }
        self.index += 1;
        Ok(tok)
    }

    fn error(&self, tok: &Token, msg: String) -> CompileError {
        CompileError::ParseError {
            file:   self.file.clone(),
            msg,
            line:   tok.line,
            column: tok.column,
        }
    }

    fn unexpected(&self, tok: &Token) -> CompileError {
        if tok.kind == TokenKind::Eof {
            return self.error(tok, "Unexpected end of file".into());
        }
        self.error(tok, format!("Unexpected token {}", quote(&tok.text)))
    }

    fn at(&self, tok: &Token, source: ModelError) -> CompileError {
        CompileError::ModelError {
            file:   self.file.clone(),
            line:   tok.line,
            column: tok.column,
            source,
        }
    }

    fn literal_error(&self, tok: &Token, err: LiteralError) -> CompileError {
        self.error(tok, err.to_string())
    }

    fn parse_document(mut self) -> Result<Model, CompileError> {
        loop {
            let tok = self.current();
            match (tok.kind, tok.text.as_str()) {
                (TokenKind::Eof, _) => break,
                (TokenKind::Ident, "include") => self.parse_include()?,
                (TokenKind::Ident, "namespace") => self.parse_namespace()?,
                (TokenKind::Ident, "const") => self.parse_const()?,
                (TokenKind::Ident, "enum") => self.parse_enum()?,
                (TokenKind::Ident, "struct") => self.parse_struct(StructKind::Struct)?,
                (TokenKind::Ident, "union") => self.parse_struct(StructKind::Union)?,
                (TokenKind::Ident, "exception") => self.parse_struct(StructKind::Exception)?,
                (TokenKind::Ident, "service") => self.parse_service()?,
                _ => return Err(self.unexpected(tok)),
            }
            self.eat_separator();
        }
        Ok(self.model)
    }

    fn parse_include(&mut self) -> Result<(), CompileError> {
        self.advance();
        let path_tok = self.current();
        if path_tok.kind != TokenKind::Str {
            return Err(self.error(path_tok, format!("Expected include path but found {}", quote(&path_tok.text))));
        }
        self.index += 1;
        let path = parse_string_literal(&path_tok.text).map_err(|e| self.literal_error(path_tok, e))?;
        let source = self.origin.parent().child(&path);
        let name = source
            .model_name()
            .ok_or_else(|| self.error(path_tok, format!("Invalid include path {}", quote(&path))))?;

        if self.set.is_pending(&name) {
            return Err(self.at(path_tok, ModelError::CircularInclude(name)));
        }
        if !self.set.is_loaded(&name) {
            debug!("{} includes {}", self.file, source);
            load_model(self.set, &source)?;
        }
        self.model.add_include(&name);
        Ok(())
    }

    fn parse_namespace(&mut self) -> Result<(), CompileError> {
        self.advance();
        let generator = self.current();
        if !(generator.kind == TokenKind::Ident || generator.is(NamespaceDef::WILDCARD)) {
            return Err(self.error(generator, format!("Expected generator name but found {}", quote(&generator.text))));
        }
        self.index += 1;
        let namespace = self.expect_name()?;
        self.model
            .add_namespace(NamespaceDef::new(&generator.text, &namespace.text))
            .map_err(|e| self.at(generator, e))
    }

    fn parse_const(&mut self) -> Result<(), CompileError> {
        let keyword = self.advance();
        let ty = self.parse_type(false)?;
        let name = self.expect_identifier()?;
        self.expect("=")?;
        let literal = self.parse_literal()?;
        let def = ConstDef::new(self.model.name(), &name.text, ty, &literal, keyword.doc.clone())
            .map_err(|e| self.at(name, e))?;
        self.model.add_const(&*self.set, def).map_err(|e| self.at(name, e))?;
        Ok(())
    }

    fn parse_enum(&mut self) -> Result<(), CompileError> {
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        let mut builder = EnumBuilder::new(self.model.qname(&name.text), keyword.doc.clone());
        self.expect("{")?;
        while !self.eat("}") {
            let elem = self.expect_identifier()?;
            let added = if self.eat("=") {
                let value = self.current();
                if value.kind != TokenKind::Int {
                    return Err(self.error(value, format!("Expected integer but found {}", quote(&value.text))));
                }
                self.index += 1;
                let id = parse_int_literal(&value.text).map_err(|e| self.literal_error(value, e))?;
                builder.add_elem_with_id(&elem.text, id).map(|_| ())
            } else {
                builder.add_elem(&elem.text).map(|_| ())
            };
            added.map_err(|e| self.at(elem, e))?;
            self.parse_annotations()?;
            self.eat_separator();
        }
        self.parse_annotations()?;
        self.model
            .add_enum(self.set, &name.text, builder.build())
            .map_err(|e| self.at(name, e))?;
        Ok(())
    }

    fn parse_struct(&mut self, kind: StructKind) -> Result<(), CompileError> {
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        let qname = self.model.qname(&name.text);
        self.expect("{")?;
        self.declaring = Some((keyword, name));
        let fields = self.parse_fields(qname, "}")?;
        self.declaring = None;
        let annotations = self.parse_annotations()?;
        let def = StructType::new(fields, kind == StructKind::Union, annotations, keyword.doc.clone());
        let added = match kind {
            StructKind::Exception => self.model.add_exception(self.set, &name.text, def),
            _ => self.model.add_struct(self.set, &name.text, def),
        };
        added.map_err(|e| self.at(name, e))?;
        Ok(())
    }

    fn parse_fields(&mut self, owner: String, close: &str) -> Result<FieldSet, CompileError> {
        let mut fields = FieldSet::new(owner);
        while !self.eat(close) {
            let (tok, field) = self.parse_field()?;
            fields.add_field(field).map_err(|e| self.at(tok, e))?;
            self.eat_separator();
        }
        Ok(fields)
    }

    fn parse_field(&mut self) -> Result<(&'a Token, FieldDef), CompileError> {
        let id_tok = self.current();
        if id_tok.kind != TokenKind::Int {
            return Err(self.error(id_tok, format!("Expected field id but found {}", quote(&id_tok.text))));
        }
        self.index += 1;
        let id = parse_short_literal(&id_tok.text).map_err(|e| self.literal_error(id_tok, e))?;
        self.expect(":")?;
        // no qualifier means required
        let optional = self.eat("optional");
        if !optional {
            self.eat("required");
        }
        let ty = self.parse_type(false)?;
        let name = self.expect_identifier()?;
        let default = if self.eat("=") { Some(self.parse_literal()?) } else { None };
        let annotations = self.parse_annotations()?;
        let field = FieldDef::new(id, &name.text, ty, !optional, default.as_ref(), annotations, id_tok.doc.clone())
            .map_err(|e| self.at(name, e))?;
        Ok((id_tok, field))
    }

    fn parse_annotations(&mut self) -> Result<Annotations, CompileError> {
        let mut annotations = Annotations::new();
        if !self.eat("(") {
            return Ok(annotations);
        }
        while !self.eat(")") {
            let key = self.expect_name()?;
            let value = if self.eat("=") {
                let tok = self.current();
                let value = match tok.kind {
                    TokenKind::Str => parse_string_literal(&tok.text).map_err(|e| self.literal_error(tok, e))?,
                    TokenKind::Ident | TokenKind::Int | TokenKind::Double => tok.text.clone(),
                    _ => return Err(self.unexpected(tok)),
                };
                self.index += 1;
                value
            } else {
                String::new()
            };
            annotations.insert(key.text.clone(), value);
            self.eat_separator();
        }
        Ok(annotations)
    }

    fn parse_service(&mut self) -> Result<(), CompileError> {
        let keyword = self.advance();
        let name = self.expect_identifier()?;
        let parent = if self.eat("extends") {
            let parent = self.expect_name()?;
            let svc = self
                .model
                .get_service(&*self.set, &parent.text)
                .map_err(|e| self.at(parent, e))?;
            Some(svc)
        } else {
            None
        };
        let mut service = ServiceDef::new(self.model.name(), &name.text, parent, keyword.doc.clone());
        let qname = service.qname();
        self.expect("{")?;
        while !self.eat("}") {
            let first = self.current();
            let oneway = self.eat("oneway");
            let return_type = self.parse_type(true)?;
            let fname = self.expect_identifier()?;
            if oneway && !return_type.is_void() {
                return Err(self.error(fname, format!("Oneway function {} must return void", quote(&fname.text))));
            }
            self.expect("(")?;
            let args = self.parse_fields(FunctionDef::args_owner(&qname, &fname.text), ")")?;
            let throws_owner = FunctionDef::throws_owner(&qname, &fname.text);
            let throws = if self.eat("throws") {
                self.expect("(")?;
                self.parse_fields(throws_owner, ")")?
            } else {
                FieldSet::new(throws_owner)
            };
            if let Some(field) = throws.fields().iter().find(|f| !f.ty().is_exception()) {
                return Err(self.error(
                    fname,
                    format!("Type {} in throws clause is not an exception", quote(field.ty().name())),
                ));
            }
            self.parse_annotations()?;
            let function = FunctionDef::new(&fname.text, return_type, oneway, args, throws, first.doc.clone());
            service.add_function(function).map_err(|e| self.at(fname, e))?;
            self.eat_separator();
        }
        self.parse_annotations()?;
        self.model.add_service(&*self.set, service).map_err(|e| self.at(name, e))?;
        Ok(())
    }

    fn parse_type(&mut self, allow_void: bool) -> Result<TypeRef, CompileError> {
        let tok = self.current();
        if tok.kind != TokenKind::Ident {
            return Err(self.error(tok, format!("Expected type but found {}", quote(&tok.text))));
        }
        self.index += 1;
        match tok.text.as_str() {
            "void" if allow_void => Ok(VOID.clone()),
            "void" => Err(self.error(tok, "void is only allowed as a function return type".into())),
            "i8" => Ok(BYTE.clone()),
            "list" => {
                self.expect("<")?;
                let elem = self.parse_type(false)?;
                self.expect(">")?;
                Ok(self.set.list_type(&elem))
            }
            "set" => {
                self.expect("<")?;
                let elem = self.parse_type(false)?;
                self.expect(">")?;
                Ok(self.set.set_type(&elem))
            }
            "map" => {
                self.expect("<")?;
                let key = self.parse_type(false)?;
                self.expect(",")?;
                let value = self.parse_type(false)?;
                self.expect(">")?;
                Ok(self.set.map_type(&key, &value))
            }
            name => self.model.lookup_type(&*self.set, name).ok_or_else(|| match self.declaring {
                Some((keyword, decl)) if name == decl.text || name == self.model.qname(&decl.text) => self.error(
                    tok,
                    format!("{} {} cannot reference itself", keyword.text, quote(&decl.text)),
                ),
                _ => self.error(tok, format!("Unknown type {}", quote(name))),
            }),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, CompileError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Int => parse_long_literal(&tok.text)
                .map(Literal::Int)
                .map_err(|e| self.literal_error(tok, e)),
            TokenKind::Double => tok
                .text
                .parse::<f64>()
                .map(Literal::Double)
                .map_err(|_| self.error(tok, format!("Invalid double literal {}", quote(&tok.text)))),
            TokenKind::Str => parse_string_literal(&tok.text)
                .map(Literal::Str)
                .map_err(|e| self.literal_error(tok, e)),
            TokenKind::Char => parse_char_literal(&tok.text)
                .map(Literal::Char)
                .map_err(|e| self.literal_error(tok, e)),
            TokenKind::Punct if tok.is("[") => {
                let mut items = Vec::new();
                while !self.eat("]") {
                    items.push(self.parse_literal()?);
                    self.eat_separator();
                }
                Ok(Literal::List(items))
            }
            TokenKind::Punct if tok.is("{") => {
                let mut entries = Vec::new();
                while !self.eat("}") {
                    let key = self.parse_literal()?;
                    self.expect(":")?;
                    let value = self.parse_literal()?;
                    entries.push((key, value));
                    self.eat_separator();
                }
                Ok(Literal::Map(entries))
            }
            TokenKind::Ident => match tok.text.as_str() {
                "true" => Ok(Literal::Bool(true)),
                "false" => Ok(Literal::Bool(false)),
                "null" => Ok(Literal::Null),
                name => match self.model.lookup(&*self.set, name) {
                    Some(Symbol::Const(def)) => Ok(Literal::Const(def)),
                    Some(Symbol::EnumElem(elem)) => Ok(Literal::Enum(elem)),
                    Some(other) => Err(self.error(
                        tok,
                        format!("{} names a {}, not a constant or enum element", quote(name), other.kind()),
                    )),
                    None => Err(self.error(tok, format!("Unknown constant {}", quote(name)))),
                },
            },
            _ => Err(self.unexpected(tok)),
        }
    }
}
