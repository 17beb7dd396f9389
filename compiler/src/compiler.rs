use crate::{
    error::CompileError,
    genspec::parse_genspec,
    parser::parse_idl,
    source::FileRef,
    tokenizer::tokenize_idl,
};
use brine_thrift_schema::{Model, ModelSet};
use serde_json::{Map, Value};
use tracing::{debug, info};

use std::sync::Arc;

/// Reads and parses an IDL file into `set`. The model is named after the
/// file, minus a trailing `.thrift`.
pub fn load_model(set: &mut ModelSet, source: &FileRef) -> Result<Arc<Model>, CompileError> {
    let name = source.model_name().ok_or_else(|| CompileError::Io {
        file:   source.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no model file specified"),
    })?;
    let text = source.read_to_string()?;
    parse_model(set, &name, &text, source)
}

/// Parses IDL text as the model `name`. `origin` locates included files
/// and names the source in errors.
pub fn parse_model(set: &mut ModelSet, name: &str, text: &str, origin: &FileRef) -> Result<Arc<Model>, CompileError> {
    let model = set.create_model(name).map_err(|source| CompileError::ModelError {
        file: origin.to_string(),
        line: 0,
        column: 0,
        source,
    })?;
    let file = if origin.is_empty() { name.to_string() } else { origin.to_string() };
    let parsed = tokenize_idl(&file, text).and_then(|tokens| parse_idl(set, model, &tokens, origin));
    match parsed {
        Ok(model) => {
            let model = set.finish_model(model);
            info!("loaded model {} from {}", name, file);
            Ok(model)
        }
        Err(err) => {
            set.abandon_model(name);
            Err(err)
        }
    }
}

/// Parses IDL text into a model with no name. Its declarations are not
/// qualified and other models cannot include it.
pub fn parse_anonymous_model(set: &mut ModelSet, text: &str, origin: &FileRef) -> Result<Arc<Model>, CompileError> {
    let model = set.create_anonymous_model();
    let tokens = tokenize_idl(&origin.to_string(), text)?;
    let model = parse_idl(set, model, &tokens, origin)?;
    Ok(set.finish_model(model))
}

pub fn load_genspec(source: &FileRef) -> Result<Map<String, Value>, CompileError> {
    let text = source.read_to_string()?;
    debug!("parsing genspec {}", source);
    parse_genspec(&source.to_string(), &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_thrift_schema::{Category, ModelError, Symbol, Value as ModelValue};

    fn parse(text: &str) -> Result<Arc<Model>, CompileError> {
        let mut set = ModelSet::new();
        parse_model(&mut set, "m", text, &FileRef::Empty)
    }

    #[test]
    fn test_declarations() {
        let mut set = ModelSet::new();
        let model = parse_model(
            &mut set,
            "shapes",
            r#"
            namespace * shapes
            /** Kinds of shape. */
            enum Kind { CIRCLE, SQUARE = 4, TRIANGLE }
            const i32 SIDES = 4
            const Kind DEFAULT_KIND = Kind.SQUARE;
            struct Point { 1: required double x, 2: optional double y = 0 }
            union Either { 1: i32 i; 2: string s }
            exception Oops { 1: string why }
            service Painter {
                void draw(1: Point at, 2: Kind kind = Kind.CIRCLE) throws (1: Oops err),
                oneway void reset()
            }
            "#,
            &FileRef::Empty,
        )
        .unwrap();

        assert_eq!(model.namespace("rs"), Some("shapes"));
        let kind = &model.enums()[0];
        assert_eq!(kind.as_enum().unwrap().doc_comments(), Some(&["Kinds of shape.".to_string()][..]));
        let ids: Vec<i32> = kind.as_enum().unwrap().elements().iter().map(|e| e.value()).collect();
        assert_eq!(ids, vec![0, 4, 5]);

        match model.lookup(&set, "DEFAULT_KIND") {
            Some(Symbol::Const(def)) => assert_eq!(def.value().as_int(), Some(4)),
            other => panic!("unexpected {:?}", other),
        }

        let point = model.structs()[0].as_struct().unwrap();
        assert!(point.field("x").unwrap().is_required());
        assert!(!point.field("y").unwrap().is_required());
        assert_eq!(point.field("y").unwrap().default_value(), Some(&ModelValue::Double(0.0)));
        assert!(model.structs()[1].is_union());
        assert_eq!(model.exceptions()[0].category(), Category::Exception);

        let painter = &model.services()[0];
        let draw = painter.get_function("draw").unwrap();
        assert_eq!(draw.args().len(), 2);
        assert_eq!(draw.throws().fields()[0].ty().name(), "Oops");
        assert!(painter.get_function("reset").unwrap().is_oneway());
    }

    #[test]
    fn test_containers_and_constants() {
        let mut set = ModelSet::new();
        let model = parse_model(
            &mut set,
            "m",
            r#"
            const list<i16> SMALL = [1, 2, 3]
            const map<string, list<i32>> LOOKUP = { "a": [1], "b": [] }
            const set<string> TAGS = ["x", "y", "x"]
            const double RATIO = SMALL_MAX
            "#,
            &FileRef::Empty,
        );
        // SMALL_MAX is not declared
        assert!(matches!(model, Err(CompileError::ParseError { .. })));

        let model = parse_model(
            &mut set,
            "m",
            "const i64 BIG = 0x7fffffff\nconst double RATIO = BIG\nconst set<string> TAGS = [\"x\", \"y\", \"x\"]",
            &FileRef::Empty,
        )
        .unwrap();
        match model.lookup(&set, "RATIO") {
            Some(Symbol::Const(def)) => assert_eq!(def.value(), &ModelValue::Double(2147483647.0)),
            other => panic!("unexpected {:?}", other),
        }
        match model.lookup(&set, "TAGS") {
            Some(Symbol::Const(def)) => assert_eq!(
                def.value(),
                &ModelValue::Set(vec![ModelValue::Str("x".into()), ModelValue::Str("y".into())])
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_model_can_be_reparsed() {
        let mut set = ModelSet::new();
        assert!(parse_model(&mut set, "m", "struct {", &FileRef::Empty).is_err());
        assert!(!set.is_pending("m"));
        assert!(parse_model(&mut set, "m", "struct S {}", &FileRef::Empty).is_ok());
    }

    #[test]
    fn test_reparse_rebuilds_containers_of_local_types() {
        let mut set = ModelSet::new();
        let broken = "struct S { 1: i32 a }\nstruct T { 1: list<S> xs }\nstruct {";
        assert!(parse_model(&mut set, "m", broken, &FileRef::Empty).is_err());
        assert!(set.get_type("list<m.S>").is_none());

        let fixed = "struct S { 1: i32 a }\nstruct T { 1: list<S> xs }";
        let model = parse_model(&mut set, "m", fixed, &FileRef::Empty).unwrap();
        let s = &model.structs()[0];
        let xs = model.structs()[1].as_struct().unwrap().field("xs").unwrap().ty();
        assert!(Arc::ptr_eq(xs.element_types()[0], s));
        assert!(Arc::ptr_eq(&set.get_type("list<m.S>").unwrap(), xs));
    }

    #[test]
    fn test_self_referencing_struct_is_reported() {
        for text in ["struct Node { 1: list<Node> kids }", "exception Oops { 1: m.Oops cause }"] {
            match parse(text).unwrap_err() {
                CompileError::ParseError { msg, line, .. } => {
                    assert!(msg.contains("cannot reference itself"), "{}", msg);
                    assert_eq!(line, 1);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        match parse("struct A { 1: B b }").unwrap_err() {
            CompileError::ParseError { msg, .. } => assert_eq!(msg, "Unknown type \"B\""),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_model_errors_carry_location() {
        let err = parse("struct A { 1: i32 a,\n 1: i32 b }").unwrap_err();
        match err {
            CompileError::ModelError { line, source, .. } => {
                assert_eq!(line, 2);
                assert!(matches!(source, ModelError::DuplicateFieldId { id: 1, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse("const byte B = 128").unwrap_err(),
            CompileError::ModelError { source: ModelError::OutOfRange { .. }, .. }
        ));
        assert!(matches!(
            parse("struct A {}\nenum A { X }").unwrap_err(),
            CompileError::ModelError { source: ModelError::NameAlreadyDefined { .. }, .. }
        ));
    }

    #[test]
    fn test_grammar_errors() {
        assert!(parse("struct S { 1: void v }").is_err());
        assert!(parse("struct S { 1: Missing m }").is_err());
        assert!(parse("service S { oneway i32 f() }").is_err());
        assert!(parse("struct S {}\nservice T { void f() throws (1: S s) }").is_err());
        assert!(parse("service T extends Nope {}").is_err());
        assert!(parse("typedef i32 Id").is_err());
    }

    #[test]
    fn test_anonymous_model_is_unqualified() {
        let mut set = ModelSet::new();
        let model = parse_anonymous_model(&mut set, "struct S { 1: i32 a }", &FileRef::Empty).unwrap();
        assert_eq!(model.structs()[0].qname(), "S");
        assert!(set.get_type("S").is_some());
        assert!(set.models().is_empty());
    }
}
