//! brine-thrift-compiler
//!
//! This crate implements:
//!  1) Literal lexing helpers shared by both parsers (`utils`),
//!  2) A tokenizer + parser for Thrift-style `.thrift` IDL files, producing
//!     models registered in a `ModelSet`,
//!  3) A tokenizer + parser for `.gen` genspec files, producing an ordered
//!     `serde_json` tree,
//!  4) `FileRef`, which reads local paths and `http(s):` URLs alike,
//!  5) Error types (`CompileError`, `LiteralError`).

pub mod error;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod genspec;
pub mod source;
pub mod compiler;

pub use compiler::{load_genspec, load_model, parse_anonymous_model, parse_model};
pub use error::{CompileError, LiteralError};
pub use genspec::parse_genspec;
pub use source::FileRef;
