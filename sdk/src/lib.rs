//! brine-thrift
//!
//! This crate drives code generation from Thrift IDL models.
//!
//! - `Engine` resolves a genspec's option cascade and runs each generator entry
//! - `Generator` trait plus `GeneratorRegistry` for selecting backends by name
//! - `TemplateGenerator`, the default backend, renders minijinja templates
//! - `naming` helpers (case conversion filters) for templates
//!
//! ```no_run
//! use brine_thrift::{Engine, Section};
//!
//! let mut options = Section::new();
//! options.insert("genspec_file".into(), "codegen.gen".into());
//! let report = Engine::new(options)?.run()?;
//! println!("{} generator(s) ran", report.succeeded);
//! # Ok::<(), brine_thrift::GenError>(())
//! ```

pub mod engine;
pub mod error;
pub mod naming;
pub mod options;
pub mod registry;
pub mod template;
pub mod traits;
pub mod view;

pub use engine::{Engine, GeneratorEntry, RunReport};
pub use error::GenError;
pub use options::Section;
pub use registry::{GeneratorRegistry, HelperRegistry, DEFAULT_GENERATOR};
pub use template::TemplateGenerator;
pub use traits::Generator;

pub mod schema {
    pub use brine_thrift_schema::*;
}

pub mod compiler {
    pub use brine_thrift_compiler::{load_genspec, load_model, parse_genspec, parse_model, CompileError, FileRef};
}
