//! In-memory model of Thrift-style IDL: types, constants, enums, structs,
//! services and the [`ModelSet`] that ties models from several files
//! together.
//!
//! ```
//! use brine_thrift_schema::*;
//!
//! let mut set = ModelSet::new();
//! let mut model = set.create_model("shapes").unwrap();
//!
//! let mut fields = FieldSet::new("shapes.Point");
//! fields.add_field(FieldDef::simple(1, "x", I32.clone())).unwrap();
//! fields.add_field(FieldDef::simple(2, "y", I32.clone())).unwrap();
//! let point = model
//!     .add_struct(&mut set, "Point", StructType::new(fields, false, Annotations::new(), None))
//!     .unwrap();
//! let model = set.finish_model(model);
//!
//! assert_eq!(point.qname(), "shapes.Point");
//! assert_eq!(model.structs().len(), 1);
//! assert!(std::sync::Arc::ptr_eq(&set.list_type(&I32), &set.list_type(&I32)));
//! ```

pub mod defs;
pub mod enum_type;
pub mod error;
pub mod field;
pub mod model;
pub mod model_set;
pub mod service;
pub mod struct_type;
pub mod types;
pub mod value;

pub use defs::*;
pub use enum_type::*;
pub use error::*;
pub use field::*;
pub use model::*;
pub use model_set::*;
pub use service::*;
pub use struct_type::*;
pub use types::*;
pub use value::*;
