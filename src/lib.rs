//! # Schemagen: Schema-Driven Multi-Target Code Generation
//!
//! Schemagen parses MDB/Jet table-definition dumps into a language-neutral
//! class model and emits source code for multiple target languages from
//! that single model.
//!
//! ## Features
//!
//! - **Schema parsing**: Line-oriented `CREATE TABLE` dump parser with a
//!   closed semantic type system and fail-soft error recovery
//! - **Class model**: Immutable, order-preserving intermediate
//!   representation shared by all backends
//! - **Naming engine**: Per-target case rules, prefixes/suffixes, and
//!   data-driven reserved-word substitution
//! - **Backends**: C++ (value class + positional ODBC DAO) and Python
//!   (dataclass + positional row binding), both pure and deterministic
//! - **Pipeline**: Fail-soft orchestration with attributable failure
//!   records, or strict mode for CI
//!
//! ## Example
//!
//! ```no_run
//! use schemagen::backend;
//! use schemagen::parser::SchemaParser;
//! use schemagen::pipeline::Pipeline;
//!
//! let schema = std::fs::read_to_string("schema.txt").unwrap();
//! let pipeline = Pipeline::new(SchemaParser::new())
//!     .backend(backend::by_id("cpp").unwrap())
//!     .backend(backend::by_id("python").unwrap());
//! let generation = pipeline.run_text(&schema, &["swim".to_string()]).unwrap();
//! for (backend_id, files) in &generation.files {
//!     for file in files {
//!         println!("{}/{}", backend_id, file.path);
//!     }
//! }
//! ```

// Core model
pub mod error;
pub mod model;
pub mod types;

// Schema ingestion
pub mod parser;

// Generation
pub mod backend;
pub mod config;
pub mod naming;
pub mod pipeline;

// Materialization
pub mod fs_utils;

pub use backend::{Backend, GeneratedFile};
pub use error::{Failure, FailureKind, GenError};
pub use model::{Access, Clss, Member};
pub use parser::{ParsedSchema, SchemaParser};
pub use pipeline::{Generation, Pipeline};
pub use types::{ColumnType, FloatPrecision, IntWidth};
