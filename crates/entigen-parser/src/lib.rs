//! # entigen-parser
//!
//! ast-grep-based Java parsing and entity model extraction for entigen.
//!
//! Pipeline for one file:
//! - [`parser::parse_source`] builds the tree-sitter tree through ast-grep
//! - [`syntax::CompilationUnit`] lowers it into an owned declaration model
//! - [`visitor::parse_entity`] resolves types and annotations into an
//!   [`entigen_core::Entity`], or `None` when the file declares no entity
//!
//! [`schema::parse_files`] drives many files, groups entities by schema, and
//! runs the [`relations`] post-processor over each group.

pub mod annotations;
pub mod parser;
pub mod relations;
pub mod resolve;
pub mod schema;
pub mod syntax;
pub mod visitor;

pub use parser::{AstTree, parse_source};
pub use relations::process_schema;
pub use resolve::{AmbiguousImport, TypeResolver};
pub use schema::{group_by_schema, parse_file, parse_files};
pub use syntax::CompilationUnit;
pub use visitor::{parse_entity, visit_unit};
