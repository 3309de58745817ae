//! # entigen-merge
//!
//! Merges generated declarations back into existing Java source.
//!
//! - [`template`] renders candidate code and stamps it with
//!   `@Generated(hash = N)`
//! - [`transformer::MergeSession`] decides per declaration whether to insert,
//!   replace, keep or delete, based on provenance markers and structural
//!   equality
//! - [`rewrite::RewriteSession`] buffers the resulting text edits
//! - [`format::CodeFormatter`] lays out candidate code for its position
//!
//! ```no_run
//! use entigen_config::FormatterConfig;
//! use entigen_merge::{GeneratedCode, IndentFormatter, MergeSession};
//!
//! # fn main() -> Result<(), entigen_core::CoreError> {
//! let source = std::fs::read_to_string("Note.java")?;
//! let ctor = GeneratedCode::stamp("public Note() {\n}");
//! let mut merge = MergeSession::new(&source, "Note", &FormatterConfig::default(), &IndentFormatter)?;
//! merge.ensure_import("io.objectbox.annotation.Generated");
//! merge.define_constructor(&[] as &[&str], &ctor.text)?;
//! if let Some(updated) = merge.write_to_string()? {
//!     std::fs::write("Note.java", updated)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod format;
pub mod rewrite;
pub mod signature;
pub mod template;
pub mod transformer;

pub use format::{CodeFormatter, IndentFormatter};
pub use rewrite::{EditOverlap, RewriteSession};
pub use signature::{DeclKind, Signature};
pub use template::{Bindings, GeneratedCode, PlaceholderRenderer, TemplateError, TemplateRenderer};
pub use transformer::{Diagnostic, MergeAction, MergeSession};
