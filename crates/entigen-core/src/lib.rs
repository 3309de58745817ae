//! # entigen-core
//!
//! Entity model types, structural hashing, and error types for entigen.
//!
//! This crate provides the foundational types shared across all entigen crates:
//! - The entity model produced by the parser (properties, relations, indexes,
//!   constructors, methods) with their provenance hints
//! - The whitespace-insensitive structural hash used for provenance markers
//! - The error kinds every stage of the pipeline can raise

pub mod errors;
pub mod hash;
pub mod model;

pub use errors::{CoreError, Location};
pub use model::*;
