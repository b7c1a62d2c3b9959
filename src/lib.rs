//! Generates OpenAPI 3.0 documents from annotation comments in Go source.
//!
//! The pipeline: index every package of the module (and its cached
//! dependencies), collect type declarations and import aliases, parse the
//! document-level directives from the main file, then walk every handler
//! doc comment and resolve referenced Go types into component schemas.

pub mod generator;
pub mod gosrc;
pub mod index;
pub mod models;
pub mod parser;
pub mod schema;
