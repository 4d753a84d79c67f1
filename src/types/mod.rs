//! # types
//!
//! Crate-wide building blocks shared by every module: persistent ids, diagram settings and errors.

pub mod errors;
pub mod ids;
pub mod settings;
