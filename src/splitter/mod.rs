//! # splitter
//!
//! Passive splitter catalog and the properties of splitter nodes.
//! Use [`catalog::lookup`] to resolve a splitter type name; [`SplitterProps`] keeps the
//! catalog-derived fields of a placed splitter in sync with its type.

pub mod catalog;
pub mod types;

pub use catalog::CatalogEntry;
pub use types::splitter::{SplitterCategory, SplitterLoss, SplitterProps};
