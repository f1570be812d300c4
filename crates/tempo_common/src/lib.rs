//! Shared foundational types for the Tempo IR front end.
//!
//! This crate provides interned identifiers used for symbol names throughout
//! the node graph, plus the common result type for internal invariant failures.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, TempoResult};
