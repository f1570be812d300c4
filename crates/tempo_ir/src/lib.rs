//! TempoIR — the node graph for clocked state elements.
//!
//! This crate defines the five node kinds modeling synchronous hardware state
//! ([`NodeKind`]): read/write memory port accessors, multi-port memory
//! declarations, and two clocked register flavors. Nodes live in a [`Block`],
//! a straight-line region that owns the values they define, the interned
//! [`TypeDb`], and an incrementally maintained use count per value.

#![warn(missing_docs)]

pub mod arena;
pub mod attr;
pub mod block;
pub mod ids;
pub mod node;
pub mod types;

pub use arena::{Arena, ArenaId};
pub use attr::{AttrMap, AttrValue};
pub use block::{Block, Value, ValueDef};
pub use ids::{NodeId, TypeId, ValueId};
pub use node::{CompRegNode, FirRegNode, MemoryNode, Node, NodeKind, ResetSpec};
pub use types::{address_width, Type, TypeDb};
