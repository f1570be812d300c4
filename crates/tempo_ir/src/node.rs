//! Node definitions for the five clocked state-element kinds.
//!
//! A [`Node`] is one operation in a block: a memory port accessor, a
//! multi-port memory declaration, or a clocked register. Everything a node's
//! grammar understands is a typed field on its kind; only pass-through
//! attributes live in the [`AttrMap`](crate::attr::AttrMap). The reset
//! configuration of a register is a single `Option<ResetSpec>`, so a reset
//! operand without a reset value cannot be represented at all.

use crate::attr::AttrMap;
use crate::ids::{NodeId, TypeId, ValueId};
use serde::{Deserialize, Serialize};
use tempo_common::Ident;
use tempo_source::Span;

/// A register's reset operand pair: the reset trigger and the value the
/// register assumes when it fires. Always both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSpec {
    /// The 1-bit reset trigger.
    pub reset: ValueId,
    /// The value loaded while the reset is active. Same type as the register.
    pub value: ValueId,
}

/// A multi-port memory declaration.
///
/// Declares `read_ports` read capabilities followed by `write_ports` write
/// capabilities as its results, in that fixed order. Each result is a
/// single-use capability token; fan-out must go through additional accessor
/// nodes, never by aliasing a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryNode {
    /// The memory's global symbol name (`@ram0`).
    pub sym: Ident,
    /// The 1-bit clock operand.
    pub clock: ValueId,
    /// Number of read ports (result indices `0..read_ports`).
    pub read_ports: u32,
    /// Number of write ports (result indices `read_ports..read_ports + write_ports`).
    pub write_ports: u32,
    /// The element-array type of the storage.
    pub memory_type: TypeId,
    /// Extra attributes passed through from the attribute dictionary.
    pub attrs: AttrMap,
}

/// A simple clocked register: two operands without reset, four with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompRegNode {
    /// The data input.
    pub input: ValueId,
    /// The 1-bit clock operand.
    pub clock: ValueId,
    /// Optional reset pair.
    pub reset: Option<ResetSpec>,
    /// Optional global symbol name.
    pub sym: Option<Ident>,
    /// Display name; empty means anonymous.
    pub name: String,
    /// Extra attributes passed through from the attribute dictionary.
    pub attrs: AttrMap,
}

/// A transfer register with a keyword-spelled reset clause.
///
/// `is_async` without a reset pair is representable (via the builder or an
/// `isAsync` attribute) and is exactly what verification rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirRegNode {
    /// The next-state input.
    pub next: ValueId,
    /// The 1-bit clock operand.
    pub clock: ValueId,
    /// Optional reset pair.
    pub reset: Option<ResetSpec>,
    /// Whether the reset fires asynchronously.
    pub is_async: bool,
    /// Optional inner symbol.
    pub inner_sym: Option<Ident>,
    /// Display name; empty means anonymous.
    pub name: String,
    /// Extra attributes passed through from the attribute dictionary.
    pub attrs: AttrMap,
}

/// The kind of a node, with all schema-known fields typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Reads one element from a memory through a read-port capability.
    ReadPort {
        /// The read-port capability operand.
        port: ValueId,
        /// The element address, `address_width(size)` bits wide.
        address: ValueId,
    },
    /// Writes one element to a memory through a write-port capability.
    WritePort {
        /// The write-port capability operand.
        port: ValueId,
        /// The element address, `address_width(size)` bits wide.
        address: ValueId,
        /// The data to store; the memory's element type.
        data: ValueId,
    },
    /// A multi-port memory declaration.
    Memory(MemoryNode),
    /// A simple clocked register.
    CompReg(CompRegNode),
    /// A transfer register with sync/async reset flavors.
    FirReg(FirRegNode),
}

impl NodeKind {
    /// Returns the node's operands in source order.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            NodeKind::ReadPort { port, address } => vec![*port, *address],
            NodeKind::WritePort {
                port,
                address,
                data,
            } => vec![*port, *address, *data],
            NodeKind::Memory(mem) => vec![mem.clock],
            NodeKind::CompReg(reg) => {
                let mut ops = vec![reg.input, reg.clock];
                if let Some(rs) = reg.reset {
                    ops.push(rs.reset);
                    ops.push(rs.value);
                }
                ops
            }
            NodeKind::FirReg(reg) => {
                let mut ops = vec![reg.next, reg.clock];
                if let Some(rs) = reg.reset {
                    ops.push(rs.reset);
                    ops.push(rs.value);
                }
                ops
            }
        }
    }

    /// Returns the operation mnemonic used in the textual form.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            NodeKind::ReadPort { .. } => "read",
            NodeKind::WritePort { .. } => "write",
            NodeKind::Memory(_) => "hlmem",
            NodeKind::CompReg(_) => "compreg",
            NodeKind::FirReg(_) => "firreg",
        }
    }
}

/// One operation in a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// This node's ID within its block.
    pub id: NodeId,
    /// The node kind with its typed fields.
    pub kind: NodeKind,
    /// The values this node defines, in result order.
    pub results: Vec<ValueId>,
    /// Source location, or [`Span::DUMMY`] for builder-created nodes.
    pub span: Span,
}

impl Node {
    /// Returns the node's operands in source order.
    pub fn operands(&self) -> Vec<ValueId> {
        self.kind.operands()
    }

    /// Returns the display name for registers, `None` for other kinds.
    pub fn display_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::CompReg(reg) => Some(&reg.name),
            NodeKind::FirReg(reg) => Some(&reg.name),
            _ => None,
        }
    }

    /// Returns the value of read port `idx` of a memory declaration.
    ///
    /// Read port `i` is result index `i`.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a memory or `idx` is out of range.
    pub fn read_port(&self, idx: u32) -> ValueId {
        let NodeKind::Memory(mem) = &self.kind else {
            panic!("read_port called on {} node", self.kind.mnemonic());
        };
        assert!(idx < mem.read_ports, "read port index out of range");
        self.results[idx as usize]
    }

    /// Returns the value of write port `idx` of a memory declaration.
    ///
    /// Write port `i` is result index `read_ports + i`.
    ///
    /// # Panics
    ///
    /// Panics if this node is not a memory or `idx` is out of range.
    pub fn write_port(&self, idx: u32) -> ValueId {
        let NodeKind::Memory(mem) = &self.kind else {
            panic!("write_port called on {} node", self.kind.mnemonic());
        };
        assert!(idx < mem.write_ports, "write port index out of range");
        self.results[(mem.read_ports + idx) as usize]
    }
}
