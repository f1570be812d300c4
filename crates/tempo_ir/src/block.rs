//! The block container: values, nodes, and incrementally maintained use counts.
//!
//! A [`Block`] is the straight-line region state-element nodes live in. It
//! owns the [`TypeDb`], the values defined by block arguments and node
//! results, and the nodes themselves. Registering a node bumps the use count
//! of each of its operands, so verification reads a counter instead of
//! walking the whole graph. A node is only registered once fully formed;
//! there is no partial state to roll back.

use crate::arena::Arena;
use crate::attr::AttrMap;
use crate::ids::{NodeId, TypeId, ValueId};
use crate::node::{CompRegNode, FirRegNode, MemoryNode, Node, NodeKind, ResetSpec};
use crate::types::{Type, TypeDb};
use serde::{Deserialize, Serialize};
use tempo_common::Ident;
use tempo_source::Span;

/// Where a value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueDef {
    /// A block argument seeded by the host environment.
    Argument {
        /// Position in the block's argument list.
        index: u32,
        /// The textual handle the argument is known by (without the `%` sigil).
        name: String,
    },
    /// A result of a node in this block.
    Result {
        /// The defining node.
        node: NodeId,
        /// Result position within the defining node.
        index: u32,
    },
}

/// A typed value: a block argument or a node result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Value {
    /// This value's ID within its block.
    pub id: ValueId,
    /// The value's type.
    pub ty: TypeId,
    /// Where the value is defined.
    pub def: ValueDef,
    /// Number of operand slots referencing this value, maintained by
    /// [`Block`] as nodes are registered.
    pub uses: u32,
}

/// A straight-line region of state-element nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    /// Interned types for this block.
    pub types: TypeDb,
    /// All values defined in this block.
    pub values: Arena<ValueId, Value>,
    /// All nodes in this block, in statement order.
    pub nodes: Arena<NodeId, Node>,
    /// The block arguments, in seeding order.
    pub args: Vec<ValueId>,
}

impl Block {
    /// Creates an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a block argument with the given textual handle and type.
    pub fn add_argument(&mut self, name: impl Into<String>, ty: TypeId) -> ValueId {
        let index = self.args.len() as u32;
        let id = self.values.next_id();
        self.values.alloc(Value {
            id,
            ty,
            def: ValueDef::Argument {
                index,
                name: name.into(),
            },
            uses: 0,
        });
        self.args.push(id);
        id
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    /// Returns the value with the given ID.
    pub fn value(&self, id: ValueId) -> &Value {
        self.values.get(id)
    }

    /// Returns the type of a value.
    pub fn value_type(&self, id: ValueId) -> TypeId {
        self.values.get(id).ty
    }

    /// Returns the number of operand slots referencing a value.
    pub fn use_count(&self, id: ValueId) -> u32 {
        self.values.get(id).uses
    }

    /// Registers a fully formed node, allocating its result values and
    /// bumping the use count of each operand.
    ///
    /// This is the single registration point for both the parser and the
    /// builder methods below; nothing is recorded for a node that fails
    /// before reaching it.
    pub fn add_node(&mut self, kind: NodeKind, result_types: &[TypeId], span: Span) -> NodeId {
        let node_id = self.nodes.next_id();

        for operand in kind.operands() {
            self.values.get_mut(operand).uses += 1;
        }

        let results: Vec<ValueId> = result_types
            .iter()
            .enumerate()
            .map(|(index, &ty)| {
                let id = self.values.next_id();
                self.values.alloc(Value {
                    id,
                    ty,
                    def: ValueDef::Result {
                        node: node_id,
                        index: index as u32,
                    },
                    uses: 0,
                });
                id
            })
            .collect();

        self.nodes.alloc(Node {
            id: node_id,
            kind,
            results,
            span,
        })
    }

    /// Builds a simple clocked register. The result takes the input's type.
    #[allow(clippy::too_many_arguments)]
    pub fn add_comp_reg(
        &mut self,
        input: ValueId,
        clock: ValueId,
        reset: Option<ResetSpec>,
        sym: Option<Ident>,
        name: impl Into<String>,
        attrs: AttrMap,
        span: Span,
    ) -> NodeId {
        let ty = self.value_type(input);
        self.add_node(
            NodeKind::CompReg(CompRegNode {
                input,
                clock,
                reset,
                sym,
                name: name.into(),
                attrs,
            }),
            &[ty],
            span,
        )
    }

    /// Builds a transfer register. The result takes the next operand's type.
    ///
    /// `is_async` may be set without a reset pair; verification rejects that
    /// combination, not this builder.
    #[allow(clippy::too_many_arguments)]
    pub fn add_fir_reg(
        &mut self,
        next: ValueId,
        clock: ValueId,
        reset: Option<ResetSpec>,
        is_async: bool,
        inner_sym: Option<Ident>,
        name: impl Into<String>,
        attrs: AttrMap,
        span: Span,
    ) -> NodeId {
        let ty = self.value_type(next);
        self.add_node(
            NodeKind::FirReg(FirRegNode {
                next,
                clock,
                reset,
                is_async,
                inner_sym,
                name: name.into(),
                attrs,
            }),
            &[ty],
            span,
        )
    }

    /// Builds a multi-port memory declaration, synthesizing `read_ports`
    /// read-capability results followed by `write_ports` write-capability
    /// results over the given array type.
    #[allow(clippy::too_many_arguments)]
    pub fn add_memory(
        &mut self,
        sym: Ident,
        clock: ValueId,
        read_ports: u32,
        write_ports: u32,
        memory_type: TypeId,
        attrs: AttrMap,
        span: Span,
    ) -> NodeId {
        let read_ty = self.types.intern(Type::ReadPort {
            memory: memory_type,
        });
        let write_ty = self.types.intern(Type::WritePort {
            memory: memory_type,
        });

        let mut result_types = Vec::with_capacity((read_ports + write_ports) as usize);
        result_types.extend(std::iter::repeat(read_ty).take(read_ports as usize));
        result_types.extend(std::iter::repeat(write_ty).take(write_ports as usize));

        self.add_node(
            NodeKind::Memory(MemoryNode {
                sym,
                clock,
                read_ports,
                write_ports,
                memory_type,
                attrs,
            }),
            &result_types,
            span,
        )
    }

    /// Builds a read-port accessor. The result takes the memory's element type.
    ///
    /// # Panics
    ///
    /// Panics if `port` is not a read-port-capability value.
    pub fn add_read_port(&mut self, port: ValueId, address: ValueId, span: Span) -> NodeId {
        let port_ty = self.value_type(port);
        let element = match self.types.get(port_ty) {
            Type::ReadPort { memory } => {
                let memory = *memory;
                self.types
                    .as_array(memory)
                    .map(|(element, _)| element)
                    .expect("read-port type must wrap an array")
            }
            _ => panic!("read accessor port operand must be a read-port value"),
        };
        self.add_node(NodeKind::ReadPort { port, address }, &[element], span)
    }

    /// Builds a write-port accessor. Produces no results.
    ///
    /// # Panics
    ///
    /// Panics if `port` is not a write-port-capability value.
    pub fn add_write_port(
        &mut self,
        port: ValueId,
        address: ValueId,
        data: ValueId,
        span: Span,
    ) -> NodeId {
        let port_ty = self.value_type(port);
        assert!(
            matches!(self.types.get(port_ty), Type::WritePort { .. }),
            "write accessor port operand must be a write-port value"
        );
        self.add_node(
            NodeKind::WritePort {
                port,
                address,
                data,
            },
            &[],
            span,
        )
    }
}
