//! Printing of blocks back to their textual form.
//!
//! Printing is a pure function from a block to a string: a first pass assigns
//! every value a unique handle via [`NameTable`], then each node is rendered
//! as the exact inverse of its grammar. Name clauses are elided when they are
//! redundant with the assigned handle, which keeps re-parsing the printed text
//! a fixed point on the name attribute.

use crate::names::{can_elide_name, NameTable};
use std::collections::HashMap;
use tempo_common::Interner;
use tempo_ir::{AttrValue, Block, Node, NodeId, NodeKind, Type, TypeDb, TypeId, ValueDef, ValueId};

/// Formats a type as it is spelled in source text.
pub fn format_type(types: &TypeDb, id: TypeId) -> String {
    match types.get(id) {
        Type::UInt { width } => format!("i{width}"),
        Type::Array { element, size } => {
            format!("array<{size} x {}>", format_type(types, *element))
        }
        Type::ReadPort { memory } => format!("readport<{}>", format_type(types, *memory)),
        Type::WritePort { memory } => format!("writeport<{}>", format_type(types, *memory)),
    }
}

/// Assigns a unique textual handle (with `%` sigil) to every value.
///
/// Arguments claim their seeded names; register results suggest their display
/// name, memory results suggest `read{i}`/`write{i}`, and read accessor
/// results suggest `data`. Anonymous values get sequential numerals.
pub fn assign_handles(block: &Block) -> HashMap<ValueId, String> {
    let mut table = NameTable::new();
    let mut handles = HashMap::new();

    for &arg in &block.args {
        let name = match &block.value(arg).def {
            ValueDef::Argument { name, .. } => name.clone(),
            _ => String::new(),
        };
        handles.insert(arg, format!("%{}", table.claim(&name)));
    }

    for (_, node) in block.nodes.iter() {
        for (i, &result) in node.results.iter().enumerate() {
            let suggestion = result_name_suggestion(node, i);
            handles.insert(result, format!("%{}", table.assign(&suggestion)));
        }
    }

    handles
}

fn result_name_suggestion(node: &Node, index: usize) -> String {
    match &node.kind {
        NodeKind::ReadPort { .. } => "data".to_string(),
        NodeKind::WritePort { .. } => String::new(),
        NodeKind::Memory(mem) => {
            let idx = index as u32;
            if idx < mem.read_ports {
                format!("read{idx}")
            } else {
                format!("write{}", idx - mem.read_ports)
            }
        }
        NodeKind::CompReg(reg) => reg.name.clone(),
        NodeKind::FirReg(reg) => reg.name.clone(),
    }
}

/// Prints all nodes of a block, one statement per line.
pub fn print_block(block: &Block, interner: &Interner) -> String {
    let handles = assign_handles(block);
    let mut out = String::new();
    for (_, node) in block.nodes.iter() {
        out.push_str(&render_node(block, interner, node, &handles));
        out.push('\n');
    }
    out
}

/// Prints a single node using block-wide handle assignment.
pub fn print_node(block: &Block, interner: &Interner, id: NodeId) -> String {
    let handles = assign_handles(block);
    render_node(block, interner, block.node(id), &handles)
}

fn render_node(
    block: &Block,
    interner: &Interner,
    node: &Node,
    handles: &HashMap<ValueId, String>,
) -> String {
    let mut s = String::new();

    if !node.results.is_empty() {
        let results: Vec<&str> = node
            .results
            .iter()
            .map(|r| handles[r].as_str())
            .collect();
        s.push_str(&results.join(", "));
        s.push_str(" = ");
    }

    match &node.kind {
        NodeKind::ReadPort { port, address } => {
            s.push_str(&format!(
                "read {}[{}] : {}",
                handles[port],
                handles[address],
                format_type(&block.types, block.value_type(*port))
            ));
        }
        NodeKind::WritePort {
            port,
            address,
            data,
        } => {
            s.push_str(&format!(
                "write {}[{}] {} : {}",
                handles[port],
                handles[address],
                handles[data],
                format_type(&block.types, block.value_type(*port))
            ));
        }
        NodeKind::Memory(mem) => {
            s.push_str(&format!(
                "hlmem @{} {}",
                interner.resolve(mem.sym),
                handles[&mem.clock]
            ));
            // The port counts are re-synthesized into the dictionary ahead of
            // any pass-through attributes.
            let mut entries: Vec<(String, AttrValue)> = vec![
                ("NReadPorts".to_string(), AttrValue::Int(mem.read_ports as i64)),
                (
                    "NWritePorts".to_string(),
                    AttrValue::Int(mem.write_ports as i64),
                ),
            ];
            entries.extend(mem.attrs.iter().map(|(k, v)| (k.to_string(), v.clone())));
            s.push(' ');
            s.push_str(&format_attr_entries(&entries));
            s.push_str(&format!(
                " : {}",
                format_type(&block.types, mem.memory_type)
            ));
        }
        NodeKind::CompReg(reg) => {
            s.push_str("compreg ");
            if let Some(sym) = reg.sym {
                s.push_str(&format!("sym @{} ", interner.resolve(sym)));
            }
            s.push_str(&format!("{}, {}", handles[&reg.input], handles[&reg.clock]));
            if let Some(rs) = reg.reset {
                s.push_str(&format!(", {}, {}", handles[&rs.reset], handles[&rs.value]));
            }

            let mut entries = Vec::new();
            if !can_elide_name(&reg.name, &handles[&node.results[0]]) {
                entries.push(("name".to_string(), AttrValue::Str(reg.name.clone())));
            }
            entries.extend(reg.attrs.iter().map(|(k, v)| (k.to_string(), v.clone())));
            if !entries.is_empty() {
                s.push(' ');
                s.push_str(&format_attr_entries(&entries));
            }

            s.push_str(&format!(
                " : {}",
                format_type(&block.types, block.value_type(reg.input))
            ));
        }
        NodeKind::FirReg(reg) => {
            s.push_str(&format!(
                "firreg {} clock {}",
                handles[&reg.next], handles[&reg.clock]
            ));
            if let Some(sym) = reg.inner_sym {
                s.push_str(&format!(" sym @{}", interner.resolve(sym)));
            }
            if let Some(rs) = reg.reset {
                s.push_str(&format!(
                    " reset {} {}, {}",
                    if reg.is_async { "async" } else { "sync" },
                    handles[&rs.reset],
                    handles[&rs.value]
                ));
            }

            let mut entries = Vec::new();
            if !can_elide_name(&reg.name, &handles[&node.results[0]]) {
                entries.push(("name".to_string(), AttrValue::Str(reg.name.clone())));
            }
            // An async marker without a reset clause has no keyword spelling;
            // it survives printing as a unit attribute.
            if reg.is_async && reg.reset.is_none() {
                entries.push(("isAsync".to_string(), AttrValue::Unit));
            }
            entries.extend(reg.attrs.iter().map(|(k, v)| (k.to_string(), v.clone())));
            if !entries.is_empty() {
                s.push(' ');
                s.push_str(&format_attr_entries(&entries));
            }

            s.push_str(&format!(
                " : {}",
                format_type(&block.types, block.value_type(reg.next))
            ));
        }
    }

    s
}

fn format_attr_entries(entries: &[(String, AttrValue)]) -> String {
    let parts: Vec<String> = entries
        .iter()
        .map(|(k, v)| match v {
            AttrValue::Int(i) => format!("{k} = {i}"),
            AttrValue::Str(text) => format!("{k} = \"{}\"", escape_string(text)),
            AttrValue::Unit => k.clone(),
        })
        .collect();
    format!("{{{}}}", parts.join(", "))
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}
