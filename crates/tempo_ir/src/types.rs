//! Type system for the node graph, including interned types and a central type database.
//!
//! All types are interned into a [`TypeDb`], which assigns each unique type a
//! [`TypeId`] for cheap comparison and storage. Besides unsigned integers and
//! fixed-size element arrays, the database knows the two port-capability
//! wrapper types: a [`Type::ReadPort`] or [`Type::WritePort`] stands for the
//! ability to read or write one port of a memory with a given array shape.

use crate::ids::TypeId;
use serde::{Deserialize, Serialize};

/// A type in the node graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// An unsigned integer of known width (`iN`). `i1` doubles as the
    /// clock/reset type.
    UInt {
        /// The number of bits.
        width: u32,
    },
    /// A fixed-size array (the shape of a memory's element storage).
    Array {
        /// The type of each element.
        element: TypeId,
        /// The number of elements.
        size: u32,
    },
    /// The capability to read one port of a memory with the given array shape.
    ReadPort {
        /// The memory's array type. Must refer to a [`Type::Array`].
        memory: TypeId,
    },
    /// The capability to write one port of a memory with the given array shape.
    WritePort {
        /// The memory's array type. Must refer to a [`Type::Array`].
        memory: TypeId,
    },
}

/// Returns the number of address bits needed to index `size` elements.
///
/// This is a ceiling log2: a size-5 memory needs 3 address bits, and a
/// single-element memory needs none. The width is never written in source
/// text; it is always derived, both for accessor address operands and for
/// the memory declaration's own addressing.
pub fn address_width(size: u32) -> u32 {
    debug_assert!(size >= 1, "memory must have at least one element");
    32 - (size - 1).leading_zeros()
}

/// Central type database — interned types for cheap comparison.
///
/// Each unique [`Type`] is stored once and referenced by [`TypeId`].
/// This makes type equality checks O(1) via ID comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDb {
    types: Vec<Type>,
}

impl TypeDb {
    /// Creates a new, empty type database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, returning its [`TypeId`].
    ///
    /// If an identical type already exists, returns the existing ID.
    /// Otherwise, allocates a new entry.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        // Check for existing identical type
        for (i, existing) in self.types.iter().enumerate() {
            if existing == &ty {
                return TypeId::from_raw(i as u32);
            }
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Interns the `iN` unsigned integer type.
    pub fn uint(&mut self, width: u32) -> TypeId {
        self.intern(Type::UInt { width })
    }

    /// Interns the 1-bit type used for clocks and resets.
    pub fn i1(&mut self) -> TypeId {
        self.uint(1)
    }

    /// Interns an array type over the given element type.
    pub fn array(&mut self, element: TypeId, size: u32) -> TypeId {
        self.intern(Type::Array { element, size })
    }

    /// Returns a reference to the type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.as_raw() as usize]
    }

    /// Returns the `(element, size)` pair if the type is an array.
    pub fn as_array(&self, id: TypeId) -> Option<(TypeId, u32)> {
        match self.get(id) {
            Type::Array { element, size } => Some((*element, *size)),
            _ => None,
        }
    }

    /// Returns the wrapped memory array type if the type is a read or write port.
    pub fn port_memory(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::ReadPort { memory } | Type::WritePort { memory } => Some(*memory),
            _ => None,
        }
    }

    /// Returns the element type stored behind a port-capability type.
    ///
    /// For `readport<array<N x T>>` or `writeport<array<N x T>>` this is `T`.
    pub fn port_element(&self, id: TypeId) -> Option<TypeId> {
        let memory = self.port_memory(id)?;
        self.as_array(memory).map(|(element, _)| element)
    }

    /// Returns the address width for a port-capability type, derived from the
    /// wrapped array's size via [`address_width`].
    pub fn port_address_width(&self, id: TypeId) -> Option<u32> {
        let memory = self.port_memory(id)?;
        self.as_array(memory).map(|(_, size)| address_width(size))
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types have been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_width_table() {
        let cases = [
            (1u32, 0u32),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 3),
            (8, 3),
            (9, 4),
            (16, 4),
            (1023, 10),
            (1024, 10),
            (1025, 11),
        ];
        for (size, width) in cases {
            assert_eq!(
                address_width(size),
                width,
                "address_width({size}) should be {width}"
            );
        }
    }

    #[test]
    fn intern_deduplicates() {
        let mut db = TypeDb::new();
        let a = db.uint(8);
        let b = db.uint(8);
        assert_eq!(a, b);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn intern_different_types() {
        let mut db = TypeDb::new();
        let a = db.uint(8);
        let b = db.uint(16);
        assert_ne!(a, b);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn i1_is_one_bit() {
        let mut db = TypeDb::new();
        let id = db.i1();
        assert_eq!(*db.get(id), Type::UInt { width: 1 });
    }

    #[test]
    fn array_accessors() {
        let mut db = TypeDb::new();
        let elem = db.uint(32);
        let arr = db.array(elem, 8);
        assert_eq!(db.as_array(arr), Some((elem, 8)));
        assert_eq!(db.as_array(elem), None);
    }

    #[test]
    fn port_wrappers() {
        let mut db = TypeDb::new();
        let elem = db.uint(32);
        let arr = db.array(elem, 8);
        let rp = db.intern(Type::ReadPort { memory: arr });
        let wp = db.intern(Type::WritePort { memory: arr });
        assert_ne!(rp, wp);
        assert_eq!(db.port_memory(rp), Some(arr));
        assert_eq!(db.port_memory(wp), Some(arr));
        assert_eq!(db.port_element(rp), Some(elem));
        assert_eq!(db.port_address_width(rp), Some(3));
        assert_eq!(db.port_memory(elem), None);
    }

    #[test]
    fn single_element_memory_needs_no_address_bits() {
        let mut db = TypeDb::new();
        let elem = db.uint(4);
        let arr = db.array(elem, 1);
        let rp = db.intern(Type::ReadPort { memory: arr });
        assert_eq!(db.port_address_width(rp), Some(0));
    }

    #[test]
    fn serde_roundtrip() {
        let mut db = TypeDb::new();
        let elem = db.uint(16);
        db.array(elem, 4);
        let json = serde_json::to_string(&db).unwrap();
        let restored: TypeDb = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
    }
}
