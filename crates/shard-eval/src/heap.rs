//! The evaluation heap: arena-of-instances plus index handles.
//!
//! Objects and arrays are allocated once at construction and referenced by
//! index thereafter. Any number of frames may hold the same handle;
//! mutation through one is visible through all. Nothing is freed during a
//! run — programs in this language are short-lived and the arena dies with
//! the interpreter.

use std::collections::BTreeMap;

use crate::value::{ArrRef, ObjRef, Value};

/// One class instance: a mutable field bag.
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    pub fields: BTreeMap<String, Value>,
}

/// One fixed-length array.
#[derive(Debug, Clone)]
pub(crate) struct ArrayObj {
    pub items: Vec<Value>,
}

/// The arena. Handles are indices; they are only ever produced by the
/// alloc methods below and stay valid for the arena's whole lifetime.
#[derive(Debug, Default)]
pub(crate) struct Heap {
    objects: Vec<Instance>,
    arrays: Vec<ArrayObj>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_object(&mut self, fields: BTreeMap<String, Value>) -> ObjRef {
        self.objects.push(Instance { fields });
        ObjRef(self.objects.len() - 1)
    }

    pub fn alloc_array(&mut self, len: usize, zero: Value) -> ArrRef {
        self.arrays.push(ArrayObj {
            items: vec![zero; len],
        });
        ArrRef(self.arrays.len() - 1)
    }

    pub fn object(&self, handle: ObjRef) -> &Instance {
        &self.objects[handle.0]
    }

    pub fn object_mut(&mut self, handle: ObjRef) -> &mut Instance {
        &mut self.objects[handle.0]
    }

    pub fn array(&self, handle: ArrRef) -> &ArrayObj {
        &self.arrays[handle.0]
    }

    pub fn array_mut(&mut self, handle: ArrRef) -> &mut ArrayObj {
        &mut self.arrays[handle.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_mutation_is_visible_through_every_handle() {
        let mut heap = Heap::new();
        let mut fields = BTreeMap::new();
        fields.insert("A".to_string(), Value::Int(0));
        let handle = heap.alloc_object(fields);
        let alias = handle;

        heap.object_mut(handle)
            .fields
            .insert("A".to_string(), Value::Int(42));
        assert_eq!(heap.object(alias).fields.get("A"), Some(&Value::Int(42)));
    }

    #[test]
    fn arrays_are_zero_initialized() {
        let mut heap = Heap::new();
        let handle = heap.alloc_array(3, Value::Int(0));
        assert_eq!(heap.array(handle).items, vec![Value::Int(0); 3]);
    }

    #[test]
    fn distinct_allocations_get_distinct_handles() {
        let mut heap = Heap::new();
        let a = heap.alloc_array(1, Value::Int(0));
        let b = heap.alloc_array(1, Value::Int(0));
        assert_ne!(a, b);
    }
}
