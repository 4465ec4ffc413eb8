use alloc::vec::Vec;

use mirra_reflect::hash::HashMap;
use mirra_reflect::value::Value;

// -----------------------------------------------------------------------------
// WriterIdentity

/// The writer-side identity map: shared-cell address → assigned id.
///
/// Cleared at the start of every top-level write and discarded with it —
/// ids never survive across calls. By-value expansions draw ids from the
/// same sequence but are never address-tracked: a copy cannot alias
/// anything. Every tracked value is also kept alive for the duration of
/// the write so addresses stay stable.
#[derive(Default)]
pub(crate) struct WriterIdentity {
    ids: HashMap<usize, u64>,
    guards: Vec<Value>,
    next: u64,
}

impl WriterIdentity {
    /// The id already assigned to `address`, if it was visited.
    pub(crate) fn get(&self, address: usize) -> Option<u64> {
        self.ids.get(&address).copied()
    }

    /// Assigns the next sequential id to `address`. `guard` must alias the
    /// tracked cell.
    pub(crate) fn assign(&mut self, address: usize, guard: Value) -> u64 {
        let id = self.fresh();
        self.ids.insert(address, id);
        self.guards.push(guard);
        id
    }

    /// Draws the next sequential id without tracking an address — the
    /// by-value expansion path.
    pub(crate) fn fresh(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Forgets everything; the map is ready for a new top-level write.
    pub(crate) fn clear(&mut self) {
        self.ids.clear();
        self.guards.clear();
        self.next = 0;
    }
}

// -----------------------------------------------------------------------------
// ReaderIdentity

/// The reader-side identity map: id → the pointer value registered for it.
///
/// Same lifecycle as [`WriterIdentity`]: per top-level read, no cross-call
/// memory. Only shared targets are registered — a `$ref` can only ever
/// alias a cell.
#[derive(Default)]
pub(crate) struct ReaderIdentity {
    ids: HashMap<u64, Value>,
}

impl ReaderIdentity {
    /// Registers `value` (a pointer value) under `id`. Must happen before
    /// the object's properties parse, so self-references resolve.
    pub(crate) fn register(&mut self, id: u64, value: Value) {
        self.ids.insert(id, value);
    }

    /// Resolves `id` to an alias of the registered cell.
    pub(crate) fn resolve(&self, id: u64) -> Option<Value> {
        self.ids.get(&id).and_then(Value::alias)
    }

    /// Forgets everything; the map is ready for a new top-level read.
    pub(crate) fn clear(&mut self) {
        self.ids.clear();
    }
}
