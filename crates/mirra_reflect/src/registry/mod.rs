//! The process-wide type store: canonical names to descriptors, with
//! aliasing, demangling, and automatic pointer/reference companions.

// -----------------------------------------------------------------------------
// Modules

mod demangle;
mod type_registry;

#[cfg(feature = "std")]
pub mod context;

// -----------------------------------------------------------------------------
// Exports

pub use demangle::DemangleTable;
pub use type_registry::TypeRegistry;
