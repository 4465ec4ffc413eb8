#![doc = include_str!("../README.md")]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod access;
pub mod hash;
pub mod impls;
pub mod info;
pub mod registry;
pub mod text;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::ReflectError;
