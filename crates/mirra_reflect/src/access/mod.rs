//! Dotted property-path access: [`eval`], [`eval_as`], and [`apply`].

// -----------------------------------------------------------------------------
// Modules

mod eval;
mod path;

// -----------------------------------------------------------------------------
// Exports

pub use eval::{AccessError, apply, eval, eval_as};
pub use path::ParseError;
