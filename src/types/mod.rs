// Shared domain types used by the engine, the table pipeline and the views.
// None of those layers depends on another; all import from this module.

pub mod record;

pub use record::*;
