//! Variant representation and input parsing

pub mod parser;
pub mod spec;

pub use parser::{parse_location, parse_notation, Notation, VariantInput};
pub use spec::{VariantKind, VariantSpec};
