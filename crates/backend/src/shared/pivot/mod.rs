pub mod tree_builder;

pub use tree_builder::*;
