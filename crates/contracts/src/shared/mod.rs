pub mod indicators;
pub mod pivot;
