pub mod aggregate;
pub mod dto;
pub mod filter;
pub mod record;

pub use aggregate::*;
pub use dto::*;
pub use filter::*;
pub use record::*;
