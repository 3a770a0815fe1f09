pub mod diagnostic;
pub mod message;
pub mod usage;
