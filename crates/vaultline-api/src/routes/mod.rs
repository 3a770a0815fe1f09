pub mod chat;
pub mod debug;
pub mod liveness;
