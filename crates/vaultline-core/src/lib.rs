//! vaultline-core
//!
//! Pure domain types shared by the Vaultline chat proxy and its clients:
//! conversation messages, upstream error classification and the data-stream
//! wire format. No network dependency.

pub mod classify;
pub mod credential;
pub mod datastream;
pub mod error;
pub mod models;
