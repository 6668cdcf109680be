//! Storytelling core of Mehfil, a private family app: collaborative rounds,
//! titled turn-timed Qissas and presence, all kept in a local key-value store.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;

pub use error::StoreError;
